//! Verification of one descriptor against its recorded references, and
//! the run loop over a descriptor list.

pub mod filter;

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;
use crate::descriptor::{Descriptor, Stream, Target, TargetKind};
use crate::error::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::execution::{self, ExecError};
use crate::invocation::Invocation;
use crate::report::Reporter;

/// Reason a descriptor failed
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("{} and {} files are different", reference.display(), output.display())]
    ArtifactMismatch { reference: PathBuf, output: PathBuf },

    #[error("{stream} mismatch")]
    StreamMismatch { stream: Stream },

    #[error("Can't read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stream} is not empty")]
    UnconsumedStreamOutput { stream: Stream },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of verifying a single descriptor
#[derive(Debug)]
pub enum Outcome {
    Pass,
    Skip(String),
    Fail(Failure),
}

/// Final classification once the descriptor's error policy is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Skip,
    ErrorTolerated,
}

impl Verdict {
    pub fn of(desc: &Descriptor, outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Pass => Self::Pass,
            Outcome::Skip(_) => Self::Skip,
            Outcome::Fail(_) => Self::of_failure(desc),
        }
    }

    /// Classification of a failed run or update of `desc`
    pub fn of_failure(desc: &Descriptor) -> Self {
        if desc.tolerates_failure() {
            Self::ErrorTolerated
        } else {
            Self::Fail
        }
    }
}

/// Aggregate status of a run or update pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => EXIT_SUCCESS,
            Self::Failure => EXIT_FAILURE,
        }
    }
}

/// Counters for a pass over descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
    pub tolerated: usize,
    /// Remaining descriptors were not processed after a failure
    pub aborted: bool,
}

impl Summary {
    pub fn status(&self) -> RunStatus {
        if self.failed > 0 {
            RunStatus::Failure
        } else {
            RunStatus::Success
        }
    }

    /// Account for a failed descriptor; returns true when the pass must stop
    pub(crate) fn record_failure<W: Write>(
        &mut self,
        desc: &Descriptor,
        failure: &Failure,
        verdict: Verdict,
        config: &Config,
        report: &mut Reporter<W>,
    ) -> bool {
        report.fail(&desc.name, failure);
        if verdict == Verdict::ErrorTolerated {
            report.error_over(&desc.name);
            self.tolerated += 1;
            return false;
        }
        self.failed += 1;
        if config.stop_on_failure {
            report.abort(&desc.name, "Error detected");
            self.aborted = true;
        }
        self.aborted
    }
}

/// Run and verify every descriptor in order.
pub fn run_all<W: Write>(descs: &[Descriptor], config: &Config, report: &mut Reporter<W>) -> Summary {
    let mut summary = Summary::default();
    for desc in descs {
        let outcome = run(desc, config, report);
        match (Verdict::of(desc, &outcome), outcome) {
            (_, Outcome::Pass) => {
                report.pass(&desc.name);
                summary.passed += 1;
            }
            (_, Outcome::Skip(reason)) => {
                report.skip(&desc.name, &reason);
                summary.skipped += 1;
            }
            (verdict, Outcome::Fail(failure)) => {
                if summary.record_failure(desc, &failure, verdict, config, report) {
                    break;
                }
            }
        }
    }
    summary
}

/// Run the assembler for `desc` and compare every target.
pub fn run<W: Write>(desc: &Descriptor, config: &Config, report: &mut Reporter<W>) -> Outcome {
    report.running(&desc.name);

    if let Some(reason) = &desc.disabled {
        return Outcome::Skip(reason.clone());
    }

    report.processing(&desc.name);
    let invocation = Invocation::build(desc, config);
    let captured = match execution::execute(&invocation, desc.expected_exit_code, report) {
        Ok(captured) => captured,
        Err(e) => return Outcome::Fail(e.into()),
    };

    match check_targets(desc, captured.stdout, captured.stderr, report) {
        Ok(()) => Outcome::Pass,
        Err(failure) => Outcome::Fail(failure),
    }
}

fn check_targets<W: Write>(
    desc: &Descriptor,
    mut stdout: String,
    mut stderr: String,
    report: &mut Reporter<W>,
) -> Result<(), Failure> {
    for target in &desc.targets {
        match &target.kind {
            TargetKind::Artifact {
                output, reference, ..
            } => {
                // Nothing is written when the source is meant to be rejected
                if desc.expects_failure() {
                    continue;
                }
                let output = desc.resolve(output);
                let reference = desc.resolve(reference);
                report.comparing_files(&output, &reference);
                compare_artifact(&reference, &output, report)?;
            }
            TargetKind::Capture { stream, reference } => {
                report.comparing_stream(stream);
                let captured = match stream {
                    Stream::Stdout => &mut stdout,
                    Stream::Stderr => &mut stderr,
                };
                compare_stream(desc, target, *stream, reference, captured, report)?;
                captured.clear();
            }
        }
    }

    for (stream, leftover) in [(Stream::Stdout, &stdout), (Stream::Stderr, &stderr)] {
        if !leftover.is_empty() {
            report.show_std(stream, leftover);
            return Err(Failure::UnconsumedStreamOutput { stream });
        }
    }
    Ok(())
}

fn compare_artifact<W: Write>(
    reference: &Path,
    output: &Path,
    report: &mut Reporter<W>,
) -> Result<(), Failure> {
    let expected = read_file(reference)?;
    let actual = read_file(output)?;
    if expected != actual {
        report.binary_mismatch(reference, &expected, output, &actual);
        return Err(Failure::ArtifactMismatch {
            reference: reference.to_path_buf(),
            output: output.to_path_buf(),
        });
    }
    Ok(())
}

fn compare_stream<W: Write>(
    desc: &Descriptor,
    target: &Target,
    stream: Stream,
    reference: &str,
    captured: &str,
    report: &mut Reporter<W>,
) -> Result<(), Failure> {
    let path = desc.resolve(reference);
    let expected = String::from_utf8_lossy(&read_file(&path)?).into_owned();
    let actual = match &target.filter {
        Some(filter) => {
            log::debug!("{}: filtering {} with {:?}", desc.name, stream, filter.pattern());
            filter.apply(captured)
        }
        None => captured.into(),
    };
    if expected != actual {
        let name = path.display().to_string();
        report.text_mismatch(&name, &expected, &stream.to_string(), &actual);
        return Err(Failure::StreamMismatch { stream });
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, Failure> {
    std::fs::read(path).map_err(|source| Failure::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests;
