//! Regenerating references from a fresh assembler run.
//!
//! References are replaced in place: artifacts are renamed over their match
//! file and captured streams are written unfiltered.

use std::io::Write;

use crate::config::Config;
use crate::descriptor::{Descriptor, Stream, TargetKind};
use crate::execution;
use crate::invocation::Invocation;
use crate::report::Reporter;
use crate::verify::{Failure, Summary, Verdict};

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated,
    Skip(String),
    Fail(Failure),
}

/// Update every descriptor in order.
pub fn update_all<W: Write>(descs: &[Descriptor], config: &Config, report: &mut Reporter<W>) -> Summary {
    let mut summary = Summary::default();
    for desc in descs {
        match update(desc, config, report) {
            UpdateOutcome::Updated => {
                report.updated(&desc.name);
                summary.updated += 1;
            }
            UpdateOutcome::Skip(reason) => {
                report.skip(&desc.name, &reason);
                summary.skipped += 1;
            }
            UpdateOutcome::Fail(failure) => {
                let verdict = Verdict::of_failure(desc);
                if summary.record_failure(desc, &failure, verdict, config, report) {
                    break;
                }
            }
        }
    }
    summary
}

/// Run the assembler for `desc` and store what it produced as references.
pub fn update<W: Write>(desc: &Descriptor, config: &Config, report: &mut Reporter<W>) -> UpdateOutcome {
    report.updating(&desc.name);

    if !desc.update {
        return UpdateOutcome::Skip("No output provided".to_string());
    }
    if let Some(reason) = &desc.disabled {
        return UpdateOutcome::Skip(reason.clone());
    }

    report.processing(&desc.name);
    let invocation = Invocation::build(desc, config);
    let captured = match execution::execute(&invocation, desc.expected_exit_code, report) {
        Ok(captured) => captured,
        Err(e) => return UpdateOutcome::Fail(e.into()),
    };

    for target in &desc.targets {
        let result = match &target.kind {
            TargetKind::Artifact {
                output, reference, ..
            } => {
                if desc.expects_failure() {
                    continue;
                }
                let (output, reference) = (desc.resolve(output), desc.resolve(reference));
                report.moving(output.display(), &reference);
                std::fs::rename(&output, &reference).map_err(|source| Failure::Io {
                    action: "Failed to move output onto",
                    path: reference,
                    source,
                })
            }
            TargetKind::Capture { stream, reference } => {
                let reference = desc.resolve(reference);
                report.moving(stream, &reference);
                let text = match stream {
                    Stream::Stdout => &captured.stdout,
                    Stream::Stderr => &captured.stderr,
                };
                std::fs::write(&reference, text.as_bytes()).map_err(|source| Failure::Io {
                    action: "Failed to write",
                    path: reference,
                    source,
                })
            }
        };
        if let Err(failure) = result {
            return UpdateOutcome::Fail(failure);
        }
    }

    UpdateOutcome::Updated
}
