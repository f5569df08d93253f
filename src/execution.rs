//! Running the assembler and capturing its output.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use crate::invocation::Invocation;
use crate::report::Reporter;

/// At most this many bytes of each stream are kept; the rest is read and
/// discarded so the child never blocks on a full pipe.
pub const CAPTURE_LIMIT: usize = 4 * 1024 * 1024;

/// Output of a finished assembler run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Unable to execute {}: {source}", program.display())]
    LaunchFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected ret code: {code}")]
    UnexpectedExitCode {
        code: i32,
        stdout: String,
        stderr: String,
    },
}

/// Run `invocation` to completion and check its exit code.
///
/// On an unexpected exit code, non-empty streams are dumped to `report`
/// before the error is returned.
pub fn execute<W: Write>(
    invocation: &Invocation,
    expected_exit_code: i32,
    report: &mut Reporter<W>,
) -> Result<Captured, ExecError> {
    report.executing(invocation);
    log::debug!("spawning {}", invocation.program.display());

    let launch_failed = |source| ExecError::LaunchFailed {
        program: invocation.program.clone(),
        source,
    };
    let mut child = invocation.command().spawn().map_err(launch_failed)?;

    let (stdout_pipe, stderr_pipe) = (child.stdout.take(), child.stderr.take());
    let (stdout, stderr) = std::thread::scope(|scope| {
        let stdout = scope.spawn(move || capture(stdout_pipe));
        let stderr = capture(stderr_pipe);
        (stdout.join().unwrap_or_default(), stderr)
    });
    let status = child.wait().map_err(launch_failed)?;

    let captured = Captured {
        exit_code: exit_code(status),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    };

    if captured.exit_code != expected_exit_code {
        if !captured.stdout.is_empty() {
            report.show_std("stdout", &captured.stdout);
        }
        if !captured.stderr.is_empty() {
            report.show_std("stderr", &captured.stderr);
        }
        return Err(ExecError::UnexpectedExitCode {
            code: captured.exit_code,
            stdout: captured.stdout,
            stderr: captured.stderr,
        });
    }
    Ok(captured)
}

/// Read a pipe to its end, keeping the first [`CAPTURE_LIMIT`] bytes
fn capture<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut kept = Vec::new();
    let Some(mut pipe) = pipe else {
        return kept;
    };
    let mut head = pipe.by_ref().take(CAPTURE_LIMIT as u64);
    let drained = head
        .read_to_end(&mut kept)
        .and_then(|_| io::copy(&mut pipe, &mut io::sink()));
    match drained {
        Ok(0) => {}
        Ok(dropped) => log::warn!(
            "captured stream truncated to {} bytes, {} dropped",
            CAPTURE_LIMIT,
            dropped
        ),
        Err(e) => log::warn!("failed to read captured stream: {}", e),
    }
    kept
}

/// Exit code, or the negated signal number for a killed process
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
