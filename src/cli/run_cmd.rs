//! Handler for the `nasm-t run` subcommand.

use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::error::HarnessError;
use crate::report::Reporter;
use crate::verify::{self, RunStatus};

use super::select_descriptors;

pub(crate) fn run_tests<W: Write>(
    config: &Config,
    test: Option<&Path>,
    report: &mut Reporter<W>,
) -> Result<RunStatus, HarnessError> {
    let descs = select_descriptors(config, test, report)?;
    let summary = verify::run_all(&descs, config, report);
    log::info!(
        "{} passed, {} failed, {} tolerated, {} skipped",
        summary.passed,
        summary.failed,
        summary.tolerated,
        summary.skipped
    );
    Ok(summary.status())
}
