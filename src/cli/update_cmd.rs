//! Handler for the `nasm-t update` subcommand.

use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::error::HarnessError;
use crate::report::Reporter;
use crate::update;
use crate::verify::RunStatus;

use super::select_descriptors;

pub(crate) fn update_tests<W: Write>(
    config: &Config,
    test: Option<&Path>,
    report: &mut Reporter<W>,
) -> Result<RunStatus, HarnessError> {
    let descs = select_descriptors(config, test, report)?;
    let summary = update::update_all(&descs, config, report);
    log::info!(
        "{} updated, {} failed, {} skipped",
        summary.updated,
        summary.failed,
        summary.skipped
    );
    Ok(summary.status())
}
