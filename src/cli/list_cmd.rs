//! Handler for the `nasm-t list` subcommand.

use std::io::Write;

use crate::config::Config;
use crate::descriptor;
use crate::report::Reporter;

pub(crate) fn list_tests<W: Write>(config: &Config, report: &mut Reporter<W>) {
    report.list_entry("Name", "Description");
    for desc in descriptor::load_directory(&config.directory) {
        report.list_entry(&desc.name, &desc.description);
    }
}
