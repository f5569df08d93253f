//! The run report.
//!
//! Everything written here is read by people and by scripts scanning for
//! the `=== Test <name> <VERDICT> ===` banners, so the line formats are
//! fixed. Diagnostic logging goes through `log` instead.

pub mod diff;
pub mod hexdump;

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use crate::invocation::Invocation;

/// Column width of the name in `list` output
const LIST_NAME_WIDTH: usize = 32;

/// Writes report lines to any sink (stdout in the binary, a buffer in tests)
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write one line; a closed sink must not abort the run
    pub fn line(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn indented(&mut self, text: impl Display) {
        self.line(format_args!("\t{}", text));
    }

    pub fn running(&mut self, name: &str) {
        self.line(format_args!("=== Running {} ===", name));
    }

    pub fn updating(&mut self, name: &str) {
        self.line(format_args!("=== Updating {} ===", name));
    }

    pub fn processing(&mut self, name: &str) {
        self.indented(format_args!("Processing {}", name));
    }

    pub fn executing(&mut self, invocation: &Invocation) {
        self.indented(format_args!("Executing {}", invocation.command_line()));
    }

    pub fn comparing_files(&mut self, output: &Path, reference: &Path) {
        self.indented(format_args!(
            "Comparing {} {}",
            output.display(),
            reference.display()
        ));
    }

    pub fn comparing_stream(&mut self, stream: impl Display) {
        self.indented(format_args!("Comparing {}", stream));
    }

    pub fn moving(&mut self, from: impl Display, to: &Path) {
        self.indented(format_args!("Moving {} to {}", from, to.display()));
    }

    /// Dump captured text between `--- <name>` and `---` delimiters
    pub fn show_std(&mut self, name: impl Display, data: &str) {
        self.indented(format_args!("--- {}", name));
        self.block(data);
        self.indented("---");
    }

    fn block(&mut self, data: &str) {
        for line in data.split('\n') {
            self.indented(line);
        }
    }

    /// Both texts in full, then their unified diff
    pub fn text_mismatch(&mut self, from_name: &str, from: &str, to_name: &str, to: &str) {
        self.indented(format_args!("--- {}", from_name));
        self.block(from);
        self.indented(format_args!("--- {}", to_name));
        self.block(to);
        let from_lines: Vec<&str> = from.split('\n').collect();
        let to_lines: Vec<&str> = to.split('\n').collect();
        for line in diff::unified_diff(&from_lines, &to_lines, from_name, to_name) {
            self.indented(line);
        }
        self.indented("---");
    }

    /// Hexdumps of both files, then a unified diff of the dumps
    pub fn binary_mismatch(&mut self, from: &Path, from_bytes: &[u8], to: &Path, to_bytes: &[u8]) {
        let from_dump = hexdump::hexdump(from_bytes);
        let to_dump = hexdump::hexdump(to_bytes);
        self.indented(format_args!("--- hexdump {}", from.display()));
        self.block(&from_dump);
        self.indented(format_args!("--- hexdump {}", to.display()));
        self.block(&to_dump);
        let from_lines: Vec<&str> = from_dump.split('\n').collect();
        let to_lines: Vec<&str> = to_dump.split('\n').collect();
        let (from_name, to_name) = (from.display().to_string(), to.display().to_string());
        for line in diff::unified_diff(&from_lines, &to_lines, &from_name, &to_name) {
            self.indented(line);
        }
        self.indented("---");
    }

    fn reason(&mut self, name: &str, message: impl Display) {
        self.indented(format_args!("{}: {}", name, message));
    }

    pub fn pass(&mut self, name: &str) {
        self.line(format_args!("=== Test {} PASS ===", name));
    }

    pub fn fail(&mut self, name: &str, message: impl Display) {
        self.reason(name, message);
        self.line(format_args!("=== Test {} FAIL ===", name));
    }

    pub fn skip(&mut self, name: &str, message: impl Display) {
        self.reason(name, message);
        self.line(format_args!("=== Test {} SKIP ===", name));
    }

    pub fn abort(&mut self, name: &str, message: impl Display) {
        self.reason(name, message);
        self.line(format_args!("=== Test {} ABORT ===", name));
    }

    /// A failure that the descriptor tolerates
    pub fn error_over(&mut self, name: &str) {
        self.line(format_args!("=== Test {} ERROR OVER ===", name));
    }

    pub fn updated(&mut self, name: &str) {
        self.line(format_args!("=== Test {} UPDATED ===", name));
    }

    pub fn list_entry(&mut self, name: &str, description: &str) {
        self.line(format_args!(
            "{:<width$} {}",
            name,
            description,
            width = LIST_NAME_WIDTH
        ));
    }
}

#[cfg(test)]
mod tests;
