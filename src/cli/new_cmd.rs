//! Handler for the `nasm-t new` subcommand.

use clap::Args;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::HarnessError;
use crate::report::Reporter;

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    /// Test identifier/name
    #[arg(long)]
    pub id: String,

    /// Description of a test
    #[arg(long, default_value = "Description of a test")]
    pub description: String,

    /// Output format
    #[arg(long, default_value = "bin")]
    pub format: String,

    /// Source file (defaults to <id>.asm)
    #[arg(long)]
    pub source: Option<String>,

    /// NASM options
    #[arg(long, default_value = "-Ox")]
    pub option: String,

    /// Test reference
    #[arg(long = "ref")]
    pub reference: Option<String>,

    /// "y" if test is supposed to fail or "i" to ignore failures
    #[arg(long, value_parser = ["y", "i"])]
    pub error: Option<String>,

    /// Output (compiled) file name, "y" for the default or "n" for none
    #[arg(long, default_value = "y")]
    pub output: String,

    /// Filename of stdout file, "y" for the default or "n" for none
    #[arg(long, default_value = "y")]
    pub stdout: String,

    /// Filename of stderr file, "y" for the default or "n" for none
    #[arg(long, default_value = "y")]
    pub stderr: String,
}

#[derive(Debug, Serialize)]
struct Scaffold<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    option: Option<&'a str>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    reference: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    target: Vec<ScaffoldTarget>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ScaffoldTarget {
    Output(String),
    Stdout(String),
    Stderr(String),
}

/// Conventional file extension for an output format
pub(super) fn format_extension(format: &str) -> &'static str {
    match format {
        "bin" => ".bin",
        "elf" | "elf32" | "elf64" | "elfx32" | "macho" | "macho32" | "macho64" | "as86" => ".o",
        "obj" | "win32" | "win64" | "coff" => ".obj",
        "ith" => ".ith",
        "srec" => ".srec",
        "aout" | "aoutb" => ".out",
        "rdf" => ".rdf",
        _ => ".out",
    }
}

/// Expand a `y`/`n`/explicit-name answer into a file name
fn target_name(answer: &str, default: impl FnOnce() -> String) -> Option<String> {
    match answer {
        "n" | "" => None,
        "y" => Some(default()),
        name => Some(name.to_string()),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Render the descriptor file for `args` as a tab-indented one-element array
pub(super) fn render_descriptor(args: &NewArgs, source: &str) -> Result<String, HarnessError> {
    let mut target = Vec::new();
    if let Some(name) = target_name(&args.output, || {
        format!("{}{}", args.id, format_extension(&args.format))
    }) {
        target.push(ScaffoldTarget::Output(name));
    }
    if let Some(name) = target_name(&args.stdout, || format!("{}.stdout", args.id)) {
        target.push(ScaffoldTarget::Stdout(name));
    }
    if let Some(name) = target_name(&args.stderr, || format!("{}.stderr", args.id)) {
        target.push(ScaffoldTarget::Stderr(name));
    }

    let scaffold = Scaffold {
        description: non_empty(&args.description),
        id: &args.id,
        format: non_empty(&args.format),
        source,
        option: non_empty(&args.option),
        reference: args.reference.as_deref(),
        error: match args.error.as_deref() {
            Some("y") => Some("expected"),
            Some("i") => Some("over"),
            _ => None,
        },
        target,
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    std::slice::from_ref(&scaffold).serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub(crate) fn new_test<W: Write>(
    config: &Config,
    args: &NewArgs,
    report: &mut Reporter<W>,
) -> Result<(), HarnessError> {
    let source = args
        .source
        .clone()
        .unwrap_or_else(|| format!("{}.asm", args.id));

    let source_path = config.directory.join(&source);
    report.line(format_args!("\tCreating {}", source_path.display()));
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&source_path)
        .map_err(|e| HarnessError::io("Failed to create", &source_path, e))?;

    let descriptor_path: PathBuf = config.directory.join(format!("{}.json", args.id));
    report.line(format_args!(
        "\tFilling descriptor {}",
        descriptor_path.display()
    ));
    let content = render_descriptor(args, &source)?;
    std::fs::write(&descriptor_path, content)
        .map_err(|e| HarnessError::io("Failed to write", &descriptor_path, e))?;
    Ok(())
}
