//! Test descriptors.
//!
//! Descriptors are JSON files holding either one record or an array of
//! records. Each record is validated and turned into a self-contained
//! [`Descriptor`] at load time; nothing downstream looks at raw JSON.

pub mod template;

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::verify::filter::Filter;

/// Extension of descriptor files
pub const DESCRIPTOR_EXTENSION: &str = "json";
/// Suffix appended to an artifact's output path when no `match` is given
pub const REFERENCE_SUFFIX: &str = ".t";

/// Why a descriptor file or record was discarded
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} holds neither an object nor an array", path.display())]
    UnexpectedShape { path: PathBuf },

    #[error("record fields have the wrong shape: {0}")]
    InvalidRecord(#[source] serde_json::Error),

    #[error("record has no description")]
    MissingDescription,

    #[error("invalid filter pattern {pattern:?}: {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// What the `error` field asks of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// `"expected"`: the assembler must exit with code 1
    Expected,
    /// `"over"`: a failure is reported but does not fail the run
    Tolerated,
}

impl ErrorMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "expected" => Some(Self::Expected),
            "over" => Some(Self::Tolerated),
            _ => None,
        }
    }
}

/// Captured output stream of the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// What a target verifies
#[derive(Debug, Clone)]
pub enum TargetKind {
    /// A file written by the assembler, compared byte for byte
    Artifact {
        output: String,
        reference: String,
        option: Option<String>,
    },
    /// Captured stdout or stderr, compared as text
    Capture { stream: Stream, reference: String },
}

/// One verification unit of a descriptor
#[derive(Debug, Clone)]
pub struct Target {
    pub kind: TargetKind,
    /// Applied to captured text before comparison; ignored for artifacts
    pub filter: Option<Filter>,
}

/// A fully resolved test case
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Unique identity: base directory, file stem, and `.N` for array members
    pub name: String,
    pub description: String,
    /// Directory of the descriptor file; relative paths resolve against it
    pub base_dir: PathBuf,
    /// File name of the descriptor, e.g. `br3392.json`
    pub file_name: String,
    pub format: Option<String>,
    pub source: Option<String>,
    pub option: Option<String>,
    pub error: Option<ErrorMode>,
    /// Exit code the assembler must return: 1 for expected errors, else 0
    pub expected_exit_code: i32,
    /// Whether `update` may regenerate references
    pub update: bool,
    /// Reason the test is disabled
    pub disabled: Option<String>,
    /// `Some` sets a variable, `None` removes it
    pub environ: BTreeMap<String, Option<String>>,
    pub targets: Vec<Target>,
}

impl Descriptor {
    /// Resolve a path relative to the descriptor's directory
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// The assembler is expected to reject the source
    pub fn expects_failure(&self) -> bool {
        self.error == Some(ErrorMode::Expected)
    }

    /// Failures are reported but do not fail the run
    pub fn tolerates_failure(&self) -> bool {
        self.error == Some(ErrorMode::Tolerated)
    }

    /// Build a descriptor from one (already expanded) JSON record.
    ///
    /// `seq` is the record's 1-based position when it came from an array.
    pub fn prepare(
        record: Value,
        base_dir: &Path,
        file_name: &str,
        seq: Option<usize>,
    ) -> Result<Self, DescriptorError> {
        let record: Record = serde_json::from_value(record).map_err(DescriptorError::InvalidRecord)?;

        let description = match record.description {
            Some(d) if !d.is_empty() => d,
            _ => return Err(DescriptorError::MissingDescription),
        };

        let stem = file_name
            .strip_suffix(".json")
            .unwrap_or(file_name);
        let suffix = seq.map(|n| format!(".{}", n)).unwrap_or_default();
        let name = format!("{}{}", base_dir.join(stem).display(), suffix);

        let update = record.target.is_some() && !record.update.is_some_and(|u| u.is_false());

        let targets = record
            .target
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match raw.into_target() {
                Ok(Some(target)) => Some(Ok(target)),
                Ok(None) => {
                    log::warn!("{}: target {} names no output, stdout or stderr", name, index);
                    None
                }
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let error = record.error.as_deref().and_then(|value| {
            let mode = ErrorMode::parse(value);
            if mode.is_none() {
                log::debug!("{}: ignoring unknown error mode {:?}", name, value);
            }
            mode
        });

        let environ = record
            .environ
            .iter()
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) => (key.to_string(), Some(value.to_string())),
                None => (entry.clone(), None),
            })
            .collect();

        Ok(Self {
            name,
            description,
            base_dir: base_dir.to_path_buf(),
            file_name: file_name.to_string(),
            format: record.format,
            source: record.source,
            option: record.option,
            expected_exit_code: if error == Some(ErrorMode::Expected) { 1 } else { 0 },
            error,
            update,
            disabled: record.disable,
            environ,
            targets,
        })
    }
}

/// Loosely typed `update` field: `false` or `"false"` disables updates
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Toggle {
    Bool(bool),
    Text(String),
}

impl Toggle {
    fn is_false(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Text(s) => s == "false",
        }
    }
}

/// A record as stored on disk. Unknown fields such as `id` and `ref` are
/// consumed by template expansion and ignored here.
#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    format: Option<String>,

    #[serde(default)]
    source: Option<String>,

    #[serde(default)]
    option: Option<String>,

    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    disable: Option<String>,

    #[serde(default)]
    update: Option<Toggle>,

    #[serde(default)]
    environ: Vec<String>,

    #[serde(default)]
    target: Option<Vec<RawTarget>>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    #[serde(default)]
    output: Option<String>,

    #[serde(default, rename = "match")]
    reference: Option<String>,

    #[serde(default)]
    option: Option<String>,

    #[serde(default)]
    stdout: Option<String>,

    #[serde(default)]
    stderr: Option<String>,

    #[serde(default)]
    filter: Option<RawFilter>,
}

#[derive(Debug, Deserialize)]
struct RawFilter {
    #[serde(rename = "match")]
    pattern: String,
    subst: String,
}

impl RawTarget {
    fn into_target(self) -> Result<Option<Target>, DescriptorError> {
        let filter = self
            .filter
            .map(|f| {
                Filter::new(&f.pattern, &f.subst).map_err(|source| DescriptorError::InvalidFilter {
                    pattern: f.pattern.clone(),
                    source,
                })
            })
            .transpose()?;

        let kind = if let Some(output) = self.output {
            let reference = self
                .reference
                .unwrap_or_else(|| format!("{}{}", output, REFERENCE_SUFFIX));
            TargetKind::Artifact {
                output,
                reference,
                option: self.option,
            }
        } else if let Some(reference) = self.stdout {
            TargetKind::Capture {
                stream: Stream::Stdout,
                reference,
            }
        } else if let Some(reference) = self.stderr {
            TargetKind::Capture {
                stream: Stream::Stderr,
                reference,
            }
        } else {
            return Ok(None);
        };

        Ok(Some(Target { kind, filter }))
    }
}

/// Read every descriptor held by one file, in file order.
///
/// Records without a description are dropped; a file that cannot be read
/// or parsed is an error for the caller to report.
pub fn read_descriptors(path: &Path) -> Result<Vec<Descriptor>, DescriptorError> {
    let bytes = std::fs::read(path).map_err(|source| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let value: Value = serde_json::from_str(&text).map_err(|source| DescriptorError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let candidates: Vec<(Value, Option<usize>)> = match value {
        Value::Object(_) => vec![(value, None)],
        Value::Array(records) => template::expand(records)
            .into_iter()
            .map(|e| (e.record, Some(e.seq)))
            .collect(),
        _ => {
            return Err(DescriptorError::UnexpectedShape {
                path: path.to_path_buf(),
            })
        }
    };

    let mut descriptors = Vec::with_capacity(candidates.len());
    for (record, seq) in candidates {
        match Descriptor::prepare(record, base_dir, &file_name, seq) {
            Ok(desc) => descriptors.push(desc),
            Err(DescriptorError::MissingDescription) => {
                log::debug!("{}: skipping record {:?} without description", path.display(), seq);
            }
            Err(e) => log::warn!("{}: skipping record {:?}: {}", path.display(), seq, e),
        }
    }
    Ok(descriptors)
}

/// Load the descriptors of a single test file.
///
/// `.json` is appended when the path does not already carry it. Unreadable
/// or malformed files yield no descriptors.
pub fn load_file(path: &Path) -> Vec<Descriptor> {
    let path = if path.extension().is_some_and(|ext| ext == DESCRIPTOR_EXTENSION) {
        path.to_path_buf()
    } else {
        let mut with_ext = path.as_os_str().to_owned();
        with_ext.push(".json");
        PathBuf::from(with_ext)
    };
    read_descriptors(&path).unwrap_or_else(|e| {
        log::warn!("{}", e);
        Vec::new()
    })
}

/// Recursively load every descriptor under `dir`, sorted by name.
pub fn load_directory(dir: &Path) -> Vec<Descriptor> {
    let mut descriptors = Vec::new();
    collect_directory(dir, &mut descriptors);
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));
    for name in duplicate_names(&descriptors) {
        log::warn!("several descriptors are named {}", name);
    }
    descriptors
}

/// Names shared by more than one descriptor of a sorted list, e.g. record 1
/// of `a.json` and the single record of `a.1.json`
pub fn duplicate_names(sorted: &[Descriptor]) -> Vec<&str> {
    let mut duplicates: Vec<&str> = Vec::new();
    for pair in sorted.windows(2) {
        let name = pair[1].name.as_str();
        if pair[0].name == name && duplicates.last() != Some(&name) {
            duplicates.push(name);
        }
    }
    duplicates
}

fn collect_directory(dir: &Path, out: &mut Vec<Descriptor>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("cannot list {}: {}", dir.display(), e);
            return;
        }
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_directory(&path, out);
        } else if path.extension().is_some_and(|ext| ext == DESCRIPTOR_EXTENSION) {
            match read_descriptors(&path) {
                Ok(descriptors) => out.extend(descriptors),
                Err(e) => log::warn!("{}", e),
            }
        }
    }
}
