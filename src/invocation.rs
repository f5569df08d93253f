//! Assembler command lines derived from a descriptor.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::Config;
use crate::descriptor::{Descriptor, TargetKind};

/// Variable read by NASM for extra options
pub const NASM_ENV: &str = "NASMENV";
/// Forces output that does not depend on time or host
pub const REPRODUCIBLE: &str = "--reproducible";

/// A complete assembler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Primary output file passed with `-o`
    pub output: PathBuf,
    /// Applied in order over the inherited environment; `None` removes
    pub env: Vec<(String, Option<String>)>,
}

impl Invocation {
    pub fn build(desc: &Descriptor, config: &Config) -> Self {
        let mut args: Vec<OsString> = Vec::new();

        if let Some(format) = &desc.format {
            args.push("-f".into());
            args.push(format.into());
        }
        if let Some(option) = &desc.option {
            args.extend(split_options(option));
        }

        let mut output = PathBuf::from(format!("{}.out", desc.name));
        for target in &desc.targets {
            if let TargetKind::Artifact {
                output: path,
                option,
                ..
            } = &target.kind
            {
                // Last artifact target wins
                output = desc.resolve(path);
                if let Some(option) = option {
                    args.extend(split_options(option));
                }
            }
        }

        let mut listing = output.clone().into_os_string();
        listing.push(".lst");
        args.push("-o".into());
        args.push(output.clone().into_os_string());
        args.push("-L+".into());
        args.push("-l".into());
        args.push(listing);

        if let Some(source) = &desc.source {
            args.push(desc.resolve(source).into_os_string());
        }

        let mut env = vec![(NASM_ENV.to_string(), Some(REPRODUCIBLE.to_string()))];
        env.extend(desc.environ.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            program: config.nasm.clone(),
            args,
            output,
            env,
        }
    }

    /// A `Command` with piped stdout/stderr, ready to spawn
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &self.env {
            match value {
                Some(value) => cmd.env(key, value),
                None => cmd.env_remove(key),
            };
        }
        cmd
    }

    /// Program and arguments joined by spaces, for the report
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(|a| a.as_os_str()))
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Options are separated by single spaces; there is no quoting.
fn split_options(option: &str) -> impl Iterator<Item = OsString> + '_ {
    option
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(OsString::from)
}

#[cfg(test)]
#[path = "invocation_tests.rs"]
mod tests;
