//! Command-line interface for the harness
//!
//! Provides commands: run, update, list, new

mod list_cmd;
mod new_cmd;
mod run_cmd;
mod update_cmd;

pub use new_cmd::NewArgs;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{parse_yes_no, Config, ConfigFile, Overrides};
use crate::error::HarnessError;
use crate::report::Reporter;
use crate::verify::RunStatus;

/// nasm-t - declarative test runner for NASM
#[derive(Parser, Debug)]
#[command(name = "nasm-t")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory with tests
    #[arg(short = 'd', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Nasm executable to use
    #[arg(long, global = true)]
    pub nasm: Option<PathBuf>,

    /// Configuration file (defaults to ./nasm-t.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run test cases
    Run {
        /// Run the selected test only
        #[arg(short, long)]
        test: Option<PathBuf>,

        /// Stop immediately on failure ("y" or "n")
        #[arg(long, action = ArgAction::Set, value_parser = parse_yes_no)]
        stop: Option<bool>,
    },

    /// Update test cases with new compiler
    Update {
        /// Update the selected test only
        #[arg(short, long)]
        test: Option<PathBuf>,
    },

    /// List test cases
    List,

    /// Add a new test case
    New(NewArgs),
}

impl Cli {
    /// Resolve the configuration and run the selected command
    pub fn execute(self) -> Result<RunStatus, HarnessError> {
        let file = ConfigFile::discover(self.config.as_deref())?;
        let stop = match &self.command {
            Command::Run { stop, .. } => *stop,
            _ => None,
        };
        let config = Config::resolve(
            file,
            Overrides {
                directory: self.directory,
                nasm: self.nasm,
                stop,
            },
        );
        log::debug!("{:?}", config);

        let mut report = Reporter::stdout();
        match self.command {
            Command::Run { test, .. } => run_cmd::run_tests(&config, test.as_deref(), &mut report),
            Command::Update { test } => {
                update_cmd::update_tests(&config, test.as_deref(), &mut report)
            }
            Command::List => {
                list_cmd::list_tests(&config, &mut report);
                Ok(RunStatus::Success)
            }
            Command::New(args) => {
                new_cmd::new_test(&config, &args, &mut report)?;
                Ok(RunStatus::Success)
            }
        }
    }
}

/// Descriptors for a pass: one file when `test` is given, else the whole
/// directory. An explicit test that yields nothing aborts the pass.
fn select_descriptors<W: std::io::Write>(
    config: &Config,
    test: Option<&std::path::Path>,
    report: &mut Reporter<W>,
) -> Result<Vec<crate::descriptor::Descriptor>, HarnessError> {
    let Some(test) = test else {
        return Ok(crate::descriptor::load_directory(&config.directory));
    };
    let descs = crate::descriptor::load_file(test);
    if descs.is_empty() {
        let name = test.display().to_string();
        report.abort(&name, "Can't obtain test descriptors");
        return Err(HarnessError::DescriptorUnresolvable {
            path: test.to_path_buf(),
        });
    }
    Ok(descs)
}
