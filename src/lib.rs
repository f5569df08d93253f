//! nasm-t: declarative test harness for the NASM assembler
//!
//! Test cases are JSON descriptors naming a source file, assembler options,
//! the expected exit code and the artifacts to verify. The harness runs the
//! assembler for each descriptor and compares what it produced against
//! recorded references, or regenerates those references.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod execution;
pub mod invocation;
pub mod report;
pub mod update;
pub mod verify;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::descriptor::{Descriptor, Stream, Target, TargetKind};
    pub use crate::error::HarnessError;
    pub use crate::report::Reporter;
    pub use crate::verify::{Outcome, RunStatus, Summary, Verdict};
}
