//! Rebind Tools
//!
//! The `fbx-rebind` command line tool: argument parsing, the
//! load → rebind → export pipeline, and the run report.

pub mod cli;
pub mod pipeline;
pub mod report;

pub use cli::Cli;
pub use pipeline::{
    descriptor_path_for, output_path_for, run, MaterialSummary, RunConfig, RunSummary,
};
pub use report::write_report;
