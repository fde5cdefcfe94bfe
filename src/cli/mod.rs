//! CLI argument parsing.

mod args;
mod validators;

pub use args::{
    Cli, Command, ConfigAction, DetectArgs, GlobalArgs, OutputArgs, ReportArgs, RunArgs, SplitArgs,
    WindowArgs,
};
pub use validators::parse_seconds;
