//! CLI entry point for snapgrab.

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;
mod output;

/// Outcome of a run that reached the download phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every selected item is on disk (or nothing needed doing).
    Success,
    /// Some items exhausted their retry budget.
    Partial,
    /// Every selected item exhausted its retry budget.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_snapgrab().await {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(fatal) => {
            eprintln!("Error: {fatal}");
            ExitCode::from(fatal.exit_code())
        }
    }
}
