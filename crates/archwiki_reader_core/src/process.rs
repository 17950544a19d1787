//! Boundary to the external `archwiki-rs` binary.
//!
//! Every interaction with the tool is a [`CliRequest`]. Running one yields an
//! explicit [`ProcessOutcome`]; an `Err` means the process could not be
//! spawned at all.

use std::ffi::OsString;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

pub const MARKDOWN_FORMAT: &str = "markdown";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CliRequest {
    ListPages,
    ReadPage { format: String, page: String },
    ListCategories,
    UpdateCategory { category: String },
    UpdateAll,
    DataDirectory,
    Help,
}

impl CliRequest {
    pub fn read_markdown(page: &str) -> Self {
        Self::ReadPage {
            format: MARKDOWN_FORMAT.to_string(),
            page: page.to_string(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        match self {
            Self::ListPages => vec!["list-pages".to_string(), "-f".to_string()],
            Self::ReadPage { format, page } => vec![
                "read-page".to_string(),
                "-f".to_string(),
                format.clone(),
                page.clone(),
            ],
            Self::ListCategories => vec!["list-categories".to_string()],
            Self::UpdateCategory { category } => {
                vec!["update-category".to_string(), category.clone()]
            }
            Self::UpdateAll => vec!["update-all".to_string()],
            Self::DataDirectory => vec!["info".to_string(), "-d".to_string(), "-o".to_string()],
            Self::Help => vec!["-h".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success { stdout: String },
    Failure { code: i32, stderr: String },
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

pub trait WikiCli {
    fn run(&self, request: &CliRequest) -> Result<ProcessOutcome>;
}

#[derive(Debug, Clone)]
pub struct ArchWikiCli {
    binary: OsString,
}

impl ArchWikiCli {
    pub fn new(binary: impl Into<OsString>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl WikiCli for ArchWikiCli {
    fn run(&self, request: &CliRequest) -> Result<ProcessOutcome> {
        let args = request.args();
        debug!(binary = ?self.binary, ?args, "spawning external tool");
        // Page names go through argv untouched, never through a shell.
        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .with_context(|| {
                format!(
                    "failed to execute {} {}",
                    self.binary.to_string_lossy(),
                    args.join(" ")
                )
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            debug!(stdout_bytes = stdout.len(), "external tool succeeded");
            Ok(ProcessOutcome::Success { stdout })
        } else {
            let code = output.status.code().unwrap_or(1);
            debug!(code, stderr_bytes = stderr.len(), "external tool failed");
            Ok(ProcessOutcome::Failure { code, stderr })
        }
    }
}
