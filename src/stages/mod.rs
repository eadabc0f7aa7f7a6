pub mod connectivity;
pub mod executor;
pub mod prereq;
pub mod syntax;

use std::path::PathBuf;
use thiserror::Error;

/// Why a pipeline stage failed. Every variant carries enough context to
/// name the offending tool, file or engine run in the log.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("required tools not found on PATH: {}", .0.join(", "))]
    MissingTool(Vec<String>),

    #[error("required file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("inventory {inventory} failed to parse (exit code {code}): {detail}")]
    InvalidInventorySyntax {
        inventory: String,
        code: i32,
        detail: String,
    },

    #[error("one or more hosts are unreachable (exit code {code})")]
    HostUnreachable { code: i32 },

    #[error("playbook {playbook} failed syntax check (exit code {code})")]
    InvalidPlaybookSyntax { playbook: String, code: i32 },

    #[error("{mode} run failed (exit code {code})")]
    ExecutionFailure { mode: &'static str, code: i32 },

    #[error("cleanup playbook failed (exit code {code})")]
    CleanupFailure { code: i32 },
}

impl StageError {
    /// The status the process should exit with for this failure: the
    /// engine's own exit code where one exists, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        let code = match self {
            StageError::MissingTool(_) | StageError::MissingFile(_) => 1,
            StageError::InvalidInventorySyntax { code, .. }
            | StageError::HostUnreachable { code }
            | StageError::InvalidPlaybookSyntax { code, .. }
            | StageError::ExecutionFailure { code, .. }
            | StageError::CleanupFailure { code } => *code,
        };
        if code == 0 {
            1
        } else {
            code
        }
    }
}

/// Outcome of one pipeline stage. Once a stage yields `Failure`, no later
/// mutating stage in the same pipeline may run; only the failure handler
/// does.
#[derive(Debug)]
pub enum StageResult {
    Success,
    Failure(StageError),
    Skipped,
}

impl StageResult {
    pub fn into_result(self) -> Result<(), StageError> {
        match self {
            StageResult::Success | StageResult::Skipped => Ok(()),
            StageResult::Failure(err) => Err(err),
        }
    }
}
