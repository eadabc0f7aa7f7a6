use colored::Colorize;
use log::{error, info, warn};

use crate::context::RunContext;
use crate::engine::AutomationEngine;
use crate::stages::StageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandlerState {
    Armed,
    Firing,
    Done,
}

/// Process-wide guard around the whole pipeline: the explicit counterpart
/// of a shell `trap`. Armed before the first stage runs; fires once on the
/// first unhandled stage failure; attempts the compensating cleanup
/// playbook and hands back the ORIGINAL failure's exit status.
pub struct FailureHandler {
    state: HandlerState,
}

impl FailureHandler {
    pub fn arm() -> Self {
        FailureHandler {
            state: HandlerState::Armed,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == HandlerState::Done
    }

    /// Handle a stage failure: log it, point the operator at the log,
    /// attempt the cleanup playbook if one is present, and return the
    /// original failure's exit status. The cleanup's own failure is logged
    /// but never escalated; we are already in a failure path and must not
    /// mask the root cause.
    pub fn fire(
        &mut self,
        err: &StageError,
        ctx: &RunContext,
        engine: &dyn AutomationEngine,
    ) -> i32 {
        let code = err.exit_code();
        if self.state != HandlerState::Armed {
            warn!("Failure handler fired more than once; ignoring");
            return code;
        }
        self.state = HandlerState::Firing;

        error!("Pipeline failed with exit code {}: {}", code, err);
        eprintln!("\n{} {}", "ERROR:".red().bold(), err);
        eprintln!("Full log: {}", ctx.log_path.display());

        if ctx.cleanup_playbook.exists() {
            info!(
                "Running cleanup playbook {}",
                ctx.cleanup_playbook.display()
            );
            match engine.run_playbook(
                &ctx.cleanup_playbook,
                &ctx.inventory,
                &["--become".to_string()],
            ) {
                Ok(0) => info!("Cleanup completed"),
                Ok(cleanup_code) => {
                    warn!("{}", StageError::CleanupFailure { code: cleanup_code });
                }
                Err(e) => warn!("Cleanup playbook could not be run: {:#}", e),
            }
        } else {
            info!(
                "No cleanup playbook at {}; skipping compensation",
                ctx.cleanup_playbook.display()
            );
        }

        self.state = HandlerState::Done;
        code
    }
}
