use log::{error, info};

use crate::context::RunContext;
use crate::engine::AutomationEngine;
use crate::stages::{StageError, StageResult};

/// Syntax-only parse of the playbook, so a malformed definition is caught
/// before any deployment attempt. Never mutates remote state.
pub fn validate(ctx: &RunContext, engine: &dyn AutomationEngine) -> StageResult {
    info!("Validating playbook syntax: {}", ctx.playbook.display());

    match engine.syntax_check(&ctx.playbook, &ctx.inventory) {
        Ok(0) => {
            info!("Playbook syntax is valid");
            StageResult::Success
        }
        Ok(code) => {
            error!(
                "Playbook {} failed syntax check (exit code {})",
                ctx.playbook.display(),
                code
            );
            StageResult::Failure(StageError::InvalidPlaybookSyntax {
                playbook: ctx.playbook.display().to_string(),
                code,
            })
        }
        Err(e) => {
            error!("Failed to run playbook syntax check: {:#}", e);
            StageResult::Failure(StageError::InvalidPlaybookSyntax {
                playbook: ctx.playbook.display().to_string(),
                code: 1,
            })
        }
    }
}
