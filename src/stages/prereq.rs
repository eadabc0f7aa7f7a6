use log::{debug, error, info, warn};

use crate::context::RunContext;
use crate::engine::AutomationEngine;
use crate::stages::{StageError, StageResult};

/// Tools that must be resolvable on the controller before any stage runs.
const REQUIRED_TOOLS: &[&str] = &["ansible", "ansible-playbook", "ansible-inventory"];

/// Soft dependency: assumed present on the managed hosts, not here.
const CONTAINER_RUNTIME: &str = "docker";

/// Pre-flight verification: required tools, required input files, and a
/// parseable inventory. Collects every missing tool before failing so the
/// operator fixes them in one pass.
pub fn check(ctx: &RunContext, engine: &dyn AutomationEngine) -> StageResult {
    info!("Checking prerequisites");

    let mut missing = Vec::new();
    for tool in REQUIRED_TOOLS {
        match engine.resolve_tool(tool) {
            Some(path) => debug!("Found {} at {}", tool, path.display()),
            None => missing.push(tool.to_string()),
        }
    }

    if engine.resolve_tool(CONTAINER_RUNTIME).is_none() {
        warn!(
            "{} not found on the controller; assuming it is installed on the managed hosts",
            CONTAINER_RUNTIME
        );
    }

    if !missing.is_empty() {
        error!("Missing required tools: {}", missing.join(", "));
        return StageResult::Failure(StageError::MissingTool(missing));
    }

    for file in [&ctx.inventory, &ctx.playbook] {
        if !file.exists() {
            error!("Required file not found: {}", file.display());
            return StageResult::Failure(StageError::MissingFile(file.clone()));
        }
        debug!("Found required file {}", file.display());
    }

    // The inventory must parse under the engine's own listing command.
    match engine.list_inventory(&ctx.inventory) {
        Ok((0, _, _)) => {
            info!("Inventory {} parsed successfully", ctx.inventory.display());
            StageResult::Success
        }
        Ok((code, _, stderr)) => {
            error!(
                "Inventory {} failed to parse (exit code {}): {}",
                ctx.inventory.display(),
                code,
                stderr.trim()
            );
            StageResult::Failure(StageError::InvalidInventorySyntax {
                inventory: ctx.inventory.display().to_string(),
                code,
                detail: stderr.trim().to_string(),
            })
        }
        Err(e) => {
            error!("Failed to run inventory listing: {:#}", e);
            StageResult::Failure(StageError::InvalidInventorySyntax {
                inventory: ctx.inventory.display().to_string(),
                code: 1,
                detail: e.to_string(),
            })
        }
    }
}
