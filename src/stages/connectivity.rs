use log::{error, info};

use crate::context::RunContext;
use crate::engine::AutomationEngine;
use crate::stages::{StageError, StageResult};

/// Reachability check against every inventory host. All-or-nothing: a
/// single unreachable host fails the stage, because deploying the stack to
/// a partial fleet would leave control-plane and exporter nodes with an
/// inconsistent cluster view.
pub fn probe(ctx: &RunContext, engine: &dyn AutomationEngine) -> StageResult {
    info!(
        "Probing connectivity to all hosts in {}",
        ctx.inventory.display()
    );

    match engine.ping_all(&ctx.inventory) {
        Ok(0) => {
            info!("All hosts are reachable");
            StageResult::Success
        }
        Ok(code) => {
            error!(
                "One or more hosts failed the reachability check (exit code {})",
                code
            );
            StageResult::Failure(StageError::HostUnreachable { code })
        }
        Err(e) => {
            error!("Failed to run reachability check: {:#}", e);
            StageResult::Failure(StageError::HostUnreachable { code: 1 })
        }
    }
}
