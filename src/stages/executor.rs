use colored::Colorize;
use log::{error, info};

use crate::context::RunContext;
use crate::engine::AutomationEngine;
use crate::stages::{StageError, StageResult};

/// How the automation engine is asked to run the playbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Full playbook with privilege elevation; mutates remote hosts.
    Apply,
    /// Check-and-diff run; reports intended changes without applying them.
    Simulate,
    /// Only the subset of the playbook tagged for incremental updates.
    PartialUpdate,
}

impl RunMode {
    pub fn label(&self) -> &'static str {
        match self {
            RunMode::Apply => "apply",
            RunMode::Simulate => "dry-run",
            RunMode::PartialUpdate => "update",
        }
    }

    /// The engine flags this mode adds on top of the playbook invocation.
    pub fn engine_args(&self, verbose: bool) -> Vec<String> {
        let mut args = vec!["--become".to_string()];
        match self {
            RunMode::Apply => {}
            RunMode::Simulate => {
                args.push("--check".to_string());
                args.push("--diff".to_string());
            }
            RunMode::PartialUpdate => {
                args.push("--tags".to_string());
                args.push("update".to_string());
            }
        }
        if verbose {
            args.push("-vv".to_string());
        }
        args
    }
}

/// Run the automation engine against the playbook in the given mode,
/// streaming its output into the log. A nonzero engine exit is always a
/// failure; runs are never retried, since remote mutations are not assumed
/// safe to blindly repeat without operator review.
pub fn execute(mode: RunMode, ctx: &RunContext, engine: &dyn AutomationEngine) -> StageResult {
    if mode == RunMode::Simulate {
        println!(
            "\n{}",
            "DRY RUN: reported changes are not applied".yellow().bold()
        );
    }

    info!(
        "Starting {} run of playbook {}",
        mode.label(),
        ctx.playbook.display()
    );

    match engine.run_playbook(&ctx.playbook, &ctx.inventory, &mode.engine_args(ctx.verbose)) {
        Ok(0) => {
            info!("{} run completed", mode.label());
            if mode == RunMode::Simulate {
                println!(
                    "{}",
                    "DRY RUN complete: no remote state was changed".yellow()
                );
            }
            StageResult::Success
        }
        Ok(code) => {
            error!("{} run failed (exit code {})", mode.label(), code);
            StageResult::Failure(StageError::ExecutionFailure {
                mode: mode.label(),
                code,
            })
        }
        Err(e) => {
            error!("Failed to run the automation engine: {:#}", e);
            StageResult::Failure(StageError::ExecutionFailure {
                mode: mode.label(),
                code: 1,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DeployCommand;
    use crate::engine::MockAutomationEngine;
    use crate::testing;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_args_per_mode() {
        assert_eq!(RunMode::Apply.engine_args(false), vec!["--become"]);
        assert_eq!(
            RunMode::Simulate.engine_args(false),
            vec!["--become", "--check", "--diff"]
        );
        assert_eq!(
            RunMode::PartialUpdate.engine_args(false),
            vec!["--become", "--tags", "update"]
        );
    }

    #[test]
    fn test_engine_args_verbose_passthrough() {
        assert_eq!(RunMode::Apply.engine_args(true), vec!["--become", "-vv"]);
    }

    #[test]
    fn test_execute_maps_nonzero_exit_to_failure() {
        let workspace = testing::deploy_workspace();
        let ctx = testing::test_context(DeployCommand::Deploy, workspace.path());

        let mut engine = MockAutomationEngine::new();
        engine.expect_run_playbook().returning(|_, _, _| Ok(2));

        match execute(RunMode::Apply, &ctx, &engine) {
            StageResult::Failure(StageError::ExecutionFailure { mode, code }) => {
                assert_eq!(mode, "apply");
                assert_eq!(code, 2);
            }
            other => panic!("expected ExecutionFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_runs_exactly_once() {
        let workspace = testing::deploy_workspace();
        let ctx = testing::test_context(DeployCommand::Update, workspace.path());

        let mut engine = MockAutomationEngine::new();
        engine
            .expect_run_playbook()
            .times(1)
            .returning(|_, _, _| Ok(0));

        assert!(matches!(
            execute(RunMode::PartialUpdate, &ctx, &engine),
            StageResult::Success
        ));
    }
}
