use colored::Colorize;
use log::info;
use std::time::Instant;

use crate::context::{DeployCommand, RunContext};
use crate::engine::AutomationEngine;
use crate::report;
use crate::stages::executor::{self, RunMode};
use crate::stages::{connectivity, prereq, syntax, StageError, StageResult};

/// One discrete step of a command pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prerequisites,
    Connectivity,
    PlaybookSyntax,
    Execute(RunMode),
    AccessInfo,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Prerequisites => "prerequisites",
            Stage::Connectivity => "connectivity",
            Stage::PlaybookSyntax => "playbook syntax",
            Stage::Execute(mode) => mode.label(),
            Stage::AccessInfo => "access info",
        }
    }
}

/// The fixed pipeline for each command. Stage order is part of the
/// contract: every stage must succeed before the next one runs.
pub fn pipeline(command: DeployCommand) -> &'static [Stage] {
    match command {
        DeployCommand::Check => &[Stage::Prerequisites, Stage::Connectivity],
        DeployCommand::Validate => &[Stage::Prerequisites, Stage::PlaybookSyntax],
        DeployCommand::Deploy => &[
            Stage::Prerequisites,
            Stage::Connectivity,
            Stage::PlaybookSyntax,
            Stage::Execute(RunMode::Apply),
            Stage::AccessInfo,
        ],
        DeployCommand::DryRun => &[
            Stage::Prerequisites,
            Stage::Connectivity,
            Stage::PlaybookSyntax,
            Stage::Execute(RunMode::Simulate),
        ],
        DeployCommand::Update => &[
            Stage::Prerequisites,
            Stage::Connectivity,
            Stage::PlaybookSyntax,
            Stage::Execute(RunMode::PartialUpdate),
        ],
        DeployCommand::Info => &[Stage::AccessInfo],
    }
}

/// Run the selected command's pipeline in order, halting on the first
/// failing stage. The failure is returned to the caller, which hands it to
/// the failure handler.
pub fn run_command(ctx: &RunContext, engine: &dyn AutomationEngine) -> Result<(), StageError> {
    let start = Instant::now();
    let stages = pipeline(ctx.command);
    info!(
        "Running command '{}' ({} stages)",
        ctx.command.name(),
        stages.len()
    );

    for (index, stage) in stages.iter().enumerate() {
        info!("Stage {}/{}: {}", index + 1, stages.len(), stage.name());
        match run_stage(*stage, ctx, engine) {
            StageResult::Success => {}
            StageResult::Skipped => info!("Stage {} skipped", stage.name()),
            StageResult::Failure(err) => return Err(err),
        }
    }

    println!(
        "\n{}: {} ({} stages, {:.2?})",
        "SUCCESS".green().bold(),
        ctx.command.name(),
        stages.len(),
        start.elapsed()
    );
    Ok(())
}

fn run_stage(stage: Stage, ctx: &RunContext, engine: &dyn AutomationEngine) -> StageResult {
    match stage {
        Stage::Prerequisites => prereq::check(ctx, engine),
        Stage::Connectivity => connectivity::probe(ctx, engine),
        Stage::PlaybookSyntax => syntax::validate(ctx, engine),
        Stage::Execute(mode) => executor::execute(mode, ctx, engine),
        Stage::AccessInfo => {
            print!("{}", report::report(ctx, engine));
            StageResult::Success
        }
    }
}
