use stackpilot::context::{self, DeployCommand, RunContext};
use stackpilot::engine::AnsibleRunner;
use stackpilot::failure::FailureHandler;
use stackpilot::{cli, dispatch, logging};

use anyhow::Result;
use log::info;
use std::path::PathBuf;
use std::process;

fn main() -> Result<()> {
    // Delay logger initialization until after parsing arguments
    let matches = cli::build_cli().get_matches();

    let command_name = matches
        .get_one::<String>("command")
        .map(|s| s.as_str())
        .unwrap_or("deploy");
    let command = match DeployCommand::parse(command_name) {
        Some(command) => command,
        None => {
            eprintln!("Unknown command: {}", command_name);
            process::exit(2);
        }
    };
    let verbose = matches.get_flag("verbose");
    let inventory = matches
        .get_one::<String>("inventory")
        .map(|s| s.as_str())
        .unwrap_or(context::DEFAULT_INVENTORY);
    let playbook = matches
        .get_one::<String>("playbook")
        .map(|s| s.as_str())
        .unwrap_or(context::DEFAULT_PLAYBOOK);

    // Every invocation gets a log file, including read-only ones.
    let log_path = logging::init(verbose)?;
    let mut ctx = RunContext::new(
        command,
        verbose,
        PathBuf::from(inventory),
        PathBuf::from(playbook),
        log_path,
    );

    info!("Starting stackpilot - monitoring stack deployment orchestrator");
    info!(
        "Command: {}, inventory: {}, playbook: {}",
        ctx.command.name(),
        ctx.inventory.display(),
        ctx.playbook.display()
    );

    let engine = AnsibleRunner::new();
    let mut handler = FailureHandler::arm();

    if let Err(stage_err) = dispatch::run_command(&ctx, &engine) {
        let code = handler.fire(&stage_err, &ctx, &engine);
        ctx.record_exit(code);
        process::exit(ctx.exit_status());
    }

    Ok(())
}
