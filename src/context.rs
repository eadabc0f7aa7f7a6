use std::path::PathBuf;

pub const DEFAULT_INVENTORY: &str = "inventory.ini";
pub const DEFAULT_PLAYBOOK: &str = "site.yml";
pub const CLEANUP_PLAYBOOK: &str = "cleanup.yml";

/// The operation selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployCommand {
    Check,
    Validate,
    Deploy,
    DryRun,
    Update,
    Info,
}

impl DeployCommand {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "check" => Some(DeployCommand::Check),
            "validate" => Some(DeployCommand::Validate),
            "deploy" => Some(DeployCommand::Deploy),
            "dry-run" => Some(DeployCommand::DryRun),
            "update" => Some(DeployCommand::Update),
            "info" => Some(DeployCommand::Info),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeployCommand::Check => "check",
            DeployCommand::Validate => "validate",
            DeployCommand::Deploy => "deploy",
            DeployCommand::DryRun => "dry-run",
            DeployCommand::Update => "update",
            DeployCommand::Info => "info",
        }
    }
}

/// Per-invocation state threaded through every pipeline stage.
///
/// Created once by `main`, owned by the dispatcher, destroyed at process
/// exit. The exit status is monotonic: the first recorded code wins and
/// later recordings are ignored, so the process always reports the root
/// cause of a failed run.
#[derive(Debug)]
pub struct RunContext {
    pub command: DeployCommand,
    pub verbose: bool,
    pub inventory: PathBuf,
    pub playbook: PathBuf,
    pub cleanup_playbook: PathBuf,
    pub log_path: PathBuf,
    exit_status: Option<i32>,
}

impl RunContext {
    pub fn new(
        command: DeployCommand,
        verbose: bool,
        inventory: PathBuf,
        playbook: PathBuf,
        log_path: PathBuf,
    ) -> Self {
        RunContext {
            command,
            verbose,
            inventory,
            playbook,
            cleanup_playbook: PathBuf::from(CLEANUP_PLAYBOOK),
            log_path,
            exit_status: None,
        }
    }

    /// Record the terminal exit status. Only the first call has any effect.
    pub fn record_exit(&mut self, code: i32) {
        if self.exit_status.is_none() {
            self.exit_status = Some(code);
        }
    }

    /// The status the process reports to its caller (0 if nothing failed).
    pub fn exit_status(&self) -> i32 {
        self.exit_status.unwrap_or(0)
    }
}
