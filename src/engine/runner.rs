use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::env;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::engine::AutomationEngine;

/// The real automation engine: Ansible invoked as external processes.
pub struct AnsibleRunner;

impl AnsibleRunner {
    pub fn new() -> Self {
        AnsibleRunner
    }

    /// Run a command to completion and capture its output.
    fn capture(&self, program: &str, args: &[String]) -> Result<(i32, String, String)> {
        debug!("Capturing command: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| anyhow!("Failed to execute {}: {}", program, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        Ok((output.status.code().unwrap_or(1), stdout, stderr))
    }

    /// Run a command, streaming its combined output into the log line by
    /// line so partial progress stays visible if the run is interrupted.
    fn stream(&self, program: &str, args: &[String]) -> Result<i32> {
        info!("Running: {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program))?;

        // Drain stderr on a helper thread so neither pipe can fill up and
        // stall the child while we read the other one.
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("No stderr handle for {}", program))?;
        let drain = thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|line| line.ok()) {
                warn!(target: "engine", "{}", line);
            }
        });

        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines().map_while(|line| line.ok()) {
                info!(target: "engine", "{}", line);
            }
        }

        let _ = drain.join();
        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {}", program))?;

        Ok(status.code().unwrap_or(1))
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

impl AutomationEngine for AnsibleRunner {
    fn resolve_tool(&self, name: &str) -> Option<PathBuf> {
        let path_var = env::var_os("PATH")?;
        for dir in env::split_paths(&path_var) {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    fn list_inventory(&self, inventory: &Path) -> Result<(i32, String, String)> {
        self.capture(
            "ansible-inventory",
            &["-i".to_string(), path_arg(inventory), "--list".to_string()],
        )
    }

    fn host_vars(&self, inventory: &Path, host: &str) -> Result<(i32, String)> {
        let (code, stdout, _stderr) = self.capture(
            "ansible-inventory",
            &[
                "-i".to_string(),
                path_arg(inventory),
                "--host".to_string(),
                host.to_string(),
            ],
        )?;
        Ok((code, stdout))
    }

    fn ping_all(&self, inventory: &Path) -> Result<i32> {
        self.stream(
            "ansible",
            &[
                "all".to_string(),
                "-i".to_string(),
                path_arg(inventory),
                "-m".to_string(),
                "ping".to_string(),
            ],
        )
    }

    fn syntax_check(&self, playbook: &Path, inventory: &Path) -> Result<i32> {
        self.stream(
            "ansible-playbook",
            &[
                "-i".to_string(),
                path_arg(inventory),
                "--syntax-check".to_string(),
                path_arg(playbook),
            ],
        )
    }

    fn run_playbook(
        &self,
        playbook: &Path,
        inventory: &Path,
        extra_args: &[String],
    ) -> Result<i32> {
        let mut args = vec!["-i".to_string(), path_arg(inventory), path_arg(playbook)];
        args.extend(extra_args.iter().cloned());
        self.stream("ansible-playbook", &args)
    }
}
