//! Shared testing utilities for stackpilot unit tests
//!
//! Fixture builders for run contexts and canned automation-engine output,
//! kept here so unit and integration tests share one set of patterns.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::context::{DeployCommand, RunContext};

/// Create a workspace directory holding a minimal inventory and playbook.
pub fn deploy_workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp workspace");
    fs::write(
        dir.path().join("inventory.ini"),
        "[monitoring]\nmon01 ansible_host=10.0.0.2\n\n[gpu]\ngpu01 ansible_host=10.0.0.5\n",
    )
    .expect("write inventory fixture");
    fs::write(
        dir.path().join("site.yml"),
        "---\n- hosts: all\n  tasks: []\n",
    )
    .expect("write playbook fixture");
    dir
}

/// Build a RunContext rooted in the given workspace directory. The cleanup
/// playbook path points into the workspace but the file is not created;
/// tests that want compensation to run write it themselves.
pub fn test_context(command: DeployCommand, workspace: &Path) -> RunContext {
    let mut ctx = RunContext::new(
        command,
        false,
        workspace.join("inventory.ini"),
        workspace.join("site.yml"),
        workspace.join("deploy-test.log"),
    );
    ctx.cleanup_playbook = workspace.join("cleanup.yml");
    ctx
}

/// Canned inventory-listing topology: one control-plane host and one gpu
/// host, with the gpu group reachable through a parent group.
pub fn sample_topology() -> String {
    r#"{
        "_meta": {
            "hostvars": {
                "mon01": {"ansible_host": "10.0.0.2"},
                "gpu01": {"ansible_host": "10.0.0.5"}
            }
        },
        "all": {"children": ["ungrouped", "monitoring", "compute"]},
        "monitoring": {"hosts": ["mon01"]},
        "compute": {"children": ["gpu"]},
        "gpu": {"hosts": ["gpu01"]}
    }"#
    .to_string()
}

/// Canned per-host variable dump for the given address.
pub fn sample_host_vars(address: &str) -> String {
    format!(
        r#"{{"ansible_host": "{}", "ansible_user": "ops", "ansible_port": 22}}"#,
        address
    )
}
