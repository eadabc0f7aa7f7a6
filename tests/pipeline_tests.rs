use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use pretty_assertions::assert_eq;

use stackpilot::context::DeployCommand;
use stackpilot::dispatch;
use stackpilot::engine::AutomationEngine;
use stackpilot::failure::FailureHandler;
use stackpilot::report;
use stackpilot::stages::StageError;
use stackpilot::testing;

/// Scripted engine double that records every call in order, so tests can
/// assert which stages actually ran and in what sequence.
struct ScriptedEngine {
    calls: RefCell<Vec<String>>,
    missing_tools: Vec<String>,
    inventory_code: i32,
    ping_code: i32,
    syntax_code: i32,
    playbook_code: i32,
    host_lookups_fail: bool,
}

impl ScriptedEngine {
    fn healthy() -> Self {
        ScriptedEngine {
            calls: RefCell::new(Vec::new()),
            missing_tools: Vec::new(),
            inventory_code: 0,
            ping_code: 0,
            syntax_code: 0,
            playbook_code: 0,
            host_lookups_fail: false,
        }
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl AutomationEngine for ScriptedEngine {
    fn resolve_tool(&self, name: &str) -> Option<PathBuf> {
        self.record(format!("resolve:{}", name));
        if self.missing_tools.iter().any(|tool| tool == name) {
            None
        } else {
            Some(PathBuf::from("/usr/bin").join(name))
        }
    }

    fn list_inventory(&self, _inventory: &Path) -> Result<(i32, String, String)> {
        self.record("list_inventory".to_string());
        Ok((
            self.inventory_code,
            testing::sample_topology(),
            String::new(),
        ))
    }

    fn host_vars(&self, _inventory: &Path, host: &str) -> Result<(i32, String)> {
        self.record(format!("host_vars:{}", host));
        if self.host_lookups_fail {
            return Ok((1, String::new()));
        }
        let address = match host {
            "mon01" => "10.0.0.2",
            "gpu01" => "10.0.0.5",
            _ => return Ok((1, String::new())),
        };
        Ok((0, testing::sample_host_vars(address)))
    }

    fn ping_all(&self, _inventory: &Path) -> Result<i32> {
        self.record("ping".to_string());
        Ok(self.ping_code)
    }

    fn syntax_check(&self, _playbook: &Path, _inventory: &Path) -> Result<i32> {
        self.record("syntax".to_string());
        Ok(self.syntax_code)
    }

    fn run_playbook(
        &self,
        playbook: &Path,
        _inventory: &Path,
        extra_args: &[String],
    ) -> Result<i32> {
        let name = playbook
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("?");
        self.record(format!("playbook:{}:{}", name, extra_args.join(" ")));
        Ok(self.playbook_code)
    }
}

#[test]
fn test_check_with_missing_tools_never_probes() {
    let workspace = testing::deploy_workspace();
    let ctx = testing::test_context(DeployCommand::Check, workspace.path());
    let engine = ScriptedEngine {
        missing_tools: vec!["ansible".to_string(), "ansible-inventory".to_string()],
        ..ScriptedEngine::healthy()
    };

    let err = dispatch::run_command(&ctx, &engine).unwrap_err();
    match &err {
        StageError::MissingTool(tools) => {
            // Every missing tool is reported in one failure.
            assert_eq!(
                tools,
                &vec!["ansible".to_string(), "ansible-inventory".to_string()]
            );
        }
        other => panic!("expected MissingTool, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);
    assert!(!engine.calls().contains(&"ping".to_string()));
}

#[test]
fn test_dry_run_stage_order() {
    let workspace = testing::deploy_workspace();
    let ctx = testing::test_context(DeployCommand::DryRun, workspace.path());
    let engine = ScriptedEngine::healthy();

    dispatch::run_command(&ctx, &engine).unwrap();

    assert_eq!(
        engine.calls(),
        vec![
            "resolve:ansible".to_string(),
            "resolve:ansible-playbook".to_string(),
            "resolve:ansible-inventory".to_string(),
            "resolve:docker".to_string(),
            "list_inventory".to_string(),
            "ping".to_string(),
            "syntax".to_string(),
            "playbook:site.yml:--become --check --diff".to_string(),
        ]
    );
}

#[test]
fn test_update_runs_tagged_subset() {
    let workspace = testing::deploy_workspace();
    let ctx = testing::test_context(DeployCommand::Update, workspace.path());
    let engine = ScriptedEngine::healthy();

    dispatch::run_command(&ctx, &engine).unwrap();

    let calls = engine.calls();
    assert_eq!(
        calls.last().map(String::as_str),
        Some("playbook:site.yml:--become --tags update")
    );
}

#[test]
fn test_unreachable_fleet_is_all_or_nothing() {
    let workspace = testing::deploy_workspace();
    let ctx = testing::test_context(DeployCommand::Deploy, workspace.path());
    let engine = ScriptedEngine {
        ping_code: 4,
        ..ScriptedEngine::healthy()
    };

    let err = dispatch::run_command(&ctx, &engine).unwrap_err();
    assert!(matches!(err, StageError::HostUnreachable { code: 4 }));
    assert_eq!(err.exit_code(), 4);
    // No mutating stage may run after the failed probe.
    assert!(!engine.calls().contains(&"syntax".to_string()));
    assert!(!engine
        .calls()
        .iter()
        .any(|call| call.starts_with("playbook:")));
}

#[test]
fn test_deploy_syntax_failure_skips_executor_and_cleanup_keeps_code() {
    let workspace = testing::deploy_workspace();
    let ctx = testing::test_context(DeployCommand::Deploy, workspace.path());
    fs::write(&ctx.cleanup_playbook, "---\n- hosts: all\n  tasks: []\n").unwrap();

    // Cleanup itself will exit 9; the pipeline failure code is 4.
    let engine = ScriptedEngine {
        syntax_code: 4,
        playbook_code: 9,
        ..ScriptedEngine::healthy()
    };

    let err = dispatch::run_command(&ctx, &engine).unwrap_err();
    assert!(matches!(
        err,
        StageError::InvalidPlaybookSyntax { code: 4, .. }
    ));
    assert!(!engine
        .calls()
        .iter()
        .any(|call| call.starts_with("playbook:site.yml")));

    let mut handler = FailureHandler::arm();
    let code = handler.fire(&err, &ctx, &engine);

    // Cleanup ran, failed with a different status, and the original code
    // still wins.
    assert!(engine
        .calls()
        .iter()
        .any(|call| call.starts_with("playbook:cleanup.yml:--become")));
    assert_eq!(code, 4);
    assert!(handler.is_done());
}

#[test]
fn test_info_pipeline_only_reports() {
    let workspace = testing::deploy_workspace();
    let ctx = testing::test_context(DeployCommand::Info, workspace.path());
    let engine = ScriptedEngine::healthy();

    dispatch::run_command(&ctx, &engine).unwrap();

    let calls = engine.calls();
    assert!(!calls.iter().any(|call| call.starts_with("resolve:")));
    assert!(!calls.contains(&"ping".to_string()));
    assert!(!calls.iter().any(|call| call.starts_with("playbook:")));
    assert!(calls.contains(&"host_vars:gpu01".to_string()));
}

#[test]
fn test_info_report_renders_gpu_endpoints() {
    let workspace = testing::deploy_workspace();
    let ctx = testing::test_context(DeployCommand::Info, workspace.path());
    let engine = ScriptedEngine::healthy();

    let text = report::report(&ctx, &engine);
    assert!(text.contains("http://10.0.0.2:3000"));
    assert!(text.contains("http://10.0.0.2:9090"));
    assert!(text.contains("http://10.0.0.5:9400"));
    assert!(text.contains("http://10.0.0.5:9100"));
}

#[test]
fn test_info_report_degrades_to_logical_names() {
    let workspace = testing::deploy_workspace();
    let ctx = testing::test_context(DeployCommand::Info, workspace.path());
    let engine = ScriptedEngine {
        host_lookups_fail: true,
        ..ScriptedEngine::healthy()
    };

    let text = report::report(&ctx, &engine);
    assert!(text.contains("http://mon01:3000"));
    assert!(text.contains("http://gpu01:9400"));
}
