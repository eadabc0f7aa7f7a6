use colored::Colorize;
use log::{info, warn};
use std::fmt::Write as _;

use crate::context::RunContext;
use crate::engine::AutomationEngine;
use crate::inventory::{HostRecord, HostVars, InventorySnapshot};

/// Group holding the host that runs Grafana and Prometheus.
pub const CONTROL_PLANE_GROUP: &str = "monitoring";
/// Group holding the accelerator-bearing hosts running the exporters.
pub const ACCELERATOR_GROUP: &str = "gpu";

const GRAFANA_PORT: u16 = 3000;
const PROMETHEUS_PORT: u16 = 9090;
const DCGM_EXPORTER_PORT: u16 = 9400;
const NODE_EXPORTER_PORT: u16 = 9100;

/// Render the access report for the deployed stack: control-plane service
/// URLs plus per-host exporter URLs for the accelerator group. Read-only
/// diagnostic path: any individual lookup failure degrades to the host's
/// logical name instead of aborting the report.
pub fn report(ctx: &RunContext, engine: &dyn AutomationEngine) -> String {
    info!(
        "Collecting access information from {}",
        ctx.inventory.display()
    );

    let snapshot = match engine.list_inventory(&ctx.inventory) {
        Ok((0, stdout, _)) => match InventorySnapshot::from_json(&stdout) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Inventory listing was not valid JSON: {:#}", e);
                None
            }
        },
        Ok((code, _, stderr)) => {
            warn!(
                "Inventory listing failed (exit code {}): {}",
                code,
                stderr.trim()
            );
            None
        }
        Err(e) => {
            warn!("Inventory listing could not be run: {:#}", e);
            None
        }
    };

    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=== Monitoring Stack Access ===".bold());

    let control_plane = snapshot
        .as_ref()
        .and_then(|s| s.group_hosts(CONTROL_PLANE_GROUP).into_iter().next())
        .unwrap_or_else(|| CONTROL_PLANE_GROUP.to_string());
    let record = resolve_host(ctx, engine, &control_plane);
    let _ = writeln!(out, "\n{} ({})", "Control plane".bold(), record.name);
    let _ = writeln!(
        out,
        "  Grafana:    http://{}:{}",
        record.endpoint_host(),
        GRAFANA_PORT
    );
    let _ = writeln!(
        out,
        "  Prometheus: http://{}:{}",
        record.endpoint_host(),
        PROMETHEUS_PORT
    );

    let gpu_hosts = snapshot
        .as_ref()
        .map(|s| s.group_hosts(ACCELERATOR_GROUP))
        .unwrap_or_default();
    if gpu_hosts.is_empty() {
        let _ = writeln!(out, "\nNo hosts found in group '{}'", ACCELERATOR_GROUP);
    } else {
        let _ = writeln!(out, "\n{}", "GPU nodes".bold());
        for name in &gpu_hosts {
            let record = resolve_host(ctx, engine, name);
            let _ = writeln!(out, "  {}:", record.name.green());
            let _ = writeln!(
                out,
                "    DCGM exporter: http://{}:{}",
                record.endpoint_host(),
                DCGM_EXPORTER_PORT
            );
            let _ = writeln!(
                out,
                "    Node exporter: http://{}:{}",
                record.endpoint_host(),
                NODE_EXPORTER_PORT
            );
        }
    }

    out
}

/// Resolve a host's network address through the engine's per-host lookup.
/// Unknown hosts and unparseable lookups fall back to the logical name.
fn resolve_host(ctx: &RunContext, engine: &dyn AutomationEngine, name: &str) -> HostRecord {
    match engine.host_vars(&ctx.inventory, name) {
        Ok((0, stdout)) => match serde_json::from_str::<HostVars>(&stdout) {
            Ok(vars) => HostRecord {
                name: name.to_string(),
                address: vars.ansible_host,
            },
            Err(e) => {
                warn!("Could not parse variables for host {}: {}", name, e);
                HostRecord::named(name)
            }
        },
        Ok((code, _)) => {
            warn!(
                "Host {} not found in inventory (exit code {}); showing logical name",
                name, code
            );
            HostRecord::named(name)
        }
        Err(e) => {
            warn!("Variable lookup for host {} failed: {:#}", name, e);
            HostRecord::named(name)
        }
    }
}
