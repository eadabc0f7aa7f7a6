use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Read-only view of the fleet topology as reported by the automation
/// engine's inventory listing. The orchestrator only queries it; host and
/// group definitions live entirely in the inventory file.
pub struct InventorySnapshot {
    topology: Value,
}

impl InventorySnapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        let topology: Value =
            serde_json::from_str(raw).context("Failed to parse inventory listing as JSON")?;
        Ok(InventorySnapshot { topology })
    }

    /// All hosts belonging to a group, including hosts of child groups.
    /// Unknown groups yield an empty list.
    pub fn group_hosts(&self, group: &str) -> Vec<String> {
        let mut seen_groups = BTreeSet::new();
        let mut hosts = BTreeSet::new();
        self.collect_group(group, &mut seen_groups, &mut hosts);
        hosts.into_iter().collect()
    }

    fn collect_group(
        &self,
        group: &str,
        seen: &mut BTreeSet<String>,
        hosts: &mut BTreeSet<String>,
    ) {
        if !seen.insert(group.to_string()) {
            return;
        }
        let node = match self.topology.get(group) {
            Some(node) => node,
            None => return,
        };
        if let Some(list) = node.get("hosts").and_then(Value::as_array) {
            for host in list.iter().filter_map(Value::as_str) {
                hosts.insert(host.to_string());
            }
        }
        if let Some(children) = node.get("children").and_then(Value::as_array) {
            for child in children.iter().filter_map(Value::as_str) {
                self.collect_group(child, seen, hosts);
            }
        }
    }
}

/// Variables the engine reports for a single host. Only the fields the
/// orchestrator cares about are kept; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct HostVars {
    pub ansible_host: Option<String>,
}

/// One resolved inventory host: logical name plus network address when the
/// lookup produced one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub name: String,
    pub address: Option<String>,
}

impl HostRecord {
    pub fn named(name: &str) -> Self {
        HostRecord {
            name: name.to_string(),
            address: None,
        }
    }

    /// The address to render in endpoint URLs, falling back to the
    /// logical name when no address is known.
    pub fn endpoint_host(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.name)
    }
}
