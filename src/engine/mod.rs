pub mod runner;

use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

pub use runner::AnsibleRunner;

/// Narrow surface over the external automation engine: run a command,
/// stream or capture its output, report its exit status. Keeping the
/// orchestration logic behind this seam lets the pipelines run against a
/// fake engine in tests.
#[cfg_attr(test, automock)]
pub trait AutomationEngine {
    /// Resolve an executable on the search path.
    fn resolve_tool(&self, name: &str) -> Option<PathBuf>;

    /// Parse the inventory and return the engine's full topology dump as
    /// `(exit code, stdout, stderr)`.
    fn list_inventory(&self, inventory: &Path) -> Result<(i32, String, String)>;

    /// Look up a single host's variables as `(exit code, stdout)`. A
    /// nonzero exit means the host is unknown to the inventory.
    fn host_vars(&self, inventory: &Path, host: &str) -> Result<(i32, String)>;

    /// Reachability check against every host in the inventory, output
    /// streamed into the log.
    fn ping_all(&self, inventory: &Path) -> Result<i32>;

    /// Syntax-only parse of the playbook; never mutates remote state.
    fn syntax_check(&self, playbook: &Path, inventory: &Path) -> Result<i32>;

    /// Run the playbook with the given extra flags, output streamed into
    /// the log.
    fn run_playbook(&self, playbook: &Path, inventory: &Path, extra_args: &[String])
        -> Result<i32>;
}
