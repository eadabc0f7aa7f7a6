//! Deployment orchestrator for a fleet monitoring stack.
//!
//! Stackpilot sequences pre-flight checks, connectivity probing, playbook
//! validation and staged execution; the configuration management itself is
//! delegated to the external automation engine.

pub mod cli;
pub mod context;
pub mod dispatch;
pub mod engine;
pub mod failure;
pub mod inventory;
pub mod logging;
pub mod report;
pub mod stages;
pub mod testing;
