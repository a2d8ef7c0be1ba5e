//! State file management
//!
//! One deployment = one JSON file holding the pool and its in-memory
//! ledger. A missing file is a fresh, uninitialized deployment.

use anyhow::{Context, Result};
use pool_engine::{InMemoryLedger, Pool};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Identity under which the ledger holds pool custody.
pub const POOL_ACCOUNT: &str = "pool";

#[derive(Debug, Serialize, Deserialize)]
pub struct HostState {
    pub pool: Pool<String>,
    pub ledger: InMemoryLedger<String>,
}

impl HostState {
    pub fn fresh() -> Self {
        Self {
            pool: Pool::new(POOL_ACCOUNT.to_string()),
            ledger: InMemoryLedger::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::fresh());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading state file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing state file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("serializing state")?;
        fs::write(path, raw).with_context(|| format!("writing state file {}", path.display()))
    }
}
