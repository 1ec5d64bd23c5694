use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core_types::AccountId;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    /// "hourly" | "daily" | anything else = never
    pub rotation: String,
    /// Emit the wallet's internal `BWALLET` debug events
    #[serde(default)]
    pub enable_tracing: bool,
    pub wallet: WalletConfig,
}

/// Roles and approval settings the wallet starts with
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    pub owner: AccountId,
    pub platform_admin: AccountId,
    /// Account that holds custodied tokens at the token bank
    #[serde(default)]
    pub custody: AccountId,
    /// Added by the owner at startup, in order
    #[serde(default)]
    pub approvers: Vec<AccountId>,
    /// Fixed number of approvals per withdrawal; absent = majority
    #[serde(default)]
    pub quorum_threshold: Option<usize>,
    /// JSON-lines event journal; absent = in-memory only
    #[serde(default)]
    pub journal_path: Option<String>,
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        Self::from_file(format!("config/{}.yaml", env))
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
