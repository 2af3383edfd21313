use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub event_capacity: usize,
    pub entry_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

fn default_worker_threads() -> usize {
    num_cpus::get().max(2)
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            event_capacity: 1_024,
            entry_capacity: 256,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            channels: ChannelConfig::default(),
            worker_threads: default_worker_threads(),
        }
    }
}

pub async fn load_config(path: &Path) -> Result<HistoryConfig> {
    let raw = fs::read(path)
        .await
        .with_context(|| format!("read config file: {}", path.display()))?;
    serde_json::from_slice(&raw).context("parse config json")
}
