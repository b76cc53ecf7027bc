use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::pipeline::DEFAULT_AGGREGATION_THRESHOLD;
use crate::errors::AppError;

/// File name of the optional override file in the data root.
pub const CONFIG_FILE_NAME: &str = "dashboard.json";

/// Dashboard settings. Every field has a default so a partial
/// `dashboard.json` is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset location; relative paths resolve against the data root.
    pub data_file: PathBuf,
    /// Row count above which the charts switch to daily bars.
    pub aggregation_threshold: usize,
    /// Used in chart titles and as the candlestick trace name.
    pub asset_name: String,
    pub price_chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/clean/bitcoin_1h_engineered.parquet"),
            aggregation_threshold: DEFAULT_AGGREGATION_THRESHOLD,
            asset_name: "Bitcoin".to_string(),
            price_chart_height: 600,
        }
    }
}

impl DashboardConfig {
    /// Load `dashboard.json` from `root` if present, otherwise defaults.
    /// `data_file` is made absolute against `root`.
    pub fn load(root: &Path) -> Result<Self, AppError> {
        let path = root.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let parsed: DashboardConfig = serde_json::from_str(&raw)
                .map_err(|e| AppError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
            info!("Loaded configuration from {}", path.display());
            parsed
        } else {
            DashboardConfig::default()
        };

        if config.data_file.is_relative() {
            config.data_file = root.join(&config.data_file);
        }
        Ok(config)
    }
}

/// Platform-aware root directory holding `data/` and `dashboard.json`.
pub fn resolve_root_dir() -> PathBuf {
    resolve_root_path().unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_root_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let base = exe.parent()?;

    if cfg!(debug_assertions) {
        // In dev: walk up from target/debug to the workspace root
        let mut dir = base.to_path_buf();
        for _ in 0..2 {
            dir = dir.parent()?.to_path_buf();
        }
        Some(dir)
    } else {
        Some(base.to_path_buf())
    }
}
