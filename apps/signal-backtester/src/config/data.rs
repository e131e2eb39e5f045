//! Market-data source configuration.

use serde::{Deserialize, Serialize};

/// Market-data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with `date`, `return`, optional `label` and feature columns.
    #[serde(default = "default_data_path")]
    pub path: String,
    /// Asset name shown in report headers and plot titles.
    #[serde(default = "default_asset_name")]
    pub asset_name: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            asset_name: default_asset_name(),
        }
    }
}

fn default_data_path() -> String {
    "data/prices.csv".to_string()
}

fn default_asset_name() -> String {
    "ASSET".to_string()
}
