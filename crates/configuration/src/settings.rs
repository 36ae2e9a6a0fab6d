use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataPaths,
    #[serde(default)]
    pub reports: ReportSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Locations of the four input CSV files.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Item catalog: item code, item name, category code, category name.
    pub items: PathBuf,
    /// Daily sales transactions, one line per sale or return.
    pub daily_sales: PathBuf,
    /// Daily wholesale price per item.
    pub wholesale_prices: PathBuf,
    /// Loss (spoilage) rate per item.
    pub item_loss: PathBuf,
}

/// How "top N" reports cut their sorted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TopCutPolicy {
    /// Keep exactly N rows; a tie across the boundary is cut in input order.
    #[default]
    Rows,
    /// Keep every row whose dense rank is at most N, so boundary ties survive.
    Rank,
}

/// Controls which reports run and how.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    #[serde(default)]
    pub top_cut: TopCutPolicy,
    /// Run independent reports on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Report ids to run. All reports run when absent.
    #[serde(default)]
    pub enabled: Option<Vec<String>>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_cut: TopCutPolicy::default(),
            parallel: default_parallel(),
            enabled: None,
        }
    }
}

fn default_parallel() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `reports=debug`. `RUST_LOG` wins if set.
    #[serde(default = "default_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
