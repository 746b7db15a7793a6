use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub name: String,
    pub source: SourceConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Leaderboard page to scrape.
    pub url: String,
    /// Optional cap on scraped rows.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend ("csv" is the bundled one).
    pub backend: String,
    /// Directory holding the region files.
    pub path: String,
    pub source_region: String,
    pub result_region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Sleep between ticks.
    pub interval_secs: u64,
    /// Stop after this many ticks (smoke runs and tests); absent = forever.
    pub max_ticks: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_ticks: None,
        }
    }
}

impl WatchConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: WatchConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;

        // Validate
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }
        if self.source.url.trim().is_empty() {
            anyhow::bail!("source.url must not be empty");
        }
        if self.store.source_region == self.store.result_region {
            anyhow::bail!(
                "store.source_region and store.result_region must differ (both are '{}')",
                self.store.source_region
            );
        }
        if self.poll.interval_secs == 0 {
            anyhow::bail!("poll.interval_secs must be at least 1");
        }
        Ok(())
    }
}
