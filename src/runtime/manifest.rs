use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{Criterion, FilterSetting};

/// On-disk record of a run: what was scraped and every filter pass applied.
/// Rewritten next to the store after publish and after each pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub watch_name: String,
    pub source_url: String,
    pub scraped_rows: usize,
    pub skipped_rows: usize,
    pub passes: Vec<FilterPassManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterPassManifest {
    pub criterion: Criterion,
    pub threshold: u32,
    pub input_rows: usize,
    pub output_rows: usize,
    pub filtered_rows: usize,
}

impl RunManifest {
    pub fn new(watch_name: String, source_url: String) -> Self {
        Self {
            watch_name,
            source_url,
            scraped_rows: 0,
            skipped_rows: 0,
            passes: Vec::new(),
        }
    }

    pub fn add_pass(&mut self, pass: FilterPassManifest) {
        self.passes.push(pass);
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

impl FilterPassManifest {
    pub fn from_counts(setting: FilterSetting, input_rows: usize, output_rows: usize) -> Self {
        Self {
            criterion: setting.criterion,
            threshold: setting.threshold,
            input_rows,
            output_rows,
            filtered_rows: input_rows.saturating_sub(output_rows),
        }
    }
}
