use anyhow::Result;
use log::debug;

use crate::model::FilterSetting;

/// A transform over sheet rows. Mirrors the shape of a pipeline operator:
/// rows in, surviving rows out, with the caller accounting input/output
/// counts for reporting.
pub trait RowOperator {
    fn name(&self) -> &str;
    fn kind(&self) -> &str;
    fn apply(&self, rows: Vec<Vec<String>>) -> Result<Vec<Vec<String>>>;
}

/// Keeps data rows whose targeted rating column parses as an integer at or
/// above the threshold.
///
/// Input is the full source region (2-row header prefix, data from row 3);
/// output is the column-header row followed by the matching data rows in
/// their original order. A cell that does not parse as an integer excludes
/// its row silently — unranked display text is a natural filter miss, not an
/// error.
pub struct ThresholdFilter {
    setting: FilterSetting,
}

impl ThresholdFilter {
    pub fn new(setting: FilterSetting) -> Self {
        Self { setting }
    }

    fn matches(&self, row: &[String]) -> bool {
        row.get(self.setting.criterion.column())
            .and_then(|cell| cell.trim().parse::<i64>().ok())
            .is_some_and(|value| value >= i64::from(self.setting.threshold))
    }
}

impl RowOperator for ThresholdFilter {
    fn name(&self) -> &str {
        "threshold-filter"
    }

    fn kind(&self) -> &str {
        "filter"
    }

    fn apply(&self, rows: Vec<Vec<String>>) -> Result<Vec<Vec<String>>> {
        if rows.len() < 2 {
            anyhow::bail!("source region is missing its header prefix");
        }

        let mut result = vec![rows[1].clone()];
        let mut dropped = 0usize;
        for row in &rows[2..] {
            if self.matches(row) {
                result.push(row.clone());
            } else {
                dropped += 1;
            }
        }
        debug!(
            "{} >= {}: kept {} of {} data rows ({} dropped)",
            self.setting.criterion.label(),
            self.setting.threshold,
            result.len() - 1,
            rows.len() - 2,
            dropped
        );
        Ok(result)
    }
}
