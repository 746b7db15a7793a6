use serde::{Deserialize, Serialize};

/// Instructional text placed in A1 of the source region; the threshold cells
/// B1/C1/D1 sit to its right on the same row.
pub const INSTRUCTION_ROW: &str = "Enter a rating threshold to filter by column:";

/// Column-name header written at row 2 of the source region and row 1 of the
/// result region.
pub const COLUMN_HEADERS: [&str; 4] = ["Name", "Classical", "Rapid", "Bullet"];

/// First data row of the source region (rows 1-2 are the header prefix).
pub const FIRST_DATA_ROW: usize = 3;

/// One scraped leaderboard entry. Rating fields are kept as the page displays
/// them; an unranked player carries a non-numeric marker there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub classical: String,
    pub rapid: String,
    pub bullet: String,
}

impl Record {
    pub fn into_row(self) -> Vec<String> {
        vec![self.name, self.classical, self.rapid, self.bullet]
    }
}

/// The three rating categories a filter can target, in priority order:
/// when several threshold cells hold valid numbers, the first declared
/// criterion wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Classical,
    Rapid,
    Bullet,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Classical, Criterion::Rapid, Criterion::Bullet];

    /// Index of this criterion's rating column in a data row (name is 0).
    pub fn column(self) -> usize {
        match self {
            Criterion::Classical => 1,
            Criterion::Rapid => 2,
            Criterion::Bullet => 3,
        }
    }

    /// A1 address of the threshold cell watched for this criterion.
    pub fn settings_cell(self) -> &'static str {
        match self {
            Criterion::Classical => "B1",
            Criterion::Rapid => "C1",
            Criterion::Bullet => "D1",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Criterion::Classical => "Classical",
            Criterion::Rapid => "Rapid",
            Criterion::Bullet => "Bullet",
        }
    }
}

/// A concrete (criterion, threshold) pair read from the settings cells.
///
/// "No setting" is `Option<FilterSetting>::None`, which doubles as the
/// first-tick sentinel: it compares unequal to every real setting, so the
/// first valid pair always triggers a filter pass. A threshold of 0 is a
/// valid setting, not "no setting".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSetting {
    pub criterion: Criterion,
    pub threshold: u32,
}
