use log::debug;

use crate::model::{Criterion, FilterSetting};

use super::{CellAddr, RegionId, SheetStore};

/// Read the three threshold cells (B1/C1/D1) and classify them.
///
/// The first criterion, in declared priority order, whose cell holds a
/// non-negative base-10 integer wins. Cells that are missing, empty,
/// non-numeric, or fail to read at all are each treated as "no setting" for
/// that cell — never as an error. Read-only and side-effect-free.
pub fn read_filter_settings(
    store: &dyn SheetStore,
    source: RegionId,
) -> Option<FilterSetting> {
    for criterion in Criterion::ALL {
        let addr = match CellAddr::parse(criterion.settings_cell()) {
            Ok(addr) => addr,
            Err(_) => continue,
        };
        let cell = match store.read_cell(source, addr) {
            Ok(cell) => cell,
            Err(err) => {
                debug!(
                    "settings cell {} unreadable ({}), treating as unset",
                    criterion.settings_cell(),
                    err
                );
                continue;
            }
        };
        if let Some(threshold) = cell.as_deref().and_then(parse_threshold) {
            return Some(FilterSetting {
                criterion,
                threshold,
            });
        }
    }
    None
}

/// Trimmed, non-empty, all ASCII digits — the same acceptance rule the sheet
/// users rely on. Anything else (signs, decimals, words) is not a setting.
fn parse_threshold(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
