use crate::model::{Record, COLUMN_HEADERS, FIRST_DATA_ROW, INSTRUCTION_ROW};

use super::{RegionId, SheetStore, StoreError, ValueMode};

fn header_row() -> Vec<String> {
    COLUMN_HEADERS.iter().map(|s| s.to_string()).collect()
}

/// Publish a freshly scraped dataset into the source region.
///
/// Destructive overwrite: clears the region, writes the instructional row at
/// row 1, the column headers at row 2, and all data rows from row 3. Returns
/// the number of data rows written. A failure here is fatal to the run —
/// without source data there is nothing to filter.
pub fn publish_source(
    store: &mut dyn SheetStore,
    source: RegionId,
    records: Vec<Record>,
) -> Result<usize, StoreError> {
    let rows: Vec<Vec<String>> = records.into_iter().map(Record::into_row).collect();
    let count = rows.len();

    store.clear(source)?;
    store.insert_rows(
        source,
        &[vec![INSTRUCTION_ROW.to_string()]],
        1,
        ValueMode::UserEntered,
    )?;
    store.insert_rows(source, &[header_row()], 2, ValueMode::UserEntered)?;
    store.insert_rows(source, &rows, FIRST_DATA_ROW, ValueMode::UserEntered)?;
    Ok(count)
}

/// Replace the result region with a filtered result set (header + rows).
///
/// Always a full clear-and-insert, never an incremental patch, so the region
/// exactly reflects the last applied filter with no stale rows. Returns the
/// number of data rows written (header excluded).
pub fn write_result(
    store: &mut dyn SheetStore,
    result: RegionId,
    result_set: &[Vec<String>],
) -> Result<usize, StoreError> {
    store.clear(result)?;
    store.insert_rows(result, result_set, 1, ValueMode::UserEntered)?;
    Ok(result_set.len().saturating_sub(1))
}
