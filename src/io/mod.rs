use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub mod csv;
pub mod memory;
pub mod publish;
pub mod scrape;
pub mod settings;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown region handle {0:?}")]
    UnknownRegion(RegionId),
    #[error("invalid cell address '{0}'")]
    BadAddress(String),
    #[error("invalid insert position {0} (rows are 1-based)")]
    BadRow(usize),
    #[error("store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("region file error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Opaque handle to a named region, returned by [`SheetStore::get_or_create_region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(pub(crate) usize);

/// How inserted cell text should be interpreted by the backing store.
///
/// `UserEntered` asks for formula/locale-aware interpretation, `Raw` for
/// literal storage. The bundled file backends persist text literally either
/// way, but the mode travels through the API so a remote backend can honor it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    Raw,
    UserEntered,
}

/// A single cell position in A1 notation, parsed to 1-based coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddr {
    pub row: usize,
    pub col: usize,
}

impl CellAddr {
    /// Parse an A1-style address like `B1` or `AA12`.
    pub fn parse(addr: &str) -> Result<Self, StoreError> {
        static A1: OnceLock<Regex> = OnceLock::new();
        let re = A1.get_or_init(|| Regex::new(r"^([A-Z]+)([1-9][0-9]*)$").expect("valid regex"));

        let caps = re
            .captures(addr.trim())
            .ok_or_else(|| StoreError::BadAddress(addr.to_string()))?;

        let mut col = 0usize;
        for c in caps[1].chars() {
            col = col * 26 + (c as usize - 'A' as usize + 1);
        }
        let row: usize = caps[2]
            .parse()
            .map_err(|_| StoreError::BadAddress(addr.to_string()))?;

        Ok(CellAddr { row, col })
    }
}

/// Key-value sheet access the watcher runs against: named rectangular regions
/// ("source" and "result") of display strings.
///
/// Reads are side-effect-free; writes are destructive within their region.
pub trait SheetStore {
    fn get_or_create_region(&mut self, name: &str) -> Result<RegionId, StoreError>;

    /// Drop every row of the region.
    fn clear(&mut self, region: RegionId) -> Result<(), StoreError>;

    /// Insert `rows` before 1-based position `at_row`, padding with empty
    /// rows when the region is shorter than `at_row - 1`.
    fn insert_rows(
        &mut self,
        region: RegionId,
        rows: &[Vec<String>],
        at_row: usize,
        mode: ValueMode,
    ) -> Result<(), StoreError>;

    /// Read one cell. `Ok(None)` when the cell is outside the stored area.
    fn read_cell(&self, region: RegionId, addr: CellAddr) -> Result<Option<String>, StoreError>;

    fn read_all_rows(&self, region: RegionId) -> Result<Vec<Vec<String>>, StoreError>;
}

/// Shared splice logic for the row grids both backends maintain.
pub(crate) fn splice_rows(
    grid: &mut Vec<Vec<String>>,
    rows: &[Vec<String>],
    at_row: usize,
) -> Result<(), StoreError> {
    if at_row == 0 {
        return Err(StoreError::BadRow(at_row));
    }
    let idx = at_row - 1;
    while grid.len() < idx {
        grid.push(Vec::new());
    }
    grid.splice(idx..idx, rows.iter().cloned());
    Ok(())
}

/// Look up one cell in a row grid; `None` outside the stored area.
pub(crate) fn cell_at(grid: &[Vec<String>], addr: CellAddr) -> Option<String> {
    let row = grid.get(addr.row.checked_sub(1)?)?;
    row.get(addr.col.checked_sub(1)?).cloned()
}
