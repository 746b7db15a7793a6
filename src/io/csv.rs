use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use log::debug;

use super::{cell_at, splice_rows, CellAddr, RegionId, SheetStore, StoreError, ValueMode};

/// File-backed sheet store: one CSV file per region under a directory.
///
/// Every write rewrites the region file whole, so a file on disk always
/// reflects exactly one completed store operation.
#[derive(Debug)]
pub struct CsvStore {
    dir: PathBuf,
    regions: Vec<String>,
}

impl CsvStore {
    /// Open (creating if needed) a store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            regions: Vec::new(),
        })
    }

    fn region_path(&self, id: RegionId) -> Result<PathBuf, StoreError> {
        let name = self
            .regions
            .get(id.0)
            .ok_or(StoreError::UnknownRegion(id))?;
        Ok(self.dir.join(format!("{}.csv", sanitize(name))))
    }

    fn load(&self, id: RegionId) -> Result<Vec<Vec<String>>, StoreError> {
        let path = self.region_path(id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_grid(&path)
    }

    fn save(&self, id: RegionId, grid: &[Vec<String>]) -> Result<(), StoreError> {
        let path = self.region_path(id)?;
        write_grid(&path, grid)
    }
}

impl SheetStore for CsvStore {
    fn get_or_create_region(&mut self, name: &str) -> Result<RegionId, StoreError> {
        if let Some(idx) = self.regions.iter().position(|r| r == name) {
            return Ok(RegionId(idx));
        }
        self.regions.push(name.to_string());
        let id = RegionId(self.regions.len() - 1);
        let path = self.region_path(id)?;
        if !path.exists() {
            write_grid(&path, &[])?;
        }
        Ok(id)
    }

    fn clear(&mut self, region: RegionId) -> Result<(), StoreError> {
        self.save(region, &[])
    }

    fn insert_rows(
        &mut self,
        region: RegionId,
        rows: &[Vec<String>],
        at_row: usize,
        mode: ValueMode,
    ) -> Result<(), StoreError> {
        debug!("csv insert: {} rows at {} ({:?})", rows.len(), at_row, mode);
        let mut grid = self.load(region)?;
        splice_rows(&mut grid, rows, at_row)?;
        self.save(region, &grid)
    }

    fn read_cell(&self, region: RegionId, addr: CellAddr) -> Result<Option<String>, StoreError> {
        Ok(cell_at(&self.load(region)?, addr))
    }

    fn read_all_rows(&self, region: RegionId) -> Result<Vec<Vec<String>>, StoreError> {
        self.load(region)
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn read_grid(path: &Path) -> Result<Vec<Vec<String>>, StoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        // A padded empty row round-trips as a single empty field.
        if row.len() == 1 && row[0].is_empty() {
            grid.push(Vec::new());
        } else {
            grid.push(row);
        }
    }
    Ok(grid)
}

fn write_grid(path: &Path, grid: &[Vec<String>]) -> Result<(), StoreError> {
    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
    for row in grid {
        if row.is_empty() {
            writer.write_record([""])?;
        } else {
            writer.write_record(row)?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn regions_persist_across_operations() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CsvStore::open(tmp.path()).unwrap();
        let r = store.get_or_create_region("Tops").unwrap();
        store
            .insert_rows(r, &[row(&["Alice", "2000"])], 1, ValueMode::UserEntered)
            .unwrap();
        store
            .insert_rows(r, &[row(&["Bob", "1500"])], 2, ValueMode::UserEntered)
            .unwrap();
        assert_eq!(
            store.read_all_rows(r).unwrap(),
            vec![row(&["Alice", "2000"]), row(&["Bob", "1500"])]
        );
        assert!(tmp.path().join("Tops.csv").exists());
    }

    #[test]
    fn clear_truncates_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CsvStore::open(tmp.path()).unwrap();
        let r = store.get_or_create_region("Result").unwrap();
        store
            .insert_rows(r, &[row(&["x"])], 1, ValueMode::Raw)
            .unwrap();
        store.clear(r).unwrap();
        assert!(store.read_all_rows(r).unwrap().is_empty());
    }

    #[test]
    fn region_names_are_sanitized() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CsvStore::open(tmp.path()).unwrap();
        store.get_or_create_region("my region/1").unwrap();
        assert!(tmp.path().join("my_region_1.csv").exists());
    }

    #[test]
    fn read_cell_addresses_match_grid() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CsvStore::open(tmp.path()).unwrap();
        let r = store.get_or_create_region("Tops").unwrap();
        store
            .insert_rows(
                r,
                &[row(&["header", "1800"]), row(&["Alice", "2000"])],
                1,
                ValueMode::UserEntered,
            )
            .unwrap();
        let b1 = CellAddr::parse("B1").unwrap();
        assert_eq!(store.read_cell(r, b1).unwrap().as_deref(), Some("1800"));
        let a2 = CellAddr::parse("A2").unwrap();
        assert_eq!(store.read_cell(r, a2).unwrap().as_deref(), Some("Alice"));
        let c3 = CellAddr::parse("C3").unwrap();
        assert_eq!(store.read_cell(r, c3).unwrap(), None);
    }
}
