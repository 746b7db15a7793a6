use log::debug;

use super::{cell_at, splice_rows, CellAddr, RegionId, SheetStore, StoreError, ValueMode};

/// In-memory sheet store. Backs the unit and integration tests and is handy
/// for embedding the watcher without any files on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    regions: Vec<NamedRegion>,
}

#[derive(Debug)]
struct NamedRegion {
    name: String,
    rows: Vec<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn region(&self, id: RegionId) -> Result<&NamedRegion, StoreError> {
        self.regions.get(id.0).ok_or(StoreError::UnknownRegion(id))
    }

    fn region_mut(&mut self, id: RegionId) -> Result<&mut NamedRegion, StoreError> {
        self.regions
            .get_mut(id.0)
            .ok_or(StoreError::UnknownRegion(id))
    }
}

impl SheetStore for MemoryStore {
    fn get_or_create_region(&mut self, name: &str) -> Result<RegionId, StoreError> {
        if let Some(idx) = self.regions.iter().position(|r| r.name == name) {
            return Ok(RegionId(idx));
        }
        self.regions.push(NamedRegion {
            name: name.to_string(),
            rows: Vec::new(),
        });
        Ok(RegionId(self.regions.len() - 1))
    }

    fn clear(&mut self, region: RegionId) -> Result<(), StoreError> {
        self.region_mut(region)?.rows.clear();
        Ok(())
    }

    fn insert_rows(
        &mut self,
        region: RegionId,
        rows: &[Vec<String>],
        at_row: usize,
        mode: ValueMode,
    ) -> Result<(), StoreError> {
        debug!("memory insert: {} rows at {} ({:?})", rows.len(), at_row, mode);
        splice_rows(&mut self.region_mut(region)?.rows, rows, at_row)
    }

    fn read_cell(&self, region: RegionId, addr: CellAddr) -> Result<Option<String>, StoreError> {
        Ok(cell_at(&self.region(region)?.rows, addr))
    }

    fn read_all_rows(&self, region: RegionId) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self.region(region)?.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut store = MemoryStore::new();
        let a = store.get_or_create_region("Tops").unwrap();
        let b = store.get_or_create_region("Tops").unwrap();
        assert_eq!(a, b);
        let c = store.get_or_create_region("Result").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn insert_then_read_round_trips() {
        let mut store = MemoryStore::new();
        let r = store.get_or_create_region("Tops").unwrap();
        store
            .insert_rows(r, &[row(&["a", "b"])], 1, ValueMode::UserEntered)
            .unwrap();
        store
            .insert_rows(r, &[row(&["c"])], 2, ValueMode::UserEntered)
            .unwrap();
        assert_eq!(
            store.read_all_rows(r).unwrap(),
            vec![row(&["a", "b"]), row(&["c"])]
        );
    }

    #[test]
    fn read_cell_out_of_range_is_none() {
        let mut store = MemoryStore::new();
        let r = store.get_or_create_region("Tops").unwrap();
        store
            .insert_rows(r, &[row(&["only"])], 1, ValueMode::Raw)
            .unwrap();
        let b1 = CellAddr::parse("B1").unwrap();
        assert_eq!(store.read_cell(r, b1).unwrap(), None);
        let a9 = CellAddr::parse("A9").unwrap();
        assert_eq!(store.read_cell(r, a9).unwrap(), None);
        let a1 = CellAddr::parse("A1").unwrap();
        assert_eq!(store.read_cell(r, a1).unwrap().as_deref(), Some("only"));
    }

    #[test]
    fn clear_empties_the_region_only() {
        let mut store = MemoryStore::new();
        let a = store.get_or_create_region("Tops").unwrap();
        let b = store.get_or_create_region("Result").unwrap();
        store
            .insert_rows(a, &[row(&["x"])], 1, ValueMode::Raw)
            .unwrap();
        store
            .insert_rows(b, &[row(&["y"])], 1, ValueMode::Raw)
            .unwrap();
        store.clear(a).unwrap();
        assert!(store.read_all_rows(a).unwrap().is_empty());
        assert_eq!(store.read_all_rows(b).unwrap(), vec![row(&["y"])]);
    }

    #[test]
    fn unknown_region_handle_errors() {
        let store = MemoryStore::new();
        assert!(store.read_all_rows(RegionId(7)).is_err());
    }
}
