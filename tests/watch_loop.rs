use ratingwatch::config::WatchConfig;
use ratingwatch::io::csv::CsvStore;
use ratingwatch::io::memory::MemoryStore;
use ratingwatch::io::publish::publish_source;
use ratingwatch::io::scrape::{ScrapeBundle, TabularSource};
use ratingwatch::io::{CellAddr, SheetStore, ValueMode};
use ratingwatch::model::{Criterion, FilterSetting, Record};
use ratingwatch::runtime::{run_with, TickState, Watcher};

struct CannedSource {
    records: Vec<Record>,
    skipped: usize,
}

impl TabularSource for CannedSource {
    fn scrape(&mut self) -> anyhow::Result<ScrapeBundle> {
        Ok(ScrapeBundle {
            records: self.records.clone(),
            skipped: self.skipped,
        })
    }
}

fn record(name: &str, classical: &str, rapid: &str, bullet: &str) -> Record {
    Record {
        name: name.into(),
        classical: classical.into(),
        rapid: rapid.into(),
        bullet: bullet.into(),
    }
}

fn leaderboard() -> Vec<Record> {
    vec![
        record("Alice", "2000", "1800", "1600"),
        record("Bob", "1500", "1700", "1900"),
        record("Carol", "Unrated", "1900", "2000"),
    ]
}

fn config_for(dir: &std::path::Path) -> WatchConfig {
    let yaml = format!(
        r#"
name: watch-test
source:
  url: https://example.com/ratings
store:
  backend: csv
  path: {}
  source_region: Tops
  result_region: Result
poll:
  interval_secs: 1
  max_ticks: 1
"#,
        dir.display()
    );
    WatchConfig::from_yaml_str(&yaml).unwrap()
}

/// Overwrite one cell of a region in place.
fn set_cell<S: SheetStore>(store: &mut S, region_name: &str, cell: &str, value: &str) {
    let region = store.get_or_create_region(region_name).unwrap();
    let mut rows = store.read_all_rows(region).unwrap();
    let addr = CellAddr::parse(cell).unwrap();
    while rows.len() < addr.row {
        rows.push(Vec::new());
    }
    let row = &mut rows[addr.row - 1];
    while row.len() < addr.col {
        row.push(String::new());
    }
    row[addr.col - 1] = value.to_string();
    store.clear(region).unwrap();
    store
        .insert_rows(region, &rows, 1, ValueMode::UserEntered)
        .unwrap();
}

#[test]
fn run_publishes_through_a_csv_store_and_writes_a_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_for(tmp.path());
    let store = CsvStore::open(tmp.path()).unwrap();
    let mut source = CannedSource {
        records: leaderboard(),
        skipped: 1,
    };

    run_with(&config, store, &mut source).unwrap();

    // Region file reflects the published layout.
    let mut reopened = CsvStore::open(tmp.path()).unwrap();
    let tops = reopened.get_or_create_region("Tops").unwrap();
    let rows = reopened.read_all_rows(tops).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1], vec!["Name", "Classical", "Rapid", "Bullet"]);
    assert_eq!(rows[2][0], "Alice");
    assert_eq!(rows[4][0], "Carol");

    // No setting was ever present, so the result region stays empty.
    let result = reopened.get_or_create_region("Result").unwrap();
    assert!(reopened.read_all_rows(result).unwrap().is_empty());

    let manifest = std::fs::read_to_string(tmp.path().join("manifest.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(manifest["scraped_rows"], 3);
    assert_eq!(manifest["skipped_rows"], 1);
    assert_eq!(manifest["passes"].as_array().unwrap().len(), 0);
}

#[test]
fn edit_sequence_drives_the_loop_through_all_transitions() {
    let mut watcher = Watcher::new(MemoryStore::new(), "Tops", "Result").unwrap();
    let source = watcher
        .store_mut()
        .get_or_create_region("Tops")
        .unwrap();
    publish_source(watcher.store_mut(), source, leaderboard()).unwrap();

    // Tick 1: nothing set yet.
    assert_eq!(watcher.tick().unwrap().state, TickState::Idle);

    // Tick 2: user enters a classical threshold.
    set_cell(watcher.store_mut(), "Tops", "B1", "1800");
    let setting = FilterSetting {
        criterion: Criterion::Classical,
        threshold: 1800,
    };
    assert_eq!(watcher.tick().unwrap().state, TickState::Stable(setting));
    let result = watcher.store_mut().get_or_create_region("Result").unwrap();
    let rows = watcher.store().read_all_rows(result).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "Alice");

    // Tick 3: unchanged setting, no redundant write.
    assert_eq!(watcher.tick().unwrap().state, TickState::Idle);

    // Tick 4: switching to a rapid threshold replaces the result wholesale;
    // Carol's unrated classical cell no longer matters on this column.
    set_cell(watcher.store_mut(), "Tops", "B1", "");
    set_cell(watcher.store_mut(), "Tops", "C1", "1800");
    let outcome = watcher.tick().unwrap();
    assert_eq!(
        outcome.state,
        TickState::Stable(FilterSetting {
            criterion: Criterion::Rapid,
            threshold: 1800,
        })
    );
    let rows = watcher.store().read_all_rows(result).unwrap();
    let names: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["Alice", "Carol"]);
    let pass = outcome.pass.unwrap();
    assert_eq!(pass.input_rows, 3);
    assert_eq!(pass.output_rows, 2);
    assert_eq!(pass.filtered_rows, 1);

    // Tick 5: reverting to the already-applied pair changes nothing.
    set_cell(watcher.store_mut(), "Tops", "C1", "1800");
    assert_eq!(watcher.tick().unwrap().state, TickState::Idle);
}
