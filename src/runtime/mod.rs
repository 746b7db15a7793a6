use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use crate::config::{StoreConfig, WatchConfig};
use crate::io::csv::CsvStore;
use crate::io::publish::{publish_source, write_result};
use crate::io::scrape::{HtmlTableSource, ScrapeBundle, TabularSource};
use crate::io::settings::read_filter_settings;
use crate::io::{RegionId, SheetStore};
use crate::model::FilterSetting;
use crate::operators::{RowOperator, ThresholdFilter};

mod manifest;
pub use manifest::{FilterPassManifest, RunManifest};

/// Explicit per-tick state of the change-detection loop.
///
/// `observe` decides between `Idle` and `SettingChanged`; a tick that carries
/// out a `SettingChanged` transition lands in `Stable` with that setting
/// applied. There is no terminal state — the loop runs until stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    Idle,
    SettingChanged(FilterSetting),
    Stable(FilterSetting),
}

/// What one tick did: the state it ended in, plus pass accounting when a
/// filter was applied.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub state: TickState,
    pub pass: Option<FilterPassManifest>,
}

/// The polling core: owns the two region handles and the single piece of
/// mutable loop state, `last_applied`.
///
/// `last_applied` starts as `None` — a sentinel unequal to every valid
/// setting — so the first parseable setting always triggers a filter pass,
/// threshold 0 included.
pub struct Watcher<S: SheetStore> {
    store: S,
    source: RegionId,
    result: RegionId,
    last_applied: Option<FilterSetting>,
}

impl<S: SheetStore> Watcher<S> {
    pub fn new(mut store: S, source_region: &str, result_region: &str) -> Result<Self> {
        let source = store.get_or_create_region(source_region)?;
        let result = store.get_or_create_region(result_region)?;
        Ok(Self {
            store,
            source,
            result,
            last_applied: None,
        })
    }

    /// Publish a scraped dataset into the source region. Returns the number
    /// of data rows written. Fatal on store failure — without source data
    /// the loop has nothing to filter.
    pub fn publish(&mut self, bundle: ScrapeBundle) -> Result<usize> {
        publish_source(&mut self.store, self.source, bundle.records)
            .context("Failed to publish scraped dataset to the source region")
    }

    /// The pure transition decision for this tick: no writes, no state change.
    ///
    /// A current setting equal to the last applied one is no change — even if
    /// the user edited away and back between ticks — because equality is on
    /// the full (criterion, threshold) pair, not a dirty flag.
    pub fn observe(&self) -> TickState {
        match read_filter_settings(&self.store, self.source) {
            Some(setting) if Some(setting) != self.last_applied => {
                TickState::SettingChanged(setting)
            }
            _ => TickState::Idle,
        }
    }

    /// Execute one tick: on `SettingChanged`, re-derive the result set from
    /// the current source rows, replace the result region, and record the
    /// setting as applied.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let setting = match self.observe() {
            TickState::SettingChanged(setting) => setting,
            state => return Ok(TickOutcome { state, pass: None }),
        };

        let rows = self.store.read_all_rows(self.source)?;
        let input_rows = rows.len().saturating_sub(2);
        let result_set = ThresholdFilter::new(setting).apply(rows)?;
        let written = write_result(&mut self.store, self.result, &result_set)?;
        self.last_applied = Some(setting);

        Ok(TickOutcome {
            state: TickState::Stable(setting),
            pass: Some(FilterPassManifest::from_counts(
                setting, input_rows, written,
            )),
        })
    }

    pub fn last_applied(&self) -> Option<FilterSetting> {
        self.last_applied
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// Scrape once, publish, then poll the threshold cells until stopped.
pub fn run_watch(config: &WatchConfig) -> Result<()> {
    let store = build_store(&config.store)?;
    let mut source = HtmlTableSource::new(&config.source.url, config.source.limit);
    run_with(config, store, &mut source)
}

/// Scrape and publish only — no poll loop.
pub fn run_once(config: &WatchConfig) -> Result<()> {
    let store = build_store(&config.store)?;
    let mut source = HtmlTableSource::new(&config.source.url, config.source.limit);

    let mut watcher = Watcher::new(
        store,
        &config.store.source_region,
        &config.store.result_region,
    )?;
    let mut manifest = RunManifest::new(config.name.clone(), config.source.url.clone());
    scrape_and_publish(config, &mut watcher, &mut manifest, &mut source)?;
    Ok(())
}

/// Core orchestration over any store backend and tabular source; the public
/// entry points and the integration tests both go through here.
pub fn run_with<S: SheetStore>(
    config: &WatchConfig,
    store: S,
    source: &mut dyn TabularSource,
) -> Result<()> {
    println!("Running watch: {}", config.name);

    let mut watcher = Watcher::new(
        store,
        &config.store.source_region,
        &config.store.result_region,
    )?;
    let mut manifest = RunManifest::new(config.name.clone(), config.source.url.clone());
    scrape_and_publish(config, &mut watcher, &mut manifest, source)?;

    println!(
        "Watching cells B1/C1/D1 of '{}' every {}s...",
        config.store.source_region, config.poll.interval_secs
    );

    let interval = Duration::from_secs(config.poll.interval_secs);
    let mut ticks = 0u64;
    loop {
        let outcome = watcher.tick()?;
        match outcome.state {
            TickState::Stable(setting) => {
                let pass = outcome.pass.expect("applied tick carries pass counts");
                println!(
                    "  ✓ Applied {} >= {}: wrote {} of {} rows to '{}'",
                    setting.criterion.label(),
                    setting.threshold,
                    pass.output_rows,
                    pass.input_rows,
                    config.store.result_region
                );
                manifest.add_pass(pass);
                write_manifest(config, &manifest)?;
            }
            TickState::Idle => {
                info!("no change, waiting");
            }
            TickState::SettingChanged(_) => unreachable!("tick resolves SettingChanged"),
        }

        ticks += 1;
        if let Some(max) = config.poll.max_ticks {
            if ticks >= max {
                println!("✓ Stopping after {} ticks", ticks);
                return Ok(());
            }
        }
        thread::sleep(interval);
    }
}

fn scrape_and_publish<S: SheetStore>(
    config: &WatchConfig,
    watcher: &mut Watcher<S>,
    manifest: &mut RunManifest,
    source: &mut dyn TabularSource,
) -> Result<()> {
    println!("  Scraping leaderboard: {}", config.source.url);
    let bundle = source.scrape()?;
    manifest.scraped_rows = bundle.records.len();
    manifest.skipped_rows = bundle.skipped;
    if bundle.skipped > 0 {
        println!("  Skipped {} malformed rows", bundle.skipped);
    }

    let published = watcher.publish(bundle)?;
    println!(
        "  ✓ Published {} rows to '{}'",
        published, config.store.source_region
    );
    write_manifest(config, manifest)?;
    Ok(())
}

fn write_manifest(config: &WatchConfig, manifest: &RunManifest) -> Result<()> {
    let dir = Path::new(&config.store.path);
    std::fs::create_dir_all(dir)?;
    manifest.write_to_file(dir.join("manifest.json"))
}

fn build_store(config: &StoreConfig) -> Result<CsvStore> {
    match config.backend.as_str() {
        "csv" => Ok(CsvStore::open(&config.path)?),
        other => anyhow::bail!("Unsupported store backend: {} (expected 'csv')", other),
    }
}
