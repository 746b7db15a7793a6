use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

use crate::model::Record;

/// What one scrape of the leaderboard produced. `skipped` counts rows that
/// failed field extraction and were dropped (never a hard error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeBundle {
    pub records: Vec<Record>,
    pub skipped: usize,
}

/// Black-box producer of leaderboard records.
pub trait TabularSource {
    fn scrape(&mut self) -> Result<ScrapeBundle>;
}

/// Scrapes the first HTML table of a leaderboard page.
///
/// Per row: player name from cell 2 (anchor text), then the classical, rapid
/// and bullet ratings from cells 4-6, matching the public ratings page layout.
pub struct HtmlTableSource {
    url: String,
    limit: Option<usize>,
    client: reqwest::blocking::Client,
}

impl HtmlTableSource {
    pub fn new(url: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            url: url.into(),
            limit,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl TabularSource for HtmlTableSource {
    fn scrape(&mut self) -> Result<ScrapeBundle> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("Failed to fetch leaderboard page: {}", self.url))?
            .text()
            .context("Failed to read leaderboard response body")?;

        extract_records(&body, self.limit)
    }
}

/// Positions of the scraped fields within a table row's cells.
const NAME_CELL: usize = 1;
const CLASSICAL_CELL: usize = 3;
const RAPID_CELL: usize = 4;
const BULLET_CELL: usize = 5;
const MIN_CELLS: usize = 6;

/// Pull leaderboard records out of raw page HTML.
///
/// Rows that cannot be extracted are skipped with a diagnostic; a page with
/// no recognizable table is fatal, since there would be nothing to filter.
pub fn extract_records(html: &str, limit: Option<usize>) -> Result<ScrapeBundle> {
    let table = slice_between_ci(html, "<tbody", "</tbody>")
        .or_else(|| slice_between_ci(html, "<table", "</table>"))
        .context("No leaderboard table found in page")?;

    // Collect row blocks up front so progress has a known length,
    // the same way the pipeline runner counts batches before processing.
    let mut row_blocks = Vec::new();
    let mut pos = 0usize;
    while let Some((start, end)) = next_tag_block_ci(table, "<tr", "</tr>", pos) {
        row_blocks.push(&table[start..end]);
        pos = end;
    }

    let pb = ProgressBar::new(row_blocks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rows")
            .expect("valid progress template"),
    );

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (idx, tr) in row_blocks.iter().enumerate() {
        pb.inc(1);
        match extract_row(tr) {
            Some(record) => {
                records.push(record);
                if let Some(limit) = limit {
                    if records.len() >= limit {
                        break;
                    }
                }
            }
            None => {
                skipped += 1;
                warn!("skipping malformed leaderboard row {}", idx + 1);
            }
        }
    }
    pb.finish_and_clear();

    Ok(ScrapeBundle { records, skipped })
}

fn extract_row(tr: &str) -> Option<Record> {
    let mut cells = Vec::new();
    let mut pos = 0usize;
    while let Some((start, end)) = next_tag_block_ci(tr, "<td", "</td>", pos) {
        cells.push(cell_text(&tr[start..end]));
        pos = end;
    }

    if cells.len() < MIN_CELLS {
        return None;
    }
    let name = cells[NAME_CELL].trim().to_string();
    if name.is_empty() {
        return None;
    }
    Some(Record {
        name,
        classical: cells[CLASSICAL_CELL].trim().to_string(),
        rapid: cells[RAPID_CELL].trim().to_string(),
        bullet: cells[BULLET_CELL].trim().to_string(),
    })
}

/* ---------- minimal tag-block scanning ---------- */

fn ascii_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Content between the end of `open_pat`'s tag and the next `close_pat`,
/// matched case-insensitively.
fn slice_between_ci<'a>(s: &'a str, open_pat: &str, close_pat: &str) -> Option<&'a str> {
    let lc = ascii_lower(s);
    let open = lc.find(&ascii_lower(open_pat))?;
    let after = s[open..].find('>')? + open + 1;
    let close = lc[after..].find(&ascii_lower(close_pat))?;
    Some(&s[after..after + close])
}

/// Byte range of the next `<tag ...>...</tag>` block at or after `from`.
fn next_tag_block_ci(s: &str, open_pat: &str, close_pat: &str, from: usize) -> Option<(usize, usize)> {
    let lc = ascii_lower(s);
    let open = ascii_lower(open_pat);
    let close = ascii_lower(close_pat);
    let start = lc.get(from..)?.find(&open)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let close_rel = lc[open_end..].find(&close)?;
    Some((start, open_end + close_rel + close.len()))
}

/// Inner text of a cell block: markup stripped, entities decoded, whitespace
/// collapsed. Keeps only the anchor/span text the ratings page nests in cells.
fn cell_text(block: &str) -> String {
    let inner = match (block.find('>'), block.rfind('<')) {
        (Some(open_end), Some(close_start)) if close_start > open_end => {
            &block[open_end + 1..close_start]
        }
        _ => return String::new(),
    };

    let mut out = String::with_capacity(inner.len());
    let mut in_tag = false;
    for ch in inner.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
