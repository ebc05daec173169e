//! In-memory store for 5-minute bars parsed from CSV files
//!
//! - Safe against duplicates (keyed by epoch ms; later files win)
//! - Sorted ascending by time
//! - Fast lookups for latest bars, ranges, and timeframe aggregates

use crate::candle::{Candle, Timeframe};
use crate::error::Result;
use crate::indicators;
use auric_core::results::AggregatedBar;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

/// Gate for data rows: `MM/DD/YYYY HH:MM`
static DATA_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2}$").expect("date gate regex is valid")
});

const DATE_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Headline statistics over everything currently loaded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_close: Option<f64>,
}

/// OHLC rollup over an arbitrary range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcAggregate {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Candle store for one instrument
pub struct MarketDataStore {
    symbol: String,
    candles: Vec<Candle>,
    index_by_ts: HashMap<i64, usize>,
}

impl MarketDataStore {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            candles: Vec::new(),
            index_by_ts: HashMap::new(),
        }
    }

    /// Loads every `*.csv` in `dir` (non-recursive) and merges into memory
    pub fn from_folder(dir: impl AsRef<Path>, symbol: impl Into<String>) -> Result<Self> {
        let mut store = Self::new(symbol);
        store.update_from_folder(dir)?;
        Ok(store)
    }

    /// Scan a directory for CSV files and merge their rows.
    ///
    /// Returns the number of rows parsed (before dedupe). Files are visited
    /// in name order so re-loads are deterministic.
    pub fn update_from_folder(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let mut files: Vec<_> = fs::read_dir(dir.as_ref())?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .collect();
        files.sort();

        let mut batch = Vec::new();
        for file in &files {
            let parsed = Self::parse_csv_file(file)?;
            tracing::debug!(file = %file.display(), rows = parsed.len(), "parsed candle file");
            batch.push(parsed);
        }
        let batch: Vec<Candle> = batch.into_iter().flatten().collect();
        let parsed_rows = batch.len();

        self.merge(batch);
        tracing::info!(
            symbol = %self.symbol,
            files = files.len(),
            rows = parsed_rows,
            total = self.candles.len(),
            "candle store updated"
        );
        Ok(parsed_rows)
    }

    /// Parse one CSV file with header `Date,Open,High,Low,Close,Change(Pips),Change(%)`.
    ///
    /// Title and header lines are skipped; rows that fail the date gate or a
    /// numeric parse are dropped, never fatal.
    fn parse_csv_file(path: &Path) -> Result<Vec<Candle>> {
        let reader = BufReader::new(File::open(path)?);
        let mut out = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let lowered = line.to_ascii_lowercase();
            // Title line commonly reads "XAUUSD Historical Data"
            if line_no == 0 && lowered.contains("historical data") {
                continue;
            }
            if lowered.starts_with("date,open,high,low,close") {
                continue;
            }

            // Rows carry a trailing comma, so a full row splits into >= 7 parts
            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() < 7 {
                continue;
            }

            let date_str = parts[0].trim();
            if !DATA_ROW.is_match(date_str) {
                continue;
            }
            let Ok(naive) = NaiveDateTime::parse_from_str(date_str, DATE_FORMAT) else {
                continue;
            };

            let prices: Vec<Option<f64>> = parts[1..5]
                .iter()
                .map(|part| part.trim().parse::<f64>().ok())
                .collect();
            let (Some(open), Some(high), Some(low), Some(close)) =
                (prices[0], prices[1], prices[2], prices[3])
            else {
                continue;
            };

            let mut candle = Candle::new(naive.and_utc(), open, high, low, close);
            candle.change_pips = parts[5].trim().parse::<f64>().ok();
            candle.change_pct = parts[6].trim().parse::<f64>().ok();
            out.push(candle);
        }

        Ok(out)
    }

    /// Merge new candles (dedupe by timestamp, later entries win, sort ascending)
    pub fn merge(&mut self, batch: Vec<Candle>) {
        for candle in batch {
            if let Some(&idx) = self.index_by_ts.get(&candle.ts_millis) {
                self.candles[idx] = candle;
            } else {
                self.candles.push(candle);
                self.index_by_ts
                    .insert(candle.ts_millis, self.candles.len() - 1);
            }
        }

        self.candles.sort_by_key(|c| c.ts_millis);
        self.index_by_ts = self
            .candles
            .iter()
            .enumerate()
            .map(|(i, c)| (c.ts_millis, i))
            .collect();
    }

    // ---------------------- Basic accessors ----------------------

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last_n(&self, n: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(n);
        &self.candles[start..]
    }

    /// Candles in `[start_ms, end_ms]` inclusive
    pub fn range(&self, start_ms: i64, end_ms: i64) -> &[Candle] {
        let lo = self.candles.partition_point(|c| c.ts_millis < start_ms);
        let hi = self.candles.partition_point(|c| c.ts_millis <= end_ms);
        &self.candles[lo..hi]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    // ---------------------- Stats & aggregates ----------------------

    pub fn summary(&self) -> StatsSummary {
        if self.candles.is_empty() {
            return StatsSummary::default();
        }

        let closes = self.closes();
        let mean = indicators::mean(&closes);
        let std = indicators::std_dev(&closes, mean);

        StatsSummary {
            count: self.candles.len(),
            first_time: self.first().map(|c| c.time),
            last_time: self.latest().map(|c| c.time),
            min_close: closes.iter().copied().reduce(f64::min),
            max_close: closes.iter().copied().reduce(f64::max),
            mean_close: Some(mean),
            std_close: Some(std),
        }
    }

    /// OHLC rollup over an arbitrary inclusive range
    pub fn aggregate_ohlc(&self, start_ms: i64, end_ms: i64) -> Option<OhlcAggregate> {
        let rows = self.range(start_ms, end_ms);
        let (first, last) = (rows.first()?, rows.last()?);

        let mut high = f64::NEG_INFINITY;
        let mut low = f64::INFINITY;
        for row in rows {
            high = high.max(row.high);
            low = low.min(row.low);
        }

        Some(OhlcAggregate {
            open: first.open,
            high,
            low,
            close: last.close,
        })
    }

    /// Bucket the 5m bars into `timeframe` bars, keeping the last `limit`
    pub fn aggregate(&self, timeframe: Timeframe, limit: usize) -> Vec<AggregatedBar> {
        if limit == 0 || self.candles.is_empty() {
            return Vec::new();
        }

        let width = timeframe.bucket_millis();
        let mut bars: Vec<AggregatedBar> = Vec::new();
        let mut current_bucket: Option<i64> = None;

        for candle in &self.candles {
            let bucket = candle.ts_millis.div_euclid(width);
            if current_bucket == Some(bucket) {
                if let Some(bar) = bars.last_mut() {
                    bar.high = bar.high.max(candle.high);
                    bar.low = bar.low.min(candle.low);
                    bar.close = candle.close;
                }
            } else {
                current_bucket = Some(bucket);
                bars.push(AggregatedBar {
                    timeframe: timeframe.as_str().to_string(),
                    open: candle.open,
                    high: candle.high,
                    low: candle.low,
                    close: candle.close,
                    change_pct: None,
                });
            }
        }

        for bar in &mut bars {
            if bar.open != 0.0 {
                bar.change_pct = Some((bar.close - bar.open) / bar.open * 100.0);
            }
        }

        let start = bars.len().saturating_sub(limit);
        bars.split_off(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn candle_at(minutes: i64, close: f64) -> Candle {
        let time = DateTime::from_timestamp(1_760_000_000 + minutes * 60, 0).expect("valid ts");
        Candle::new(time, close - 0.2, close + 0.5, close - 0.5, close)
    }

    #[test]
    fn test_parse_csv_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut file = File::create(dir.path().join("xau_a.csv")).expect("create csv");
        writeln!(file, "XAUUSD Historical Data").unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Change(Pips),Change(%)").unwrap();
        writeln!(file, "11/03/2025 21:40,2000.5,2001.0,1999.5,2000.8,3.0,0.02,").unwrap();
        writeln!(file, "11/03/2025 21:45,2000.8,2002.0,2000.1,2001.5,7.0,0.03,").unwrap();
        writeln!(file, "not,a,data,row,at,all,").unwrap();
        writeln!(file, "11/03/2025 21:50,2001.5,2001.9,2000.9,2001.2,,,").unwrap();

        let store = MarketDataStore::from_folder(dir.path(), "XAUUSD").expect("load");
        assert_eq!(store.len(), 3);
        assert_eq!(store.symbol(), "XAUUSD");
        assert_eq!(store.latest().unwrap().close, 2001.2);
        assert_eq!(store.latest().unwrap().change_pips, None);
        assert_eq!(store.first().unwrap().change_pct, Some(0.02));
    }

    #[test]
    fn test_merge_dedupes_and_sorts() {
        let mut store = MarketDataStore::new("XAUUSD");
        store.merge(vec![candle_at(10, 2001.0), candle_at(0, 2000.0)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.first().unwrap().close, 2000.0);

        // Same timestamp replaces, out-of-order insert re-sorts
        store.merge(vec![candle_at(10, 2009.0), candle_at(5, 2000.5)]);
        assert_eq!(store.len(), 3);
        let closes = store.closes();
        assert_eq!(closes, vec![2000.0, 2000.5, 2009.0]);
    }

    #[test]
    fn test_last_n_and_range() {
        let mut store = MarketDataStore::new("XAUUSD");
        store.merge((0..10i64).map(|i| candle_at(i * 5, 2000.0 + i as f64)).collect());

        assert_eq!(store.last_n(3).len(), 3);
        assert_eq!(store.last_n(100).len(), 10);

        let start = store.first().unwrap().ts_millis;
        let rows = store.range(start, start + 10 * 60 * 1000);
        assert_eq!(rows.len(), 3); // minutes 0, 5, 10 inclusive
    }

    #[test]
    fn test_summary_stats() {
        let mut store = MarketDataStore::new("XAUUSD");
        assert_eq!(store.summary().count, 0);
        assert!(store.summary().mean_close.is_none());

        store.merge(vec![
            candle_at(0, 2000.0),
            candle_at(5, 2002.0),
            candle_at(10, 2004.0),
        ]);
        let summary = store.summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min_close, Some(2000.0));
        assert_eq!(summary.max_close, Some(2004.0));
        assert!((summary.mean_close.unwrap() - 2002.0).abs() < 1e-9);
        assert!((summary.std_close.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_buckets_hourly() {
        let mut store = MarketDataStore::new("XAUUSD");
        // 24 bars of 5 minutes = 2 hours
        store.merge(
            (0..24i64)
                .map(|i| candle_at(i * 5, 2000.0 + i as f64))
                .collect(),
        );

        let bars = store.aggregate(Timeframe::H1, 10);
        // Base timestamp is not hour-aligned, so buckets may straddle three hours
        assert!(bars.len() >= 2 && bars.len() <= 3);
        assert!(bars.iter().all(|b| b.timeframe == "1h"));
        // Last bucket closes at the final candle's close
        assert_eq!(bars.last().unwrap().close, 2023.0);
        // Highs dominate opens within each bucket
        assert!(bars.iter().all(|b| b.high >= b.open && b.low <= b.close));

        let limited = store.aggregate(Timeframe::H1, 1);
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].close, 2023.0);
    }

    #[test]
    fn test_aggregate_ohlc_range() {
        let mut store = MarketDataStore::new("XAUUSD");
        store.merge(vec![
            candle_at(0, 2000.0),
            candle_at(5, 2010.0),
            candle_at(10, 1995.0),
        ]);

        let start = store.first().unwrap().ts_millis;
        let end = store.latest().unwrap().ts_millis;
        let agg = store.aggregate_ohlc(start, end).expect("rows in range");
        assert_eq!(agg.open, 1999.8);
        assert_eq!(agg.close, 1995.0);
        assert_eq!(agg.high, 2010.5);
        assert_eq!(agg.low, 1994.5);

        assert!(store.aggregate_ohlc(end + 1, end + 1000).is_none());
    }
}
