//! Technical indicator calculations over candle history
//!
//! Thin wrappers over the `ta` crate fed incrementally, plus the return
//! volatility and swing-level detection the indicator crate does not cover.
//! Everything returns `Option`: `None` means the loaded history is too short
//! for the requested computation, never a fabricated value.

use crate::candle::Candle;
use auric_core::results::LevelSet;
use std::cmp::Ordering;
use ta::indicators::{
    AverageTrueRange, ExponentialMovingAverage, RelativeStrengthIndex, SimpleMovingAverage,
};
use ta::{DataItem, Next};

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
pub(crate) fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Simple moving average of the last `period` closes
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let mut indicator = SimpleMovingAverage::new(period).ok()?;
    let mut last = 0.0;
    for &close in closes {
        last = indicator.next(close);
    }
    Some(last)
}

/// Exponential moving average of the last `period` closes
pub fn ema(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let mut indicator = ExponentialMovingAverage::new(period).ok()?;
    let mut last = 0.0;
    for &close in closes {
        last = indicator.next(close);
    }
    Some(last)
}

/// Relative Strength Index on closes
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let mut indicator = RelativeStrengthIndex::new(period).ok()?;
    let mut last = 0.0;
    for &close in closes {
        last = indicator.next(close);
    }
    Some(last)
}

/// MACD line as EMA12 minus EMA26
pub fn macd_line(closes: &[f64]) -> Option<f64> {
    if closes.len() < 26 {
        return None;
    }
    let mut ema12 = ExponentialMovingAverage::new(12).ok()?;
    let mut ema26 = ExponentialMovingAverage::new(26).ok()?;
    let mut line = 0.0;
    for &close in closes {
        line = ema12.next(close) - ema26.next(close);
    }
    Some(line)
}

/// Average True Range over candle bars
pub fn atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }
    let mut indicator = AverageTrueRange::new(period).ok()?;
    let mut last = 0.0;
    for candle in candles {
        let bar = DataItem::builder()
            .open(candle.open)
            .high(candle.high)
            .low(candle.low)
            .close(candle.close)
            .volume(0.0)
            .build()
            .ok()?;
        last = indicator.next(&bar);
    }
    Some(last)
}

/// Standard deviation of simple returns, plus an annualized estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volatility {
    pub sd: f64,
    pub annualized: f64,
}

/// Return volatility over the last `period` bars.
///
/// The annualized estimate assumes 5-minute bars: 288 per day, 365 days.
pub fn volatility(closes: &[f64], period: usize) -> Option<Volatility> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let window = &closes[closes.len() - (period + 1)..];
    let returns: Vec<f64> = window.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();

    let mu = mean(&returns);
    let sd = std_dev(&returns, mu);
    let bars_per_year: f64 = 365.0 * 288.0;
    Some(Volatility {
        sd,
        annualized: sd * bars_per_year.sqrt(),
    })
}

/// Swing-point support/resistance levels nearest the last close.
///
/// A bar is a swing low (high) when its low (high) is the extreme of the
/// `window`-bar neighborhood on both sides. Supports are reported below the
/// last close in descending order, resistances above it in ascending order,
/// each capped at `max_levels`.
pub fn swing_levels(candles: &[Candle], window: usize, max_levels: usize) -> LevelSet {
    if window == 0 || max_levels == 0 || candles.len() < 2 * window + 1 {
        return LevelSet::default();
    }

    let last_close = candles[candles.len() - 1].close;
    let mut support = Vec::new();
    let mut resistance = Vec::new();

    for i in window..candles.len() - window {
        let neighborhood = &candles[i - window..=i + window];
        let low = candles[i].low;
        let high = candles[i].high;

        if low < last_close && neighborhood.iter().all(|c| c.low >= low) {
            support.push(low);
        }
        if high > last_close && neighborhood.iter().all(|c| c.high <= high) {
            resistance.push(high);
        }
    }

    support.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    resistance.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    support.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    resistance.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    support.truncate(max_levels);
    resistance.truncate(max_levels);

    LevelSet {
        support,
        resistance,
    }
}
