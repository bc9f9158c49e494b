//! Bollinger Bands, snapshot form.
//!
//! Mean and population stddev of the trailing `period` closes;
//! upper/lower = mean ± mult·stddev; width = (upper - lower) / mean.
//! Edge cases: shorter series use all available closes; an empty series or
//! zero mean yields all-zero bands with zero width.

/// Upper/middle/lower band values plus the normalized band width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

/// Bollinger(period, mult) over the trailing closes.
pub fn bollinger(closes: &[f64], period: usize, mult: f64) -> BollingerBands {
    if closes.is_empty() || period == 0 {
        return BollingerBands {
            upper: 0.0,
            middle: 0.0,
            lower: 0.0,
            width: 0.0,
        };
    }

    let take = period.min(closes.len());
    let window = &closes[closes.len() - take..];
    let mean = window.iter().sum::<f64>() / take as f64;
    let variance = window
        .iter()
        .map(|c| {
            let d = c - mean;
            d * d
        })
        .sum::<f64>()
        / take as f64;
    let stddev = variance.sqrt();

    let upper = mean + mult * stddev;
    let lower = mean - mult * stddev;
    let width = if mean != 0.0 {
        (upper - lower) / mean
    } else {
        0.0
    };

    BollingerBands {
        upper,
        middle: mean,
        lower,
        width,
    }
}
