//! Volume profile histogram types.

use serde::{Deserialize, Serialize};

/// One price bin of the volume profile; `price` is the bin midpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeProfileLevel {
    pub price: f64,
    pub volume: f64,
}

/// Volume-at-price histogram over a candle window.
///
/// `poc` is the max-volume bin midpoint; `vah`/`val` bound the smallest
/// volume-descending set of bins covering at least 70% of total volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub levels: Vec<VolumeProfileLevel>,
    pub poc: f64,
    pub vah: f64,
    pub val: f64,
}

impl VolumeProfile {
    /// Total volume accumulated across all bins.
    pub fn total_volume(&self) -> f64 {
        self.levels.iter().map(|l| l.volume).sum()
    }
}
