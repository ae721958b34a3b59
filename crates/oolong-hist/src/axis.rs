//! Binned axes for histogram values.

use oolong_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Where a value lands on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinIndex {
    /// Below the first edge.
    Underflow,
    /// In-range bin `i`.
    Bin(usize),
    /// At or above the last edge.
    Overflow,
}

/// A binned value axis with sorted edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis name used when filling, e.g. `"recoil_pt"`.
    pub name: String,
    /// Human-readable label for downstream plotting.
    pub label: String,
    /// Bin edges (length = n_bins + 1), strictly increasing.
    pub edges: Vec<f64>,
}

impl Axis {
    /// A uniformly binned axis over `[lo, hi)`.
    pub fn regular(
        name: impl Into<String>,
        label: impl Into<String>,
        n_bins: usize,
        lo: f64,
        hi: f64,
    ) -> Result<Self> {
        if n_bins == 0 || !(lo < hi) {
            return Err(Error::Validation(format!(
                "invalid axis definition: n_bins={n_bins}, range=({lo}, {hi})"
            )));
        }
        let width = (hi - lo) / n_bins as f64;
        let edges = (0..=n_bins).map(|i| lo + width * i as f64).collect();
        Ok(Self { name: name.into(), label: label.into(), edges })
    }

    /// An axis with explicit (strictly increasing) edges.
    pub fn variable(
        name: impl Into<String>,
        label: impl Into<String>,
        edges: Vec<f64>,
    ) -> Result<Self> {
        if edges.len() < 2 || edges.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(Error::Validation(
                "axis edges must be strictly increasing with at least two entries".into(),
            ));
        }
        Ok(Self { name: name.into(), label: label.into(), edges })
    }

    /// Number of in-range bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Locate `val` on the axis. NaN counts as overflow.
    pub fn index(&self, val: f64) -> BinIndex {
        if val.is_nan() || val >= self.edges[self.edges.len() - 1] {
            return BinIndex::Overflow;
        }
        if val < self.edges[0] {
            return BinIndex::Underflow;
        }
        // binary search over sorted edges; NaN was handled above
        match self.edges.binary_search_by(|e| e.total_cmp(&val)) {
            Ok(i) => BinIndex::Bin(i),
            Err(i) => BinIndex::Bin(i - 1),
        }
    }
}
