//! Region × dataset histograms.

use std::collections::BTreeMap;

use oolong_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::axis::{Axis, BinIndex};

/// Per-(dataset, region) bin contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinContents {
    /// Sum of weights per bin.
    pub sumw: Vec<f64>,
    /// Sum of squared weights per bin.
    pub sumw2: Vec<f64>,
    /// Sum of weights below the first edge.
    pub underflow: f64,
    /// Sum of weights at or above the last edge.
    pub overflow: f64,
    /// Entries filled in range.
    pub entries: u64,
}

impl BinContents {
    fn zeros(n_bins: usize) -> Self {
        Self {
            sumw: vec![0.0; n_bins],
            sumw2: vec![0.0; n_bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
        }
    }

    fn add(&mut self, other: &BinContents) {
        for (a, b) in self.sumw.iter_mut().zip(&other.sumw) {
            *a += b;
        }
        for (a, b) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
    }
}

/// A 1D histogram with categorical (dataset, region) keys.
///
/// Categories are created lazily on first fill; merging takes the union
/// of categories and adds bin contents, which keeps the operation
/// associative and commutative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    /// The value axis.
    pub axis: Axis,
    bins: BTreeMap<String, BTreeMap<String, BinContents>>,
}

impl Hist1D {
    /// A histogram with no filled categories.
    pub fn new(axis: Axis) -> Self {
        Self { axis, bins: BTreeMap::new() }
    }

    /// Fill `values` (with optional per-value `weights`) into the
    /// (dataset, region) category.
    ///
    /// Out-of-range values land in the underflow/overflow sums. An empty
    /// `values` slice is a no-op and does not create the category.
    pub fn fill(
        &mut self,
        dataset: &str,
        region: &str,
        values: &[f64],
        weights: Option<&[f64]>,
    ) -> Result<()> {
        if let Some(w) = weights {
            if w.len() != values.len() {
                return Err(Error::HistogramFill(format!(
                    "'{}': {} weights for {} values",
                    self.axis.name,
                    w.len(),
                    values.len()
                )));
            }
        }
        if values.is_empty() {
            return Ok(());
        }

        let n_bins = self.axis.n_bins();
        let contents = self
            .bins
            .entry(dataset.to_string())
            .or_default()
            .entry(region.to_string())
            .or_insert_with(|| BinContents::zeros(n_bins));

        for (i, &val) in values.iter().enumerate() {
            let w = weights.map_or(1.0, |w| w[i]);
            match self.axis.index(val) {
                BinIndex::Underflow => contents.underflow += w,
                BinIndex::Overflow => contents.overflow += w,
                BinIndex::Bin(b) => {
                    contents.sumw[b] += w;
                    contents.sumw2[b] += w * w;
                    contents.entries += 1;
                }
            }
        }
        Ok(())
    }

    /// Bin contents for (dataset, region), if that category was filled.
    pub fn contents(&self, dataset: &str, region: &str) -> Option<&BinContents> {
        self.bins.get(dataset)?.get(region)
    }

    /// Sum of in-range weights for (dataset, region); 0.0 when unfilled.
    pub fn integral(&self, dataset: &str, region: &str) -> f64 {
        self.contents(dataset, region).map_or(0.0, |c| c.sumw.iter().sum())
    }

    /// All (dataset, region) categories with any fills.
    pub fn categories(&self) -> Vec<(&str, &str)> {
        self.bins
            .iter()
            .flat_map(|(d, regions)| regions.keys().map(move |r| (d.as_str(), r.as_str())))
            .collect()
    }

    /// `true` when nothing has been filled.
    pub fn is_unfilled(&self) -> bool {
        self.bins.is_empty()
    }

    /// A histogram with the same axis and no contents.
    pub fn identity(&self) -> Hist1D {
        Hist1D::new(self.axis.clone())
    }

    /// Add `other` into `self`. Axes must match exactly.
    pub fn merge(&mut self, other: &Hist1D) -> Result<()> {
        if self.axis != other.axis {
            return Err(Error::Validation(format!(
                "cannot merge histogram '{}': axis definitions differ",
                self.axis.name
            )));
        }
        for (dataset, regions) in &other.bins {
            let mine = self.bins.entry(dataset.clone()).or_default();
            for (region, contents) in regions {
                mine.entry(region.clone())
                    .or_insert_with(|| BinContents::zeros(self.axis.n_bins()))
                    .add(contents);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist() -> Hist1D {
        Hist1D::new(Axis::variable("x", "", vec![0.0, 1.0, 2.0, 3.0]).unwrap())
    }

    #[test]
    fn fill_simple() {
        let mut h = hist();
        h.fill("data", "sr", &[0.5, 1.5, 2.5, 0.5, -1.0, 3.5], None).unwrap();
        let c = h.contents("data", "sr").unwrap();
        assert_eq!(c.sumw, vec![2.0, 1.0, 1.0]);
        assert_eq!(c.underflow, 1.0);
        assert_eq!(c.overflow, 1.0);
        assert_eq!(c.entries, 4);
    }

    #[test]
    fn fill_with_weights() {
        let mut h = hist();
        h.fill("data", "sr", &[0.5, 1.5, 0.5], Some(&[2.0, 3.0, 1.0])).unwrap();
        let c = h.contents("data", "sr").unwrap();
        assert_eq!(c.sumw, vec![3.0, 3.0, 0.0]);
        assert_eq!(c.sumw2, vec![5.0, 9.0, 0.0]);
    }

    #[test]
    fn fill_weight_length_mismatch() {
        let mut h = hist();
        let err = h.fill("data", "sr", &[0.5], Some(&[1.0, 2.0])).unwrap_err();
        assert!(err.to_string().contains("weights"));
    }

    #[test]
    fn zero_passing_events_is_noop() {
        let mut h = hist();
        h.fill("data", "sr", &[], None).unwrap();
        assert!(h.is_unfilled());
        assert_eq!(h.integral("data", "sr"), 0.0);
    }

    #[test]
    fn merge_adds_and_unions() {
        let mut a = hist();
        a.fill("data", "sr", &[0.5], None).unwrap();
        let mut b = hist();
        b.fill("data", "sr", &[0.5, 1.5], None).unwrap();
        b.fill("mc", "cr", &[2.5], None).unwrap();

        a.merge(&b).unwrap();
        assert_eq!(a.contents("data", "sr").unwrap().sumw, vec![2.0, 1.0, 0.0]);
        assert_eq!(a.contents("mc", "cr").unwrap().sumw, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn merge_rejects_axis_mismatch() {
        let mut a = hist();
        let b = Hist1D::new(Axis::variable("x", "", vec![0.0, 1.0]).unwrap());
        assert!(a.merge(&b).is_err());
    }
}
