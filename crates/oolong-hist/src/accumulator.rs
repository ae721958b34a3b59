//! The mergeable histogram accumulator shared across batches.

use std::collections::BTreeMap;

use oolong_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::histogram::Hist1D;

/// Mapping from histogram name to histogram.
///
/// The accumulator is the only state that survives a batch: each
/// processor declares its schema once, processes every batch against
/// [`identity`] copies, and the partial results are folded together with
/// [`merge`]. Merge is additive per bin and takes the union of histogram
/// names and categories, so it is associative and commutative — partial
/// accumulators may be combined in any order or grouping.
///
/// [`identity`]: Accumulator::identity
/// [`merge`]: Accumulator::merge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accumulator {
    hists: BTreeMap<String, Hist1D>,
}

impl Accumulator {
    /// An accumulator with no histograms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a histogram. Fails on a duplicate name.
    pub fn declare(&mut self, name: impl Into<String>, axis: Axis) -> Result<()> {
        let name = name.into();
        if self.hists.contains_key(&name) {
            return Err(Error::Validation(format!("histogram '{name}' declared twice")));
        }
        self.hists.insert(name, Hist1D::new(axis));
        Ok(())
    }

    /// The zero element: same histogram schema, no contents.
    pub fn identity(&self) -> Accumulator {
        Accumulator {
            hists: self.hists.iter().map(|(k, h)| (k.clone(), h.identity())).collect(),
        }
    }

    /// A histogram by name.
    pub fn get(&self, name: &str) -> Result<&Hist1D> {
        self.hists
            .get(name)
            .ok_or_else(|| Error::Validation(format!("unknown histogram '{name}'")))
    }

    /// A mutable histogram by name, for filling.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Hist1D> {
        self.hists
            .get_mut(name)
            .ok_or_else(|| Error::Validation(format!("unknown histogram '{name}'")))
    }

    /// Declared histogram names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hists.keys().map(|s| s.as_str())
    }

    /// Add `other` into `self`.
    ///
    /// Histogram names are unioned; a name present in both must have the
    /// same axis definition.
    pub fn merge(&mut self, other: Accumulator) -> Result<()> {
        for (name, hist) in other.hists {
            match self.hists.get_mut(&name) {
                Some(mine) => mine.merge(&hist)?,
                None => {
                    self.hists.insert(name, hist);
                }
            }
        }
        Ok(())
    }

    /// `true` when every histogram is unfilled.
    pub fn is_identity(&self) -> bool {
        self.hists.values().all(|h| h.is_unfilled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc_with(values: &[f64]) -> Accumulator {
        let mut acc = Accumulator::new();
        acc.declare("met", Axis::regular("met", "MET [GeV]", 4, 0.0, 200.0).unwrap()).unwrap();
        acc.get_mut("met").unwrap().fill("data", "sr", values, None).unwrap();
        acc
    }

    #[test]
    fn declare_rejects_duplicates() {
        let mut acc = Accumulator::new();
        let ax = Axis::regular("x", "", 2, 0.0, 1.0).unwrap();
        acc.declare("h", ax.clone()).unwrap();
        assert!(acc.declare("h", ax).is_err());
    }

    #[test]
    fn identity_keeps_schema_without_contents() {
        let acc = acc_with(&[10.0, 60.0]);
        let id = acc.identity();
        assert!(id.is_identity());
        assert!(!acc.is_identity());
        assert_eq!(id.get("met").unwrap().axis, acc.get("met").unwrap().axis);
    }

    #[test]
    fn merge_is_commutative() {
        let a = acc_with(&[10.0]);
        let b = acc_with(&[60.0, 110.0]);

        let mut ab = a.clone();
        ab.merge(b.clone()).unwrap();
        let mut ba = b;
        ba.merge(a).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn merge_is_associative() {
        let a = acc_with(&[10.0]);
        let b = acc_with(&[60.0]);
        let c = acc_with(&[110.0, 160.0]);

        // (a + b) + c
        let mut left = a.clone();
        left.merge(b.clone()).unwrap();
        left.merge(c.clone()).unwrap();

        // a + (b + c)
        let mut bc = b;
        bc.merge(c).unwrap();
        let mut right = a;
        right.merge(bc).unwrap();

        assert_eq!(left, right);
        assert_eq!(left.get("met").unwrap().integral("data", "sr"), 4.0);
    }

    #[test]
    fn merge_with_identity_is_neutral() {
        let a = acc_with(&[10.0, 60.0]);
        let mut merged = a.clone();
        merged.merge(a.identity()).unwrap();
        assert_eq!(merged, a);
    }

    #[test]
    fn serde_round_trip() {
        let acc = acc_with(&[10.0, 60.0]);
        let text = serde_json::to_string(&acc).unwrap();
        let back: Accumulator = serde_json::from_str(&text).unwrap();
        assert_eq!(back, acc);
    }
}
