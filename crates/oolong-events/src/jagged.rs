//! Jagged (variable-length per event) columns.

use oolong_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A jagged column: flat values + per-event offsets.
///
/// `offsets` has length `n_events + 1`. Event `i` has values
/// `flat[offsets[i]..offsets[i+1]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JaggedCol {
    /// Flat array of all values across all events.
    pub flat: Vec<f64>,
    /// Event boundaries: `offsets.len() == n_events + 1`.
    pub offsets: Vec<usize>,
}

impl JaggedCol {
    /// Build from per-event counts and a flat value array.
    pub fn from_counts(counts: &[usize], flat: Vec<f64>) -> Result<Self> {
        let mut offsets = Vec::with_capacity(counts.len() + 1);
        let mut total = 0usize;
        offsets.push(0);
        for &c in counts {
            total += c;
            offsets.push(total);
        }
        if total != flat.len() {
            return Err(Error::Validation(format!(
                "jagged column counts sum to {total} but flat array has {} values",
                flat.len()
            )));
        }
        Ok(Self { flat, offsets })
    }

    /// An empty column with zero events.
    pub fn empty() -> Self {
        Self { flat: Vec::new(), offsets: vec![0] }
    }

    /// Number of events.
    pub fn n_events(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Values belonging to event `row`.
    pub fn event(&self, row: usize) -> &[f64] {
        &self.flat[self.offsets[row]..self.offsets[row + 1]]
    }

    /// Number of objects in event `row`.
    pub fn count(&self, row: usize) -> usize {
        self.offsets[row + 1] - self.offsets[row]
    }

    /// Per-event object counts.
    pub fn counts(&self) -> Vec<usize> {
        (0..self.n_events()).map(|i| self.count(i)).collect()
    }

    /// Element `index` of event `row`, or `oor` when the event has fewer
    /// than `index + 1` objects.
    pub fn get(&self, row: usize, index: usize, oor: f64) -> f64 {
        let vals = self.event(row);
        if index >= vals.len() {
            oor
        } else {
            vals[index]
        }
    }

    /// Per-event index of the maximum value. `None` for empty events.
    pub fn argmax(&self) -> Vec<Option<usize>> {
        (0..self.n_events())
            .map(|row| {
                let vals = self.event(row);
                let mut best: Option<usize> = None;
                for (i, v) in vals.iter().enumerate() {
                    if best.map_or(true, |b| *v > vals[b]) {
                        best = Some(i);
                    }
                }
                best
            })
            .collect()
    }

    /// Per-event maximum value. `None` for empty events.
    pub fn max(&self) -> Vec<Option<f64>> {
        (0..self.n_events())
            .map(|row| self.event(row).iter().copied().fold(None, |m: Option<f64>, v| match m {
                Some(cur) if cur >= v => Some(cur),
                _ => Some(v),
            }))
            .collect()
    }

    /// Apply `f` to every value, keeping the offset structure.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> JaggedCol {
        JaggedCol { flat: self.flat.iter().map(|&v| f(v)).collect(), offsets: self.offsets.clone() }
    }

    /// Per-event `true` when any object satisfies `pred`. Empty events
    /// yield `false`.
    pub fn any(&self, pred: impl Fn(f64) -> bool) -> Vec<bool> {
        (0..self.n_events()).map(|row| self.event(row).iter().any(|&v| pred(v))).collect()
    }

    /// Restrict to events where `mask` is `true`.
    ///
    /// `mask` must have one entry per event.
    pub fn select_events(&self, mask: &[bool]) -> Result<JaggedCol> {
        if mask.len() != self.n_events() {
            return Err(Error::Validation(format!(
                "event mask has {} entries for a column of {} events",
                mask.len(),
                self.n_events()
            )));
        }
        let mut flat = Vec::new();
        let mut offsets = Vec::with_capacity(mask.iter().filter(|&&m| m).count() + 1);
        offsets.push(0);
        for (row, &keep) in mask.iter().enumerate() {
            if keep {
                flat.extend_from_slice(self.event(row));
                offsets.push(flat.len());
            }
        }
        Ok(JaggedCol { flat, offsets })
    }

    /// One value per event picked by `indices` (as from [`argmax`]), with
    /// `None` events skipped entirely.
    ///
    /// [`argmax`]: JaggedCol::argmax
    pub fn pick(&self, indices: &[Option<usize>]) -> Result<Vec<Option<f64>>> {
        if indices.len() != self.n_events() {
            return Err(Error::Validation(format!(
                "index vector has {} entries for a column of {} events",
                indices.len(),
                self.n_events()
            )));
        }
        Ok(indices
            .iter()
            .enumerate()
            .map(|(row, idx)| idx.map(|i| self.get(row, i, f64::NAN)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col() -> JaggedCol {
        // events: [1, 3], [], [2]
        JaggedCol::from_counts(&[2, 0, 1], vec![1.0, 3.0, 2.0]).unwrap()
    }

    #[test]
    fn from_counts_validates_total() {
        let err = JaggedCol::from_counts(&[2, 1], vec![1.0]).unwrap_err();
        assert!(err.to_string().contains("flat array"));
    }

    #[test]
    fn counts_and_get() {
        let c = col();
        assert_eq!(c.n_events(), 3);
        assert_eq!(c.counts(), vec![2, 0, 1]);
        assert_eq!(c.get(0, 1, -1.0), 3.0);
        assert_eq!(c.get(1, 0, -1.0), -1.0);
    }

    #[test]
    fn argmax_and_max_skip_empty_events() {
        let c = col();
        assert_eq!(c.argmax(), vec![Some(1), None, Some(0)]);
        assert_eq!(c.max(), vec![Some(3.0), None, Some(2.0)]);
    }

    #[test]
    fn any_is_false_for_empty_events() {
        let c = col();
        assert_eq!(c.any(|v| v > 0.0), vec![true, false, true]);
    }

    #[test]
    fn select_events_keeps_structure() {
        let c = col();
        let s = c.select_events(&[true, false, true]).unwrap();
        assert_eq!(s.n_events(), 2);
        assert_eq!(s.event(0), &[1.0, 3.0]);
        assert_eq!(s.event(1), &[2.0]);
    }

    #[test]
    fn select_events_on_empty_column() {
        let c = JaggedCol::empty();
        let s = c.select_events(&[]).unwrap();
        assert_eq!(s.n_events(), 0);
        assert!(s.flat.is_empty());
    }

    #[test]
    fn pick_leading() {
        let c = col();
        let picked = c.pick(&c.argmax()).unwrap();
        assert_eq!(picked, vec![Some(3.0), None, Some(2.0)]);
    }
}
