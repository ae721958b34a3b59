//! Named per-event boolean selections for one batch.

use std::collections::BTreeMap;

use oolong_core::{Error, Result};

/// Registry of named boolean masks, all aligned to one batch.
///
/// Masks are per-event, never per-object; a per-object condition must be
/// reduced (`any`, counts, ...) before registration. Masks are immutable
/// once added and the registry is discarded with the batch.
#[derive(Debug, Clone)]
pub struct SelectionRegistry {
    n_events: usize,
    masks: BTreeMap<String, Vec<bool>>,
}

impl SelectionRegistry {
    /// An empty registry for a batch of `n_events`.
    pub fn new(n_events: usize) -> Self {
        Self { n_events, masks: BTreeMap::new() }
    }

    /// Number of events every mask must align to.
    pub fn n_events(&self) -> usize {
        self.n_events
    }

    /// Register a named mask.
    ///
    /// Fails on a duplicate name or on a mask whose length differs from
    /// the batch's event count.
    pub fn add(&mut self, name: impl Into<String>, mask: Vec<bool>) -> Result<()> {
        let name = name.into();
        if mask.len() != self.n_events {
            return Err(Error::Validation(format!(
                "selection '{name}' has {} entries for a batch of {} events",
                mask.len(),
                self.n_events
            )));
        }
        if self.masks.contains_key(&name) {
            return Err(Error::DuplicateSelection(name));
        }
        self.masks.insert(name, mask);
        Ok(())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.masks.contains_key(name)
    }

    /// Registered selection names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.masks.keys().map(|s| s.as_str())
    }

    /// Elementwise AND of the named masks.
    ///
    /// Fails on any undefined name. With no names, every event passes.
    pub fn all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Vec<bool>> {
        let mut out = vec![true; self.n_events];
        for name in names {
            let mask = self
                .masks
                .get(name)
                .ok_or_else(|| Error::UnknownSelection(name.to_string()))?;
            for (o, &m) in out.iter_mut().zip(mask) {
                *o &= m;
            }
        }
        Ok(out)
    }
}

/// Elementwise negation, for "was not prescaled"-style cuts.
pub fn not(mask: &[bool]) -> Vec<bool> {
    mask.iter().map(|&m| !m).collect()
}
