//! The columnar event batch consumed by processors.

use std::collections::BTreeMap;

use oolong_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::jagged::JaggedCol;

/// One columnar batch of events.
///
/// Branches come in three flavors: scalar `f64` columns, boolean flag
/// columns (trigger bits, MET filters), and jagged object columns. All
/// columns are aligned to the same event count. Batches are immutable
/// once built and discarded after processing; only the accumulator
/// outlives them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch {
    /// Dataset name this batch was read from.
    pub dataset: String,
    n_events: usize,
    run: Vec<u32>,
    lumi_block: Vec<u32>,
    #[serde(default)]
    scalar: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    flags: BTreeMap<String, Vec<bool>>,
    #[serde(default)]
    jagged: BTreeMap<String, JaggedCol>,
}

impl EventBatch {
    /// Start building a batch for `dataset` with the given run and
    /// lumi-block numbers (one per event).
    pub fn builder(dataset: impl Into<String>, run: Vec<u32>, lumi_block: Vec<u32>) -> BatchBuilder {
        BatchBuilder {
            dataset: dataset.into(),
            run,
            lumi_block,
            scalar: BTreeMap::new(),
            flags: BTreeMap::new(),
            jagged: BTreeMap::new(),
        }
    }

    /// An empty batch for `dataset` (zero events, no branches).
    pub fn empty(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            n_events: 0,
            run: Vec::new(),
            lumi_block: Vec::new(),
            scalar: BTreeMap::new(),
            flags: BTreeMap::new(),
            jagged: BTreeMap::new(),
        }
    }

    /// Number of events in the batch.
    pub fn n_events(&self) -> usize {
        self.n_events
    }

    /// `true` when the batch holds zero events.
    pub fn is_empty(&self) -> bool {
        self.n_events == 0
    }

    /// Run number per event.
    pub fn run(&self) -> &[u32] {
        &self.run
    }

    /// Luminosity-block number per event.
    pub fn lumi_block(&self) -> &[u32] {
        &self.lumi_block
    }

    /// A scalar branch by name.
    pub fn scalar(&self, name: &str) -> Result<&[f64]> {
        self.scalar
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| Error::Validation(format!("missing scalar branch '{name}'")))
    }

    /// A boolean flag branch by name.
    pub fn flag(&self, name: &str) -> Result<&[bool]> {
        self.flags
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| Error::Validation(format!("missing flag branch '{name}'")))
    }

    /// A jagged branch by name.
    pub fn jagged(&self, name: &str) -> Result<&JaggedCol> {
        self.jagged
            .get(name)
            .ok_or_else(|| Error::Validation(format!("missing jagged branch '{name}'")))
    }

    /// Re-check column alignment, for batches that arrived through serde
    /// rather than the builder.
    pub fn validate(&self) -> Result<()> {
        let n = self.n_events;
        if self.run.len() != n || self.lumi_block.len() != n {
            return Err(Error::Validation(format!(
                "run/lumi_block lengths ({}, {}) do not match n_events {n}",
                self.run.len(),
                self.lumi_block.len()
            )));
        }
        for (name, col) in &self.scalar {
            if col.len() != n {
                return Err(Error::Validation(format!(
                    "scalar branch '{name}' has {} entries, expected {n}",
                    col.len()
                )));
            }
        }
        for (name, col) in &self.flags {
            if col.len() != n {
                return Err(Error::Validation(format!(
                    "flag branch '{name}' has {} entries, expected {n}",
                    col.len()
                )));
            }
        }
        for (name, col) in &self.jagged {
            if col.n_events() != n {
                return Err(Error::Validation(format!(
                    "jagged branch '{name}' has {} events, expected {n}",
                    col.n_events()
                )));
            }
        }
        Ok(())
    }

    /// Elementwise AND of the named flag branches.
    ///
    /// Used for MET-filter conjunctions. Fails on any missing name; with
    /// no names every event passes.
    pub fn all_flags(&self, names: &[String]) -> Result<Vec<bool>> {
        let mut out = vec![true; self.n_events];
        for name in names {
            let flag = self.flag(name)?;
            for (o, &f) in out.iter_mut().zip(flag) {
                *o &= f;
            }
        }
        Ok(out)
    }
}

/// Builder validating branch lengths against the batch's event count.
pub struct BatchBuilder {
    dataset: String,
    run: Vec<u32>,
    lumi_block: Vec<u32>,
    scalar: BTreeMap<String, Vec<f64>>,
    flags: BTreeMap<String, Vec<bool>>,
    jagged: BTreeMap<String, JaggedCol>,
}

impl BatchBuilder {
    /// Add a scalar branch.
    pub fn scalar(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.scalar.insert(name.into(), values);
        self
    }

    /// Add a boolean flag branch.
    pub fn flag(mut self, name: impl Into<String>, values: Vec<bool>) -> Self {
        self.flags.insert(name.into(), values);
        self
    }

    /// Add a jagged branch.
    pub fn jagged(mut self, name: impl Into<String>, col: JaggedCol) -> Self {
        self.jagged.insert(name.into(), col);
        self
    }

    /// Validate column alignment and produce the batch.
    pub fn build(self) -> Result<EventBatch> {
        let n_events = self.run.len();
        if self.lumi_block.len() != n_events {
            return Err(Error::Validation(format!(
                "lumi_block has {} entries but run has {n_events}",
                self.lumi_block.len()
            )));
        }
        for (name, col) in &self.scalar {
            if col.len() != n_events {
                return Err(Error::Validation(format!(
                    "scalar branch '{name}' has {} entries, expected {n_events}",
                    col.len()
                )));
            }
        }
        for (name, col) in &self.flags {
            if col.len() != n_events {
                return Err(Error::Validation(format!(
                    "flag branch '{name}' has {} entries, expected {n_events}",
                    col.len()
                )));
            }
        }
        for (name, col) in &self.jagged {
            if col.n_events() != n_events {
                return Err(Error::Validation(format!(
                    "jagged branch '{name}' has {} events, expected {n_events}",
                    col.n_events()
                )));
            }
        }
        Ok(EventBatch {
            dataset: self.dataset,
            n_events,
            run: self.run,
            lumi_block: self.lumi_block,
            scalar: self.scalar,
            flags: self.flags,
            jagged: self.jagged,
        })
    }
}
