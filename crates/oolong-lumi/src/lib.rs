//! # oolong-lumi
//!
//! Golden-JSON luminosity-mask filtering.
//!
//! A golden JSON lists the certified good data-taking periods as
//! `{"<run>": [[first_lumi, last_lumi], ...]}` with inclusive lumi-block
//! ranges. [`LumiMask`] answers per-event membership; [`LumiMaskSet`]
//! holds one mask per data-taking year and applies an explicit fail-open
//! rule when a year has no list yet (early data before certification).

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use oolong_core::{Error, Result, Year};

/// Certified run/lumi-block ranges from one golden JSON.
#[derive(Debug, Clone, Default)]
pub struct LumiMask {
    // run -> inclusive (first, last) lumi-block ranges
    ranges: BTreeMap<u32, Vec<(u32, u32)>>,
}

impl LumiMask {
    /// Parse a golden JSON document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<(u32, u32)>> = serde_json::from_str(text)?;
        let mut ranges = BTreeMap::new();
        for (run, spans) in raw {
            let run: u32 = run
                .parse()
                .map_err(|_| Error::Validation(format!("invalid run number '{run}' in golden JSON")))?;
            for &(lo, hi) in &spans {
                if lo > hi {
                    return Err(Error::Validation(format!(
                        "invalid lumi range [{lo}, {hi}] for run {run} in golden JSON"
                    )));
                }
            }
            ranges.insert(run, spans);
        }
        Ok(Self { ranges })
    }

    /// Load a golden JSON from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Whether (run, lumi-block) is certified.
    pub fn contains(&self, run: u32, lumi: u32) -> bool {
        self.ranges
            .get(&run)
            .map_or(false, |spans| spans.iter().any(|&(lo, hi)| lumi >= lo && lumi <= hi))
    }

    /// Per-event certified mask. `runs` and `lumis` must be aligned.
    pub fn mask(&self, runs: &[u32], lumis: &[u32]) -> Result<Vec<bool>> {
        if runs.len() != lumis.len() {
            return Err(Error::Validation(format!(
                "run/lumi arrays have different lengths ({} vs {})",
                runs.len(),
                lumis.len()
            )));
        }
        Ok(runs.iter().zip(lumis).map(|(&r, &l)| self.contains(r, l)).collect())
    }
}

/// One lumi mask per data-taking year.
#[derive(Debug, Clone, Default)]
pub struct LumiMaskSet {
    by_year: BTreeMap<u16, LumiMask>,
}

impl LumiMaskSet {
    /// Load the configured golden JSONs, `year -> path`, resolving
    /// relative paths against `base_dir`.
    pub fn load(paths: &BTreeMap<u16, PathBuf>, base_dir: impl AsRef<Path>) -> Result<Self> {
        let mut by_year = BTreeMap::new();
        for (&year, path) in paths {
            let full = if path.is_absolute() {
                path.clone()
            } else {
                base_dir.as_ref().join(path)
            };
            by_year.insert(year, LumiMask::from_path(&full)?);
        }
        Ok(Self { by_year })
    }

    /// Build from already-parsed masks.
    pub fn from_masks(masks: BTreeMap<u16, LumiMask>) -> Self {
        Self { by_year: masks }
    }

    /// Whether a golden list exists for `year`.
    pub fn has_year(&self, year: u16) -> bool {
        self.by_year.contains_key(&year)
    }

    /// The certified mask for a batch, or all-pass when no golden list
    /// exists for its year.
    ///
    /// Failing open is intentional: early data is processed before a
    /// golden list is published, and discarding it would be wrong.
    pub fn mask_or_pass(&self, year: Year, runs: &[u32], lumis: &[u32]) -> Result<Vec<bool>> {
        if runs.len() != lumis.len() {
            return Err(Error::Validation(format!(
                "run/lumi arrays have different lengths ({} vs {})",
                runs.len(),
                lumis.len()
            )));
        }
        match year.value().and_then(|y| self.by_year.get(&y)) {
            Some(mask) => mask.mask(runs, lumis),
            None => {
                tracing::warn!(%year, "no golden JSON for this year, passing all events");
                Ok(vec![true; runs.len()])
            }
        }
    }
}
