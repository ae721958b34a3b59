//! The trigger-study processors.
//!
//! A processor is a stateless per-batch transformation: it builds
//! candidates, registers selections, evaluates its region table, and
//! fills a fresh identity copy of its accumulator. The returned partial
//! accumulators merge in any order.

use oolong_core::{Result, Year};
use oolong_events::EventBatch;
use oolong_hist::Accumulator;
use oolong_lumi::LumiMaskSet;

use crate::config::ProcessorConfig;

mod custom_nano;
mod hlt;
mod jmenano;

pub use custom_nano::CustomNanoProcessor;
pub use hlt::HltProcessor;
pub use jmenano::JmeNanoProcessor;

/// One event-selection + histogram-fill pass over a batch.
pub trait Processor: Send + Sync {
    /// Processor name, used for logging and CLI dispatch.
    fn name(&self) -> &'static str;

    /// Resolve the data-taking year from a dataset name.
    ///
    /// Policies differ on purpose: some processors refuse to run on a
    /// dataset whose year they cannot determine, others continue with
    /// [`Year::Unknown`].
    fn dataset_year(&self, dataset: &str) -> Result<Year>;

    /// The accumulator schema: every histogram declared, nothing filled.
    fn accumulator(&self) -> Result<Accumulator>;

    /// Process one batch into a fresh accumulator.
    ///
    /// An empty batch must return the accumulator identity unchanged.
    fn process(
        &self,
        batch: &EventBatch,
        cfg: &ProcessorConfig,
        lumi: &LumiMaskSet,
    ) -> Result<Accumulator>;
}

/// Per-event values restricted to the passing mask.
pub(crate) fn masked(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter_map(|(&v, &m)| if m { Some(v) } else { None })
        .collect()
}

/// Per-event optional values (e.g. leading-jet picks) restricted to the
/// passing mask; events without a value are skipped.
pub(crate) fn masked_opt(values: &[Option<f64>], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter_map(|(&v, &m)| if m { v } else { None })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_keeps_passing_entries() {
        assert_eq!(masked(&[1.0, 2.0, 3.0], &[true, false, true]), vec![1.0, 3.0]);
    }

    #[test]
    fn masked_opt_skips_valueless_events() {
        let vals = [Some(1.0), None, Some(3.0)];
        assert_eq!(masked_opt(&vals, &[true, true, true]), vec![1.0, 3.0]);
        assert_eq!(masked_opt(&vals, &[false, true, true]), vec![3.0]);
    }
}
