//! Trigger-efficiency processor for the custom NANO ntuples.
//!
//! Measures per-path efficiencies from precomputed event-level branches:
//! for every configured path it requires the HLT path and its L1 seed to
//! have actually run (not prescaled), splits into `_num` (path accepted)
//! and `_den` regions, and fills leading-jet pt, HT, and MET.

use oolong_core::{extract_year, Error, Result, Year};
use oolong_events::EventBatch;
use oolong_hist::{Accumulator, Axis};
use oolong_lumi::LumiMaskSet;

use crate::config::ProcessorConfig;
use crate::regions::num_den_regions;
use crate::selection::{not, SelectionRegistry};

use super::{masked, Processor};

/// Processor over custom NANO event-level branches.
#[derive(Debug, Default)]
pub struct CustomNanoProcessor;

impl CustomNanoProcessor {
    /// Create the processor.
    pub fn new() -> Self {
        Self
    }
}

impl Processor for CustomNanoProcessor {
    fn name(&self) -> &'static str {
        "custom-nano"
    }

    fn dataset_year(&self, dataset: &str) -> Result<Year> {
        // This processor refuses datasets without a resolvable year.
        extract_year(dataset)
            .map(Year::Known)
            .ok_or_else(|| Error::Validation(format!("cannot extract year from dataset '{dataset}'")))
    }

    fn accumulator(&self) -> Result<Accumulator> {
        let mut acc = Accumulator::new();
        acc.declare("ak4_pt0", Axis::regular("jetpt", "Leading jet p_T [GeV]", 100, 0.0, 1000.0)?)?;
        acc.declare("ht", Axis::regular("ht", "H_T [GeV]", 60, 0.0, 3000.0)?)?;
        acc.declare("met", Axis::regular("met", "MET [GeV]", 50, 0.0, 500.0)?)?;
        Ok(acc)
    }

    fn process(
        &self,
        batch: &EventBatch,
        cfg: &ProcessorConfig,
        lumi: &LumiMaskSet,
    ) -> Result<Accumulator> {
        let mut output = self.accumulator()?.identity();
        if batch.is_empty() {
            return Ok(output);
        }

        let year = self.dataset_year(&batch.dataset)?;
        let mut selection = SelectionRegistry::new(batch.n_events());

        let lumi_mask = lumi.mask_or_pass(year, batch.run(), batch.lumi_block())?;
        selection.add("lumi_mask", lumi_mask)?;

        for trigger in &cfg.triggers.custom_nano {
            // The path has been accepted by HLT.
            selection.add(
                format!("{trigger}_HLTPathAccept"),
                batch.flag(&format!("{trigger}_HLTPathAccept"))?.to_vec(),
            )?;
            // The path was run (not prescaled).
            selection.add(
                format!("{trigger}_HLTPathNotPrescaled"),
                not(batch.flag(&format!("{trigger}_HLTPathPrescaled"))?),
            )?;
            // The underlying L1 seed was run (not prescaled or masked).
            selection.add(
                format!("{trigger}_L1TSeedNotPrescaled"),
                not(batch.flag(&format!("{trigger}_L1TSeedPrescaledOrMasked"))?),
            )?;
            // The L1 seed passed.
            selection.add(
                format!("{trigger}_L1TSeedAccept"),
                batch.flag(&format!("{trigger}_L1TSeedAccept"))?.to_vec(),
            )?;
        }

        let regions = num_den_regions(
            &cfg.triggers.custom_nano,
            &["lumi_mask"],
            |t| {
                vec![
                    format!("{t}_HLTPathNotPrescaled"),
                    format!("{t}_L1TSeedNotPrescaled"),
                    format!("{t}_L1TSeedAccept"),
                ]
            },
            |t| format!("{t}_HLTPathAccept"),
        )?;
        regions.validate(&selection)?;
        tracing::debug!(
            dataset = %batch.dataset,
            n_events = batch.n_events(),
            regions = regions.len(),
            "filling trigger regions"
        );

        let lead_jet_pt = batch.scalar("leadingJet_pt")?;
        let ht = batch.scalar("ht")?;
        let met = batch.scalar("met")?;

        let dataset = &batch.dataset;
        for region in regions.iter() {
            let mask = selection.all(region.cuts.iter().map(String::as_str))?;
            output.get_mut("ak4_pt0")?.fill(dataset, &region.name, &masked(lead_jet_pt, &mask), None)?;
            output.get_mut("ht")?.fill(dataset, &region.name, &masked(ht, &mask), None)?;
            output.get_mut("met")?.fill(dataset, &region.name, &masked(met, &mask), None)?;
        }

        Ok(output)
    }
}
