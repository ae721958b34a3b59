//! Jet-trigger efficiency processor over JME trigger ntuples.
//!
//! Tags Z→µµ events with the isolated-muon reference trigger and probes
//! the jet paths with the leading online jet in the barrel, back-to-back
//! with the Z. Regions come in `_num`/`_den` pairs per jet path.

use oolong_core::{extract_year, Result, Year};
use oolong_events::{build_jets, build_muons, distinct_muon_pairs, BranchScheme, EventBatch};
use oolong_hist::{Accumulator, Axis};
use oolong_lumi::LumiMaskSet;

use crate::config::ProcessorConfig;
use crate::regions::num_den_regions;
use crate::selection::{not, SelectionRegistry};

use super::{masked, masked_opt, Processor};

/// Processor over JME trigger ntuples (online jets, offline muons).
#[derive(Debug, Default)]
pub struct JmeNanoProcessor;

impl JmeNanoProcessor {
    /// Create the processor.
    pub fn new() -> Self {
        Self
    }
}

impl Processor for JmeNanoProcessor {
    fn name(&self) -> &'static str {
        "jmenano"
    }

    fn dataset_year(&self, dataset: &str) -> Result<Year> {
        // Unlike the other processors this one keeps going when the year
        // cannot be determined; the lumi filter then fails open and the
        // default config era applies.
        Ok(extract_year(dataset).map_or(Year::Unknown, Year::Known))
    }

    fn accumulator(&self) -> Result<Accumulator> {
        let mut acc = Accumulator::new();
        acc.declare("ak4_pt0", Axis::regular("jetpt", "Leading jet p_T [GeV]", 100, 0.0, 1000.0)?)?;
        acc.declare("ak4_eta0", Axis::regular("jeteta", "Leading jet eta", 50, -5.0, 5.0)?)?;
        acc.declare(
            "ak4_phi0",
            Axis::regular(
                "jetphi",
                "Leading jet phi",
                50,
                -std::f64::consts::PI,
                std::f64::consts::PI,
            )?,
        )?;
        acc.declare("z_pt", Axis::regular("pt", "Z p_T [GeV]", 40, 0.0, 400.0)?)?;
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
        let scheme = BranchScheme::jme_ntuple();
        let jets = build_jets(batch, &scheme)?;
        let muons = build_muons(batch, &scheme)?;

        let mut selection = SelectionRegistry::new(batch.n_events());
        selection.add("inclusive", vec![true; batch.n_events()])?;
        selection.add("lumi_mask", lumi.mask_or_pass(year, batch.run(), batch.lumi_block())?)?;

        // Z candidate from the two leading muons.
        let dimuons = distinct_muon_pairs(&muons, Some(2))?;
        selection.add("two_muons", dimuons.mass.counts().iter().map(|&c| c > 0).collect())?;
        selection.add("opp_sign", dimuons.opposite_sign.any(|v| v > 0.5))?;
        selection.add(
            "central_muons",
            (0..batch.n_events())
                .map(|row| {
                    (0..dimuons.mass.count(row)).any(|i| {
                        dimuons.lead_abseta.get(row, i, f64::INFINITY) < cfg.dimuon.leg_abseta
                            && dimuons.sub_abseta.get(row, i, f64::INFINITY) < cfg.dimuon.leg_abseta
                    })
                })
                .collect(),
        )?;
        selection.add(
            "muon_pt",
            (0..batch.n_events())
                .map(|row| {
                    (0..dimuons.mass.count(row)).any(|i| {
                        dimuons.lead_pt.get(row, i, 0.0) > cfg.dimuon.leg_pt
                            && dimuons.sub_pt.get(row, i, 0.0) > cfg.dimuon.leg_pt
                    })
                })
                .collect(),
        )?;
        selection.add(
            "dimuon_mass",
            dimuons.mass.any(|m| m > cfg.dimuon.mass_min && m < cfg.dimuon.mass_max),
        )?;
        selection.add("dimuon_pt", dimuons.pt.any(|pt| pt > cfg.dimuon.pt_min))?;

        // Leading online jet inside the barrel.
        let lead_jet = jets.pt.argmax();
        selection.add(
            "lead_ak4_in_barrel",
            lead_jet
                .iter()
                .enumerate()
                .map(|(row, idx)| {
                    idx.map_or(false, |i| {
                        jets.abseta.get(row, i, f64::INFINITY) < cfg.jet.barrel_abseta
                    })
                })
                .collect(),
        )?;

        // Probed jet paths and the reference trigger.
        for trigger in &cfg.triggers.jet {
            selection.add(
                format!("{trigger}_accepted"),
                batch.flag(&format!("{trigger}_HLTPathAccept"))?.to_vec(),
            )?;
            selection.add(
                format!("{trigger}_wasrun"),
                not(batch.flag(&format!("{trigger}_HLTPathPrescaled"))?),
            )?;
        }
        let reference = &cfg.triggers.reference;
        selection.add("ref_trig", batch.flag(&format!("{reference}_HLTPathAccept"))?.to_vec())?;
        selection.add("ref_trig_wasrun", not(batch.flag(&format!("{reference}_HLTPathPrescaled"))?))?;

        let regions = num_den_regions(
            &cfg.triggers.jet,
            &[
                "lumi_mask",
                "ref_trig",
                "ref_trig_wasrun",
                "two_muons",
                "opp_sign",
                "central_muons",
                "muon_pt",
                "dimuon_mass",
                "dimuon_pt",
                "lead_ak4_in_barrel",
            ],
            |t| vec![format!("{t}_wasrun")],
            |t| format!("{t}_accepted"),
        )?;
        regions.validate(&selection)?;
        tracing::debug!(
            dataset = %batch.dataset,
            n_events = batch.n_events(),
            regions = regions.len(),
            "filling tag-and-probe regions"
        );

        let lead_pt_vals = jets.pt.pick(&lead_jet)?;
        let lead_eta_vals = jets.eta.pick(&lead_jet)?;
        let lead_phi_vals = jets.phi.pick(&lead_jet)?;
        // Z pt per event: at most one pair exists (two leading muons).
        let z_pt: Vec<f64> = (0..batch.n_events()).map(|row| dimuons.pt.get(row, 0, 0.0)).collect();

        let dataset = &batch.dataset;
        for region in regions.iter() {
            let mask = selection.all(region.cuts.iter().map(String::as_str))?;
            output.get_mut("ak4_pt0")?.fill(
                dataset,
                &region.name,
                &masked_opt(&lead_pt_vals, &mask),
                None,
            )?;
            output.get_mut("ak4_eta0")?.fill(
                dataset,
                &region.name,
                &masked_opt(&lead_eta_vals, &mask),
                None,
            )?;
            output.get_mut("ak4_phi0")?.fill(
                dataset,
                &region.name,
                &masked_opt(&lead_phi_vals, &mask),
                None,
            )?;
            output.get_mut("z_pt")?.fill(dataset, &region.name, &masked(&z_pt, &mask), None)?;
        }

        Ok(output)
    }
}
