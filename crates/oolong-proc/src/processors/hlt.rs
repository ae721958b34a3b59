//! METnoMu trigger turn-on processor over offline NanoAOD.
//!
//! Selects a single-muon control sample with a well-measured hadronic
//! recoil and measures the turn-on of the METnoMu paths against the
//! isolated-muon reference trigger. A dimuon control region fills the
//! Z-candidate mass for normalization checks.

use oolong_core::{extract_year, Error, Result, Year};
use oolong_events::{
    build_electrons, build_jets, build_muons, build_photons, distinct_muon_pairs, recoil,
    BranchScheme, EventBatch,
};
use oolong_hist::{Accumulator, Axis};
use oolong_lumi::LumiMaskSet;

use crate::config::ProcessorConfig;
use crate::regions::RegionTable;
use crate::selection::SelectionRegistry;

use super::{masked, masked_opt, Processor};

/// Processor for the METnoMu turn-on study.
#[derive(Debug, Default)]
pub struct HltProcessor;

impl HltProcessor {
    /// Create the processor.
    pub fn new() -> Self {
        Self
    }

    fn regions(&self) -> Result<RegionTable> {
        // Single-muon control sample: the recoil plays the role of the
        // METnoMu trigger variable, so the muon is "invisible" to it.
        let common = [
            "lumi_mask",
            "filt_met",
            "ref_trig",
            "one_muon",
            "muon_pt",
            "at_least_one_tight_mu",
            "veto_ele",
            "veto_pho",
            "leadak4_pt_eta",
            "leadak4_id",
            "calo_diff",
        ];
        let mut table = RegionTable::new();
        for (label, accept) in [("mftmht", "mftmht_trig"), ("mftmht_clean", "mftmht_clean_trig")] {
            let den: Vec<String> = common.iter().map(|c| c.to_string()).collect();
            let mut num = den.clone();
            num.push(accept.to_string());
            table.push(format!("{label}_num"), num)?;
            table.push(format!("{label}_den"), den)?;
        }
        table.push(
            "dimuon_cr",
            [
                "lumi_mask",
                "filt_met",
                "ref_trig",
                "two_muons",
                "at_least_one_tight_mu",
                "dimuon_mass",
                "dimuon_charge",
                "veto_ele",
                "veto_pho",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        )?;
        Ok(table)
    }
}

impl Processor for HltProcessor {
    fn name(&self) -> &'static str {
        "hlt"
    }

    fn dataset_year(&self, dataset: &str) -> Result<Year> {
        // Refuses datasets without a resolvable year: the era config and
        // golden JSON choice depend on it.
        extract_year(dataset)
            .map(Year::Known)
            .ok_or_else(|| Error::Validation(format!("cannot extract year from dataset '{dataset}'")))
    }

    fn accumulator(&self) -> Result<Accumulator> {
        let mut acc = Accumulator::new();
        acc.declare(
            "trigger_turnon",
            Axis::regular("turnon", "Recoil p_T [GeV]", 50, 0.0, 1000.0)?,
        )?;
        acc.declare("met", Axis::regular("met", "MET [GeV]", 50, 0.0, 500.0)?)?;
        acc.declare("ak4_pt0", Axis::regular("jetpt", "Leading jet p_T [GeV]", 100, 0.0, 1000.0)?)?;
        acc.declare("ak4_eta0", Axis::regular("jeteta", "Leading jet eta", 50, -5.0, 5.0)?)?;
        acc.declare("dimuon_mass", Axis::regular("dimumass", "M(mu mu) [GeV]", 60, 60.0, 120.0)?)?;
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
        let scheme = BranchScheme::offline_nano();
        let jets = build_jets(batch, &scheme)?;
        let muons = build_muons(batch, &scheme)?;
        let electrons = build_electrons(batch, &scheme)?;
        let photons = build_photons(batch, &scheme)?;

        let met_pt = batch.scalar("MET_pt")?;
        let met_phi = batch.scalar("MET_phi")?;
        let calo_met_pt = batch.scalar("CaloMET_pt")?;

        let mut selection = SelectionRegistry::new(batch.n_events());

        selection.add("lumi_mask", lumi.mask_or_pass(year, batch.run(), batch.lumi_block())?)?;

        // Leading jet: pt above threshold, inside acceptance, loose ID.
        let lead_jet = jets.pt.argmax();
        let leadak4_pt_eta: Vec<bool> = lead_jet
            .iter()
            .enumerate()
            .map(|(row, idx)| match idx {
                Some(i) => {
                    jets.pt.get(row, *i, 0.0) > cfg.jet.lead_pt
                        && jets.abseta.get(row, *i, f64::INFINITY) < cfg.jet.lead_abseta
                }
                None => false,
            })
            .collect();
        selection.add("leadak4_pt_eta", leadak4_pt_eta)?;
        let loose_id = jets
            .loose_id
            .as_ref()
            .ok_or_else(|| Error::Validation("offline jets are missing the looseId branch".into()))?;
        let leadak4_id: Vec<bool> = lead_jet
            .iter()
            .enumerate()
            .map(|(row, idx)| idx.map_or(false, |i| loose_id.get(row, i, 0.0) > 0.5))
            .collect();
        selection.add("leadak4_id", leadak4_id)?;

        // Trigger decisions.
        selection.add("mftmht_trig", batch.flag(&cfg.triggers.met_main)?.to_vec())?;
        selection.add("mftmht_clean_trig", batch.flag(&cfg.triggers.met_clean)?.to_vec())?;
        selection.add("ref_trig", batch.flag(&cfg.triggers.reference)?.to_vec())?;

        // Muons.
        let is_tight: Vec<bool> = (0..batch.n_events())
            .map(|row| {
                let iso = muons.iso.as_ref();
                (0..muons.pt.count(row)).any(|i| {
                    iso.map_or(true, |iso| iso.get(row, i, f64::INFINITY) < cfg.muon.tight_iso)
                        && muons.pt.get(row, i, 0.0) > cfg.muon.tight_pt
                        && muons.abseta.get(row, i, f64::INFINITY) < cfg.muon.tight_eta
                })
            })
            .collect();
        selection.add("at_least_one_tight_mu", is_tight)?;

        let muon_counts = muons.counts();
        selection.add("two_muons", muon_counts.iter().map(|&c| c == 2).collect())?;
        selection.add("one_muon", muon_counts.iter().map(|&c| c == 1).collect())?;
        selection.add(
            "muon_pt",
            muons.pt.max().iter().map(|m| m.map_or(false, |v| v > cfg.single_muon_pt)).collect(),
        )?;

        let dimuons = distinct_muon_pairs(&muons, None)?;
        selection.add(
            "dimuon_mass",
            (0..batch.n_events())
                .map(|row| {
                    dimuons
                        .mass
                        .event(row)
                        .iter()
                        .any(|&m| m > cfg.dimuon.mass_min && m < cfg.dimuon.mass_max)
                })
                .collect(),
        )?;
        selection.add("dimuon_charge", dimuons.charge_sum.any(|q| q == 0.0))?;

        // Vetoes.
        selection.add("veto_ele", electrons.counts().iter().map(|&c| c == 0).collect())?;
        selection.add("veto_pho", photons.counts().iter().map(|&c| c == 0).collect())?;

        // MET filters.
        selection.add("filt_met", batch.all_flags(&cfg.filters)?)?;

        // Recoil and PF/Calo MET balance. Division by a vanishing recoil
        // yields inf/NaN, which fails the comparison as intended.
        let (recoil_pt, _recoil_phi) = recoil(met_pt, met_phi, &electrons, &muons, &photons)?;
        let calo_diff: Vec<bool> = (0..batch.n_events())
            .map(|row| ((met_pt[row] - calo_met_pt[row]) / recoil_pt[row]).abs() < cfg.calo_balance)
            .collect();
        selection.add("calo_diff", calo_diff)?;

        let regions = self.regions()?;
        regions.validate(&selection)?;
        tracing::debug!(
            dataset = %batch.dataset,
            n_events = batch.n_events(),
            regions = regions.len(),
            "filling turn-on regions"
        );

        let lead_pt_vals = jets.pt.pick(&lead_jet)?;
        let lead_eta_vals = jets.eta.pick(&lead_jet)?;

        let dataset = &batch.dataset;
        for region in regions.iter() {
            let mask = selection.all(region.cuts.iter().map(String::as_str))?;
            output.get_mut("trigger_turnon")?.fill(
                dataset,
                &region.name,
                &masked(&recoil_pt, &mask),
                None,
            )?;
            output.get_mut("met")?.fill(dataset, &region.name, &masked(met_pt, &mask), None)?;
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
            output.get_mut("dimuon_mass")?.fill(
                dataset,
                &region.name,
                &dimuons.mass.select_events(&mask)?.flat,
                None,
            )?;
        }

        Ok(output)
    }
}
