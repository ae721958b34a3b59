//! Layered per-era processor configuration.
//!
//! The configuration file carries a `default` table plus optional
//! `era{year}` tables that are deep-merged over it, mirroring the layered
//! YAML the original analyses used. The result is a plain
//! [`ProcessorConfig`] resolved once per batch and passed by argument —
//! never global process state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use oolong_core::{Error, Result, Year};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

/// Tight-muon cut thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuonCuts {
    /// Minimum pt for a tight muon.
    pub tight_pt: f64,
    /// Maximum |eta| for a tight muon.
    pub tight_eta: f64,
    /// Maximum relative isolation for a tight muon.
    pub tight_iso: f64,
}

/// Jet cut thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JetCuts {
    /// Minimum leading-jet pt.
    pub lead_pt: f64,
    /// Maximum leading-jet |eta|.
    pub lead_abseta: f64,
    /// |eta| defining the barrel for tag-and-probe jets.
    pub barrel_abseta: f64,
}

/// Dimuon (Z candidate) selection window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimuonCuts {
    /// Lower edge of the mass window.
    pub mass_min: f64,
    /// Upper edge of the mass window.
    pub mass_max: f64,
    /// Minimum dimuon pt.
    pub pt_min: f64,
    /// Minimum pt for each muon leg.
    pub leg_pt: f64,
    /// Maximum |eta| for each muon leg.
    pub leg_abseta: f64,
}

/// Trigger path names per processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triggers {
    /// Reference (orthogonal) trigger for efficiency measurements.
    pub reference: String,
    /// METnoMu path for the turn-on study.
    pub met_main: String,
    /// METnoMu path with the HF noise filter.
    pub met_clean: String,
    /// Jet paths measured by the JME-NANO processor.
    #[serde(default)]
    pub jet: Vec<String>,
    /// Paths measured by the custom-NANO processor.
    #[serde(default)]
    pub custom_nano: Vec<String>,
}

/// Fully resolved configuration for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Muon thresholds.
    pub muon: MuonCuts,
    /// Jet thresholds.
    pub jet: JetCuts,
    /// Dimuon selection window.
    pub dimuon: DimuonCuts,
    /// Minimum muon pt in the single-muon control region.
    pub single_muon_pt: f64,
    /// Maximum |pf - calo| MET balance, relative to the recoil.
    pub calo_balance: f64,
    /// Trigger path names.
    pub triggers: Triggers,
    /// MET-filter flag branches required in data.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Golden JSON path per data-taking year.
    #[serde(default)]
    pub lumi_masks: BTreeMap<u16, PathBuf>,
}

impl ProcessorConfig {
    /// Load the layered file at `path`, resolving the era for `year`.
    pub fn load(path: impl AsRef<Path>, year: Year) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_layered_str(&text, year)
    }

    /// Resolve a layered YAML document: `default` deep-merged with
    /// `era{year}`, when that table exists.
    pub fn from_layered_str(text: &str, year: Year) -> Result<Self> {
        let doc: Value = serde_yaml_ng::from_str(text)?;
        let mut base = doc
            .get("default")
            .cloned()
            .ok_or_else(|| Error::Config("missing 'default' table".into()))?;
        if let Year::Known(y) = year {
            if let Some(overlay) = doc.get(format!("era{y}").as_str()) {
                deep_merge(&mut base, overlay);
            }
        }
        Ok(serde_yaml_ng::from_value(base)?)
    }
}

/// Merge `overlay` into `base`: mappings recurse, everything else
/// (including sequences) replaces.
fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYERED: &str = r#"
default:
  muon:
    tight_pt: 20.0
    tight_eta: 2.4
    tight_iso: 0.15
  jet:
    lead_pt: 40.0
    lead_abseta: 4.5
    barrel_abseta: 1.3
  dimuon:
    mass_min: 60.0
    mass_max: 120.0
    pt_min: 15.0
    leg_pt: 20.0
    leg_abseta: 2.3
  single_muon_pt: 30.0
  calo_balance: 0.5
  triggers:
    reference: HLT_IsoMu27
    met_main: HLT_PFMETNoMu120_PFMHTNoMu120_IDTight
    met_clean: HLT_PFMETNoMu120_PFMHTNoMu120_IDTight_FilterHF
    jet: [HLT_PFJet60, HLT_PFJet140]
  filters: [Flag_goodVertices]
  lumi_masks: {}

era2022:
  dimuon:
    mass_min: 70.0
    mass_max: 110.0
  triggers:
    jet: [HLT_PFJet500]
  lumi_masks:
    2022: data/json/golden_2022.json
"#;

    #[test]
    fn default_era() {
        let cfg = ProcessorConfig::from_layered_str(LAYERED, Year::Unknown).unwrap();
        assert_eq!(cfg.dimuon.mass_min, 60.0);
        assert_eq!(cfg.triggers.jet, vec!["HLT_PFJet60", "HLT_PFJet140"]);
        assert!(cfg.lumi_masks.is_empty());
    }

    #[test]
    fn era_overlay_deep_merges() {
        let cfg = ProcessorConfig::from_layered_str(LAYERED, Year::Known(2022)).unwrap();
        // overridden
        assert_eq!(cfg.dimuon.mass_min, 70.0);
        assert_eq!(cfg.dimuon.mass_max, 110.0);
        // untouched siblings survive the merge
        assert_eq!(cfg.dimuon.pt_min, 15.0);
        assert_eq!(cfg.muon.tight_iso, 0.15);
        // sequences replace wholesale
        assert_eq!(cfg.triggers.jet, vec!["HLT_PFJet500"]);
        assert_eq!(cfg.lumi_masks.get(&2022).unwrap(), &PathBuf::from("data/json/golden_2022.json"));
    }

    #[test]
    fn unknown_era_falls_back_to_default() {
        let cfg = ProcessorConfig::from_layered_str(LAYERED, Year::Known(2019)).unwrap();
        assert_eq!(cfg.dimuon.mass_min, 60.0);
    }

    #[test]
    fn missing_default_table() {
        let err = ProcessorConfig::from_layered_str("era2022: {}", Year::Unknown).unwrap_err();
        assert!(err.to_string().contains("default"));
    }
}
