//! Typed candidate collections built from raw batch branches.
//!
//! The same logical collection (jets, muons, ...) carries different
//! branch names depending on the data source: offline NanoAOD uses
//! `Jet_pt`/`Muon_pt`, the JME trigger ntuples use
//! `hltAK4PFJetsCorrected_pt` for online jets and `offlineMuons_pt` for
//! offline muons. A [`BranchScheme`] maps logical attributes to branch
//! names so the cut code only ever sees one collection type.

use oolong_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::batch::EventBatch;
use crate::jagged::JaggedCol;

/// Branch-name mapping for one data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchScheme {
    /// Prefix for jet branches, e.g. `"Jet"` or `"hltAK4PFJetsCorrected"`.
    pub jet_prefix: String,
    /// Prefix for muon branches, e.g. `"Muon"` or `"offlineMuons"`.
    pub muon_prefix: String,
    /// Prefix for electron branches.
    pub electron_prefix: String,
    /// Prefix for photon branches.
    pub photon_prefix: String,
    /// Whether jets carry a loose-ID flag branch (`<prefix>_looseId`).
    pub jet_loose_id: bool,
    /// Whether muons carry isolation and charge branches.
    pub muon_iso_charge: bool,
    /// Whether muons carry a PDG-ID branch (`<prefix>_pdgId`).
    pub muon_pdg_id: bool,
}

impl BranchScheme {
    /// Offline NanoAOD naming.
    pub fn offline_nano() -> Self {
        Self {
            jet_prefix: "Jet".into(),
            muon_prefix: "Muon".into(),
            electron_prefix: "Electron".into(),
            photon_prefix: "Photon".into(),
            jet_loose_id: true,
            muon_iso_charge: true,
            muon_pdg_id: false,
        }
    }

    /// JME trigger-ntuple naming: online (HLT) jets, offline muons.
    pub fn jme_ntuple() -> Self {
        Self {
            jet_prefix: "hltAK4PFJetsCorrected".into(),
            muon_prefix: "offlineMuons".into(),
            electron_prefix: "offlineElectrons".into(),
            photon_prefix: "offlinePhotons".into(),
            jet_loose_id: false,
            muon_iso_charge: false,
            muon_pdg_id: true,
        }
    }

    fn branch(&self, prefix: &str, attr: &str) -> String {
        format!("{prefix}_{attr}")
    }
}

/// Jets with kinematics and an optional loose-ID flag.
#[derive(Debug, Clone)]
pub struct JetCollection {
    /// Transverse momentum.
    pub pt: JaggedCol,
    /// Pseudorapidity.
    pub eta: JaggedCol,
    /// Absolute pseudorapidity, derived at build time.
    pub abseta: JaggedCol,
    /// Azimuthal angle.
    pub phi: JaggedCol,
    /// Mass.
    pub mass: JaggedCol,
    /// Loose jet-ID flag (1.0 pass / 0.0 fail), when the source has one.
    pub loose_id: Option<JaggedCol>,
}

/// Muons with kinematics and optional isolation/charge.
#[derive(Debug, Clone)]
pub struct MuonCollection {
    /// Transverse momentum.
    pub pt: JaggedCol,
    /// Pseudorapidity.
    pub eta: JaggedCol,
    /// Absolute pseudorapidity, derived at build time.
    pub abseta: JaggedCol,
    /// Azimuthal angle.
    pub phi: JaggedCol,
    /// Mass.
    pub mass: JaggedCol,
    /// Relative isolation, when the source has it.
    pub iso: Option<JaggedCol>,
    /// Electrical charge (±1), when the source has it.
    pub charge: Option<JaggedCol>,
    /// PDG ID (±13 for muons), when the source has it.
    pub pdg_id: Option<JaggedCol>,
}

/// Electrons; only kinematics, used for vetoes and recoil.
#[derive(Debug, Clone)]
pub struct ElectronCollection {
    /// Transverse momentum.
    pub pt: JaggedCol,
    /// Azimuthal angle.
    pub phi: JaggedCol,
}

/// Photons; only kinematics, used for vetoes and recoil.
#[derive(Debug, Clone)]
pub struct PhotonCollection {
    /// Transverse momentum.
    pub pt: JaggedCol,
    /// Azimuthal angle.
    pub phi: JaggedCol,
}

impl JetCollection {
    /// Per-event jet counts.
    pub fn counts(&self) -> Vec<usize> {
        self.pt.counts()
    }
}

impl MuonCollection {
    /// Per-event muon counts.
    pub fn counts(&self) -> Vec<usize> {
        self.pt.counts()
    }
}

impl ElectronCollection {
    /// Per-event electron counts.
    pub fn counts(&self) -> Vec<usize> {
        self.pt.counts()
    }
}

impl PhotonCollection {
    /// Per-event photon counts.
    pub fn counts(&self) -> Vec<usize> {
        self.pt.counts()
    }
}

fn aligned(base: &JaggedCol, other: &JaggedCol, name: &str) -> Result<()> {
    if base.offsets != other.offsets {
        return Err(Error::Validation(format!(
            "candidate attribute '{name}' does not share offsets with pt"
        )));
    }
    Ok(())
}

/// Build the jet collection for `scheme` from `batch`.
///
/// Empty per-event lists are fine; downstream reductions on them yield
/// empty results rather than errors.
pub fn build_jets(batch: &EventBatch, scheme: &BranchScheme) -> Result<JetCollection> {
    let p = &scheme.jet_prefix;
    let pt = batch.jagged(&scheme.branch(p, "pt"))?.clone();
    let eta = batch.jagged(&scheme.branch(p, "eta"))?.clone();
    let phi = batch.jagged(&scheme.branch(p, "phi"))?.clone();
    let mass = batch.jagged(&scheme.branch(p, "mass"))?.clone();
    aligned(&pt, &eta, "eta")?;
    aligned(&pt, &phi, "phi")?;
    aligned(&pt, &mass, "mass")?;
    let loose_id = if scheme.jet_loose_id {
        let id = batch.jagged(&scheme.branch(p, "looseId"))?.clone();
        aligned(&pt, &id, "looseId")?;
        Some(id)
    } else {
        None
    };
    let abseta = eta.map(f64::abs);
    Ok(JetCollection { pt, eta, abseta, phi, mass, loose_id })
}

/// Build the muon collection for `scheme` from `batch`.
pub fn build_muons(batch: &EventBatch, scheme: &BranchScheme) -> Result<MuonCollection> {
    let p = &scheme.muon_prefix;
    let pt = batch.jagged(&scheme.branch(p, "pt"))?.clone();
    let eta = batch.jagged(&scheme.branch(p, "eta"))?.clone();
    let phi = batch.jagged(&scheme.branch(p, "phi"))?.clone();
    let mass = batch.jagged(&scheme.branch(p, "mass"))?.clone();
    aligned(&pt, &eta, "eta")?;
    aligned(&pt, &phi, "phi")?;
    aligned(&pt, &mass, "mass")?;
    let (iso, charge) = if scheme.muon_iso_charge {
        let iso = batch.jagged(&scheme.branch(p, "iso"))?.clone();
        let charge = batch.jagged(&scheme.branch(p, "charge"))?.clone();
        aligned(&pt, &iso, "iso")?;
        aligned(&pt, &charge, "charge")?;
        (Some(iso), Some(charge))
    } else {
        (None, None)
    };
    let pdg_id = if scheme.muon_pdg_id {
        let id = batch.jagged(&scheme.branch(p, "pdgId"))?.clone();
        aligned(&pt, &id, "pdgId")?;
        Some(id)
    } else {
        None
    };
    let abseta = eta.map(f64::abs);
    Ok(MuonCollection { pt, eta, abseta, phi, mass, iso, charge, pdg_id })
}

/// Build the electron collection for `scheme` from `batch`.
pub fn build_electrons(batch: &EventBatch, scheme: &BranchScheme) -> Result<ElectronCollection> {
    let p = &scheme.electron_prefix;
    let pt = batch.jagged(&scheme.branch(p, "pt"))?.clone();
    let phi = batch.jagged(&scheme.branch(p, "phi"))?.clone();
    aligned(&pt, &phi, "phi")?;
    Ok(ElectronCollection { pt, phi })
}

/// Build the photon collection for `scheme` from `batch`.
pub fn build_photons(batch: &EventBatch, scheme: &BranchScheme) -> Result<PhotonCollection> {
    let p = &scheme.photon_prefix;
    let pt = batch.jagged(&scheme.branch(p, "pt"))?.clone();
    let phi = batch.jagged(&scheme.branch(p, "phi"))?.clone();
    aligned(&pt, &phi, "phi")?;
    Ok(PhotonCollection { pt, phi })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jet_batch() -> EventBatch {
        EventBatch::builder("d", vec![1, 1], vec![1, 2])
            .jagged("Jet_pt", JaggedCol::from_counts(&[2, 0], vec![55.0, 30.0]).unwrap())
            .jagged("Jet_eta", JaggedCol::from_counts(&[2, 0], vec![-2.1, 0.4]).unwrap())
            .jagged("Jet_phi", JaggedCol::from_counts(&[2, 0], vec![0.1, 1.2]).unwrap())
            .jagged("Jet_mass", JaggedCol::from_counts(&[2, 0], vec![10.0, 8.0]).unwrap())
            .jagged("Jet_looseId", JaggedCol::from_counts(&[2, 0], vec![1.0, 1.0]).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn build_jets_offline() {
        let jets = build_jets(&jet_batch(), &BranchScheme::offline_nano()).unwrap();
        assert_eq!(jets.counts(), vec![2, 0]);
        assert_eq!(jets.abseta.event(0), &[2.1, 0.4]);
        assert!(jets.loose_id.is_some());
    }

    #[test]
    fn build_jets_missing_branch() {
        let batch = EventBatch::builder("d", vec![1], vec![1])
            .jagged("Jet_pt", JaggedCol::from_counts(&[1], vec![55.0]).unwrap())
            .build()
            .unwrap();
        let err = build_jets(&batch, &BranchScheme::offline_nano()).unwrap_err();
        assert!(err.to_string().contains("Jet_eta"));
    }

    #[test]
    fn build_jets_misaligned_attribute() {
        let batch = EventBatch::builder("d", vec![1, 1], vec![1, 2])
            .jagged("Jet_pt", JaggedCol::from_counts(&[2, 0], vec![55.0, 30.0]).unwrap())
            .jagged("Jet_eta", JaggedCol::from_counts(&[1, 1], vec![-2.1, 0.4]).unwrap())
            .jagged("Jet_phi", JaggedCol::from_counts(&[2, 0], vec![0.1, 1.2]).unwrap())
            .jagged("Jet_mass", JaggedCol::from_counts(&[2, 0], vec![10.0, 8.0]).unwrap())
            .jagged("Jet_looseId", JaggedCol::from_counts(&[2, 0], vec![1.0, 1.0]).unwrap())
            .build()
            .unwrap();
        let err = build_jets(&batch, &BranchScheme::offline_nano()).unwrap_err();
        assert!(err.to_string().contains("eta"));
    }

    #[test]
    fn jme_scheme_reads_online_jets() {
        let batch = EventBatch::builder("d", vec![1], vec![1])
            .jagged("hltAK4PFJetsCorrected_pt", JaggedCol::from_counts(&[1], vec![80.0]).unwrap())
            .jagged("hltAK4PFJetsCorrected_eta", JaggedCol::from_counts(&[1], vec![1.0]).unwrap())
            .jagged("hltAK4PFJetsCorrected_phi", JaggedCol::from_counts(&[1], vec![0.0]).unwrap())
            .jagged("hltAK4PFJetsCorrected_mass", JaggedCol::from_counts(&[1], vec![5.0]).unwrap())
            .build()
            .unwrap();
        let jets = build_jets(&batch, &BranchScheme::jme_ntuple()).unwrap();
        assert_eq!(jets.counts(), vec![1]);
        assert!(jets.loose_id.is_none());
    }

    #[test]
    fn empty_collections_propagate() {
        let batch = EventBatch::builder("d", vec![1, 2], vec![1, 2])
            .jagged("Electron_pt", JaggedCol::from_counts(&[0, 0], vec![]).unwrap())
            .jagged("Electron_phi", JaggedCol::from_counts(&[0, 0], vec![]).unwrap())
            .build()
            .unwrap();
        let ele = build_electrons(&batch, &BranchScheme::offline_nano()).unwrap();
        assert_eq!(ele.counts(), vec![0, 0]);
        assert_eq!(ele.pt.max(), vec![None, None]);
    }
}
