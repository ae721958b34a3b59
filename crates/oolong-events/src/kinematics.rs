//! Pair building and transverse kinematics.

use oolong_core::{Error, Result};

use crate::candidates::{ElectronCollection, MuonCollection, PhotonCollection};
use crate::jagged::JaggedCol;

/// Wrap an angle difference into `[-pi, pi]`.
pub fn delta_phi(a: f64, b: f64) -> f64 {
    let mut d = a - b;
    while d > std::f64::consts::PI {
        d -= 2.0 * std::f64::consts::PI;
    }
    while d < -std::f64::consts::PI {
        d += 2.0 * std::f64::consts::PI;
    }
    d
}

fn four_vector(pt: f64, eta: f64, phi: f64, mass: f64) -> (f64, f64, f64, f64) {
    let px = pt * phi.cos();
    let py = pt * phi.sin();
    let pz = pt * eta.sinh();
    let e = (px * px + py * py + pz * pz + mass * mass).sqrt();
    (px, py, pz, e)
}

/// Distinct same-event muon pairs with derived pair quantities.
///
/// All columns share one offset table: one entry per (i, j) pair with
/// i < j within the event.
#[derive(Debug, Clone)]
pub struct MuonPairs {
    /// Invariant mass of the pair.
    pub mass: JaggedCol,
    /// Transverse momentum of the vector sum.
    pub pt: JaggedCol,
    /// Sum of the two charges; 0.0 when the source has no charge branch.
    pub charge_sum: JaggedCol,
    /// 1.0 when the legs carry opposite charge, 0.0 otherwise. Falls back
    /// to the PDG-ID product sign when the source has no charge branch;
    /// 0.0 when neither is available.
    pub opposite_sign: JaggedCol,
    /// pt of the first (higher-index-ordered) leg.
    pub lead_pt: JaggedCol,
    /// pt of the second leg.
    pub sub_pt: JaggedCol,
    /// |eta| of the first leg.
    pub lead_abseta: JaggedCol,
    /// |eta| of the second leg.
    pub sub_abseta: JaggedCol,
}

/// Build all distinct muon pairs per event.
///
/// `max_per_event` limits how many leading muons enter the pairing; the
/// Z→µµ selection uses `Some(2)` so exactly the two leading muons are
/// paired. Events with fewer than two muons contribute no pairs.
pub fn distinct_muon_pairs(muons: &MuonCollection, max_per_event: Option<usize>) -> Result<MuonPairs> {
    let n_events = muons.pt.n_events();
    let mut counts = Vec::with_capacity(n_events);
    let mut mass = Vec::new();
    let mut pt = Vec::new();
    let mut charge_sum = Vec::new();
    let mut opposite_sign = Vec::new();
    let mut lead_pt = Vec::new();
    let mut sub_pt = Vec::new();
    let mut lead_abseta = Vec::new();
    let mut sub_abseta = Vec::new();

    for row in 0..n_events {
        let n = muons.pt.count(row);
        let limit = max_per_event.map_or(n, |m| m.min(n));
        let mut n_pairs = 0usize;
        for i in 0..limit {
            for j in (i + 1)..limit {
                let (px1, py1, pz1, e1) = four_vector(
                    muons.pt.get(row, i, 0.0),
                    muons.eta.get(row, i, 0.0),
                    muons.phi.get(row, i, 0.0),
                    muons.mass.get(row, i, 0.0),
                );
                let (px2, py2, pz2, e2) = four_vector(
                    muons.pt.get(row, j, 0.0),
                    muons.eta.get(row, j, 0.0),
                    muons.phi.get(row, j, 0.0),
                    muons.mass.get(row, j, 0.0),
                );
                let px = px1 + px2;
                let py = py1 + py2;
                let pz = pz1 + pz2;
                let e = e1 + e2;
                let m2 = e * e - px * px - py * py - pz * pz;
                mass.push(m2.max(0.0).sqrt());
                pt.push(px.hypot(py));

                let (qsum, opp) = match (&muons.charge, &muons.pdg_id) {
                    (Some(q), _) => {
                        let qi = q.get(row, i, 0.0);
                        let qj = q.get(row, j, 0.0);
                        (qi + qj, if qi * qj < 0.0 { 1.0 } else { 0.0 })
                    }
                    (None, Some(id)) => {
                        let prod = id.get(row, i, 0.0) * id.get(row, j, 0.0);
                        (0.0, if prod < 0.0 { 1.0 } else { 0.0 })
                    }
                    (None, None) => (0.0, 0.0),
                };
                charge_sum.push(qsum);
                opposite_sign.push(opp);

                lead_pt.push(muons.pt.get(row, i, 0.0));
                sub_pt.push(muons.pt.get(row, j, 0.0));
                lead_abseta.push(muons.abseta.get(row, i, 0.0));
                sub_abseta.push(muons.abseta.get(row, j, 0.0));
                n_pairs += 1;
            }
        }
        counts.push(n_pairs);
    }

    Ok(MuonPairs {
        mass: JaggedCol::from_counts(&counts, mass)?,
        pt: JaggedCol::from_counts(&counts, pt)?,
        charge_sum: JaggedCol::from_counts(&counts, charge_sum)?,
        opposite_sign: JaggedCol::from_counts(&counts, opposite_sign)?,
        lead_pt: JaggedCol::from_counts(&counts, lead_pt)?,
        sub_pt: JaggedCol::from_counts(&counts, sub_pt)?,
        lead_abseta: JaggedCol::from_counts(&counts, lead_abseta)?,
        sub_abseta: JaggedCol::from_counts(&counts, sub_abseta)?,
    })
}

/// Hadronic recoil: MET with electrons, muons and photons added back
/// vectorially in the transverse plane.
///
/// Returns `(recoil_pt, recoil_phi)`, one entry per event. MET arrays
/// and collections must share the event count.
pub fn recoil(
    met_pt: &[f64],
    met_phi: &[f64],
    electrons: &ElectronCollection,
    muons: &MuonCollection,
    photons: &PhotonCollection,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = met_pt.len();
    if met_phi.len() != n
        || electrons.pt.n_events() != n
        || muons.pt.n_events() != n
        || photons.pt.n_events() != n
    {
        return Err(Error::Validation(
            "recoil inputs do not share a common event count".into(),
        ));
    }

    let mut recoil_pt = Vec::with_capacity(n);
    let mut recoil_phi = Vec::with_capacity(n);
    for row in 0..n {
        let mut px = met_pt[row] * met_phi[row].cos();
        let mut py = met_pt[row] * met_phi[row].sin();
        for (pts, phis) in [
            (electrons.pt.event(row), electrons.phi.event(row)),
            (muons.pt.event(row), muons.phi.event(row)),
            (photons.pt.event(row), photons.phi.event(row)),
        ] {
            for (p, f) in pts.iter().zip(phis) {
                px += p * f.cos();
                py += p * f.sin();
            }
        }
        recoil_pt.push(px.hypot(py));
        recoil_phi.push(py.atan2(px));
    }
    Ok((recoil_pt, recoil_phi))
}
