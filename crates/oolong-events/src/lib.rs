//! # oolong-events
//!
//! Columnar event batches and candidate collections for Oolong.
//!
//! An [`EventBatch`] is one immutable chunk of events with named scalar,
//! flag, and jagged branches. Candidate builders turn raw branches into
//! typed collections (jets, muons, electrons, photons) through a
//! [`BranchScheme`], and the kinematics module derives pair and recoil
//! quantities from them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod candidates;
pub mod jagged;
pub mod kinematics;

pub use batch::{BatchBuilder, EventBatch};
pub use candidates::{
    build_electrons, build_jets, build_muons, build_photons, BranchScheme, ElectronCollection,
    JetCollection, MuonCollection, PhotonCollection,
};
pub use jagged::JaggedCol;
pub use kinematics::{delta_phi, distinct_muon_pairs, recoil, MuonPairs};
