//! # oolong-hist
//!
//! Region/dataset histograms and the mergeable accumulator.
//!
//! Histograms are 1D binned axes with categorical (dataset, region)
//! keys; the [`Accumulator`] maps histogram names to histograms, has an
//! identity element, and merges additively so distributed batch results
//! combine in any order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accumulator;
pub mod axis;
pub mod histogram;

pub use accumulator::Accumulator;
pub use axis::{Axis, BinIndex};
pub use histogram::{BinContents, Hist1D};
