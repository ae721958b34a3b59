//! # oolong-proc
//!
//! Selections, regions, configuration, and the trigger-study processors.
//!
//! A processor takes one [`EventBatch`](oolong_events::EventBatch),
//! registers named per-event selections, evaluates a validated region
//! table, and fills a fresh copy of its accumulator. Configuration is
//! resolved per batch from a layered YAML file and passed by argument.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod processors;
pub mod regions;
pub mod selection;

pub use config::ProcessorConfig;
pub use processors::{CustomNanoProcessor, HltProcessor, JmeNanoProcessor, Processor};
pub use regions::{num_den_regions, Region, RegionTable};
pub use selection::SelectionRegistry;
