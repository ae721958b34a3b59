//! Batch execution: load, process, fold, write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use oolong_events::EventBatch;
use oolong_hist::Accumulator;
use oolong_lumi::LumiMaskSet;
use oolong_proc::{
    CustomNanoProcessor, HltProcessor, JmeNanoProcessor, Processor, ProcessorConfig,
};

use crate::ProcessorKind;

fn make_processor(kind: ProcessorKind) -> Box<dyn Processor> {
    match kind {
        ProcessorKind::Hlt => Box::new(HltProcessor::new()),
        ProcessorKind::Jmenano => Box::new(JmeNanoProcessor::new()),
        ProcessorKind::CustomNano => Box::new(CustomNanoProcessor::new()),
    }
}

fn load_batch(path: &Path) -> Result<EventBatch> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch file {}", path.display()))?;
    let batch: EventBatch = serde_json::from_str(&text)
        .with_context(|| format!("parsing batch file {}", path.display()))?;
    batch.validate().with_context(|| format!("validating batch file {}", path.display()))?;
    Ok(batch)
}

// rayon treats 0 as one thread per core; without an explicit build the
// first par_iter would install an all-core pool even for --threads 1.
fn init_thread_pool(threads: usize) {
    let _ = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global();
}

fn write_output(acc: &Accumulator, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(acc)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "accumulator written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Process every batch file and fold the partial accumulators.
///
/// Batch order does not matter: the accumulator merge is associative and
/// commutative, so any worker count gives the same result.
pub fn run(
    kind: ProcessorKind,
    config: &Path,
    inputs: &[PathBuf],
    output: Option<&Path>,
    threads: usize,
) -> Result<()> {
    init_thread_pool(threads);

    let processor = make_processor(kind);
    let config_dir = config.parent().unwrap_or_else(|| Path::new("."));
    tracing::info!(processor = processor.name(), batches = inputs.len(), "starting run");

    let partials: Vec<Accumulator> = inputs
        .par_iter()
        .map(|path| -> Result<Accumulator> {
            let batch = load_batch(path)?;
            // An empty batch contributes nothing; skip before resolving
            // the year so even a yearless dataset is not an error here.
            if batch.is_empty() {
                return Ok(processor.accumulator()?.identity());
            }
            // Config and lumi masks resolve per batch: the dataset year
            // picks the era table and the golden JSON.
            let year = processor.dataset_year(&batch.dataset)?;
            let cfg = ProcessorConfig::load(config, year)
                .with_context(|| format!("loading config {}", config.display()))?;
            let lumi = LumiMaskSet::load(&cfg.lumi_masks, config_dir)?;
            tracing::debug!(
                dataset = %batch.dataset,
                n_events = batch.n_events(),
                %year,
                "processing batch"
            );
            Ok(processor.process(&batch, &cfg, &lumi)?)
        })
        .collect::<Result<_>>()?;

    let mut total = processor.accumulator()?.identity();
    for partial in partials {
        total.merge(partial)?;
    }

    write_output(&total, output)
}

/// Merge accumulator archives.
pub fn merge(inputs: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let mut total: Option<Accumulator> = None;
    for path in inputs {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading archive {}", path.display()))?;
        let acc: Accumulator = serde_json::from_str(&text)
            .with_context(|| format!("parsing archive {}", path.display()))?;
        match &mut total {
            Some(t) => t.merge(acc)?,
            None => total = Some(acc),
        }
    }
    let total = total.context("no input archives")?;
    write_output(&total, output)
}
