use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

use crate::{
    align::{AlignmentHit, AlignmentLocator, Blastn},
    cli::Config,
    depth::DepthTable,
    model::ModelParams,
    ratio::{PositionResult, TargetSummary},
};

mod output;
mod sweep_summary;
mod target;

use output::{output_path, write_summary_cal, write_summary_full, PositionWriter};
pub use sweep_summary::{aggregate, SweepSummary};
use target::process_target;

/// Per target settings shared by every task of a sweep
#[derive(Debug, Clone)]
pub struct SweepParams {
    pub fixlen: usize,
    pub model: ModelParams,
    pub with_flanking: bool,
}

/// Run every target at every cutlen.  Cutlens are processed in order; the
/// targets of one cutlen run in parallel on `pool` and are collected before
/// the next cutlen starts.  `sink` sees the per position rows of each
/// successful target once its cutlen has completed.
pub fn run_sweep<F>(
    pool: &ThreadPool,
    table: &DepthTable,
    hits: &[AlignmentHit],
    cutlens: &[usize],
    par: &SweepParams,
    mut sink: F,
) -> anyhow::Result<Vec<TargetSummary>>
where
    F: FnMut(usize, &[PositionResult]) -> anyhow::Result<()>,
{
    let mut summaries = Vec::with_capacity(hits.len() * cutlens.len());
    for &cutlen in cutlens.iter() {
        info!("Processing with cutlen={}", cutlen);
        let res: Vec<_> = pool.install(|| {
            hits.par_iter()
                .map(|hit| process_target(table, hit, cutlen, par))
                .collect()
        });
        let mut n_ok = 0;
        for r in res.into_iter().flatten() {
            sink(cutlen, &r.positions)?;
            summaries.push(r.summary);
            n_ok += 1;
        }
        debug!(
            "cutlen {}: {} of {} targets summarized",
            cutlen,
            n_ok,
            hits.len()
        );
    }
    Ok(summaries)
}

fn make_pool(threads: usize) -> anyhow::Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| anyhow!("Could not build worker pool: {}", e))?;
    debug!("Worker pool started with {} threads", pool.current_num_threads());
    Ok(pool)
}

pub fn process_data(cfg: Config) -> anyhow::Result<()> {
    let locator = Blastn::new(cfg.blastn(), cfg.aligner_timeout());
    process_with_locator(&cfg, &locator)
}

pub fn process_with_locator<L: AlignmentLocator>(cfg: &Config, locator: &L) -> anyhow::Result<()> {
    let table = DepthTable::from_path(cfg.depth_tab(), cfg.contig())?;
    if let (Some(first), Some(last)) = (table.records().first(), table.records().last()) {
        info!(
            "Read {} depth records for {} ({}-{})",
            table.len(),
            table.ref_id(),
            first.pos,
            last.pos
        );
    }

    // Single aligner run shared by every cutlen
    let aln = locator.locate(cfg.mapping_ref(), cfg.targets())?;
    if aln.hits().is_empty() {
        warn!("No target aligned to the mapping reference");
    } else if !aln.misses().is_empty() {
        info!(
            "{} targets without alignment will not be reported",
            aln.misses().len()
        );
    }
    info!("cutlen: {}, fixlen: {}", cfg.sweep(), cfg.fixlen());

    let pool = make_pool(cfg.threads())?;
    let par = SweepParams {
        fixlen: cfg.fixlen(),
        model: *cfg.model_params(),
        with_flanking: cfg.output_positions(),
    };

    let mut pos_wrt = if cfg.output_positions() {
        Some(PositionWriter::new(output_path(
            cfg.output_prefix(),
            "positions.csv",
        ))?)
    } else {
        None
    };

    let summaries = run_sweep(&pool, &table, aln.hits(), cfg.cutlens(), &par, |cutlen, rows| {
        match pos_wrt.as_mut() {
            Some(w) => w.write(cutlen, rows),
            None => Ok(()),
        }
    })?;
    if let Some(w) = pos_wrt.take() {
        w.finish()?
    }

    let sweep = aggregate(&summaries);
    write_summary_full(output_path(cfg.output_prefix(), "summary_full.csv"), &summaries)?;
    write_summary_cal(output_path(cfg.output_prefix(), "summary_cal.csv"), &sweep)?;
    info!(
        "Finished: {} summary rows for {} targets",
        summaries.len(),
        sweep.len()
    );
    Ok(())
}
