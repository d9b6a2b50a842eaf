use std::sync::Arc;

use crate::{
    depth::{DepthRecord, DepthTable},
    model::{BaselineModel, ModelMetrics},
    region::RegionSet,
    stat_funcs::{median, std_dev, trim_outliers},
    target_error::TargetError,
};

/// Observed vs. predicted depth at one position
#[derive(Debug, Clone)]
pub struct PositionResult {
    pub target: Arc<str>,
    pub flanking: bool,
    pub pos: usize,
    pub depth: f64,
    pub predicted: f64,
    pub deficit: f64,
    pub rate: f64,
}

/// Fractional depletion (predicted - observed) / predicted.  A zero
/// prediction gives NaN, which every downstream aggregate skips.
pub fn target_rate(depth: f64, predicted: f64) -> f64 {
    if predicted == 0.0 {
        f64::NAN
    } else {
        (predicted - depth) / predicted
    }
}

impl PositionResult {
    fn new(target: &Arc<str>, rec: &DepthRecord, predicted: f64, flanking: bool) -> Self {
        Self {
            target: target.clone(),
            flanking,
            pos: rec.pos,
            depth: rec.depth,
            predicted,
            deficit: predicted - rec.depth,
            rate: target_rate(rec.depth, predicted),
        }
    }
}

/// Median and sd of an outlier trimmed series
#[derive(Debug, Copy, Clone)]
pub struct Trimmed {
    pub median: f64,
    pub sd: f64,
}

impl Trimmed {
    fn of(v: &[f64]) -> Self {
        let t = trim_outliers(v);
        Self {
            median: median(&t),
            sd: std_dev(&t),
        }
    }
}

/// Summary for one target at one cutlen.  Plain fields are medians over
/// the masked region, `*_c` fields are from the outlier trimmed series.
#[derive(Debug, Clone)]
pub struct TargetSummary {
    pub target: Arc<str>,
    pub cutlen: usize,
    pub depth: f64,
    pub predicted: f64,
    pub deficit: f64,
    pub rate: f64,
    pub depth_c: Trimmed,
    pub predicted_c: Trimmed,
    pub deficit_c: Trimmed,
    pub rate_c: Trimmed,
    pub metrics: ModelMetrics,
}

pub struct RatioResult {
    pub positions: Vec<PositionResult>,
    pub summary: TargetSummary,
}

/// Predict depth over the masked region (and optionally the flanks) and
/// summarize the depletion.  Only masked positions enter the summary.
pub fn calc_ratios(
    model: &BaselineModel,
    table: &DepthTable,
    region: &RegionSet,
    cutlen: usize,
    with_flanking: bool,
) -> Result<RatioResult, TargetError> {
    let masked = region.masked(table);
    if masked.is_empty() {
        return Err(TargetError::EmptyMaskedRegion);
    }
    let target = region.target();
    let predict = |recs: &[DepthRecord], flanking: bool| -> Vec<PositionResult> {
        let pos: Vec<usize> = recs.iter().map(|r| r.pos).collect();
        recs.iter()
            .zip(model.predict(&pos))
            .map(|(r, p)| PositionResult::new(target, r, p, flanking))
            .collect()
    };
    let mut positions = predict(masked, false);

    let col = |f: fn(&PositionResult) -> f64| -> Vec<f64> { positions.iter().map(f).collect() };
    let depth = col(|p| p.depth);
    let predicted = col(|p| p.predicted);
    let deficit = col(|p| p.deficit);
    let rate = col(|p| p.rate);

    let summary = TargetSummary {
        target: target.clone(),
        cutlen,
        depth: median(&depth),
        predicted: median(&predicted),
        deficit: median(&deficit),
        rate: median(&rate),
        depth_c: Trimmed::of(&depth),
        predicted_c: Trimmed::of(&predicted),
        deficit_c: Trimmed::of(&deficit),
        rate_c: Trimmed::of(&rate),
        metrics: *model.metrics(),
    };
    let n_nan = rate.iter().filter(|x| x.is_nan()).count();
    if n_nan > 0 {
        debug!(
            "{}: {} positions with zero predicted depth (rate undefined)",
            target, n_nan
        );
    }

    if with_flanking {
        positions.extend(predict(&region.flanking(table), true));
    }
    Ok(RatioResult { positions, summary })
}
