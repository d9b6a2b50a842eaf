use std::panic::{self, AssertUnwindSafe};

use super::SweepParams;
use crate::{
    align::AlignmentHit,
    depth::DepthTable,
    model::BaselineModel,
    ratio::{calc_ratios, RatioResult},
    region::RegionSet,
    target_error::TargetError,
};

fn analyze_target(
    table: &DepthTable,
    hit: &AlignmentHit,
    cutlen: usize,
    par: &SweepParams,
) -> Result<RatioResult, TargetError> {
    let region = RegionSet::extract(table, hit, cutlen, par.fixlen);
    if region.n_masked() == 0 {
        return Err(TargetError::EmptyMaskedRegion);
    }
    let model = BaselineModel::train(&region.flanking(table), &par.model)?;
    calc_ratios(&model, table, &region, cutlen, par.with_flanking)
}

/// Run one target at one cutlen.  Any failure, including a panic, is logged
/// and turned into no contribution.
pub(super) fn process_target(
    table: &DepthTable,
    hit: &AlignmentHit,
    cutlen: usize,
    par: &SweepParams,
) -> Option<RatioResult> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        analyze_target(table, hit, cutlen, par)
    })) {
        Ok(Ok(res)) => Some(res),
        Ok(Err(e)) => {
            warn!(
                "Skipping target {} at cutlen {}: {}",
                hit.target(),
                cutlen,
                e
            );
            None
        }
        Err(_) => {
            error!(
                "Processing of target {} at cutlen {} panicked - target skipped",
                hit.target(),
                cutlen
            );
            None
        }
    }
}
