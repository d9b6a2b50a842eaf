use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{depth::DepthRecord, target_error::TargetError};

mod metrics;
mod svr;

pub use metrics::ModelMetrics;
pub use svr::SvrParams;
use svr::Svr;

/// Fewest flanking points a model can be trained on (one for training and
/// one for the hold-out split)
pub const MIN_TRAINING_POINTS: usize = 2;

#[derive(Debug, Copy, Clone)]
pub struct ModelParams {
    pub svr: SvrParams,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            svr: SvrParams::default(),
            test_fraction: 0.25,
            seed: 1,
        }
    }
}

/// Expected depth as a function of position, learnt from the flanking
/// regions of one target
pub struct BaselineModel {
    svr: Svr,
    metrics: ModelMetrics,
}

fn split_xy(pts: &[DepthRecord]) -> (Vec<f64>, Vec<f64>) {
    pts.iter().map(|r| (r.pos as f64, r.depth)).unzip()
}

impl BaselineModel {
    /// Fit on all points, and separately on a seeded random split to get
    /// hold-out diagnostics
    pub fn train(pts: &[DepthRecord], par: &ModelParams) -> Result<Self, TargetError> {
        let n = pts.len();
        if n < MIN_TRAINING_POINTS {
            return Err(TargetError::InsufficientFlankingData {
                found: n,
                needed: MIN_TRAINING_POINTS,
            });
        }
        let (x, y) = split_xy(pts);
        let svr = Svr::fit(&x, &y, &par.svr)
            .ok_or_else(|| TargetError::ModelFit("empty training set".to_string()))?;
        let metrics = Self::validate(&x, &y, par)?;
        debug!(
            "Model trained on {} points ({} support vectors): R2 {:.4}, explained variance {:.4}, MAE {:.4}, median AE {:.4}, MAPE {:.4}",
            n,
            svr.n_sv(),
            metrics.r2,
            metrics.explained_var,
            metrics.mean_abs_err,
            metrics.median_abs_err,
            metrics.mean_abs_pct_err
        );
        Ok(Self { svr, metrics })
    }

    fn validate(x: &[f64], y: &[f64], par: &ModelParams) -> Result<ModelMetrics, TargetError> {
        let n = x.len();
        let n_test = ((par.test_fraction * n as f64).ceil() as usize).clamp(1, n - 1);
        let mut ix: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(par.seed);
        ix.shuffle(&mut rng);
        let (test, train) = ix.split_at(n_test);

        let pick = |v: &[f64], s: &[usize]| -> Vec<f64> { s.iter().map(|&i| v[i]).collect() };
        let svr = Svr::fit(&pick(x, train), &pick(y, train), &par.svr)
            .ok_or_else(|| TargetError::ModelFit("empty hold-out training set".to_string()))?;
        let obs = pick(y, test);
        let pred = svr.predict(&pick(x, test));
        Ok(ModelMetrics::new(&obs, &pred))
    }

    pub fn predict_one(&self, pos: usize) -> f64 {
        self.svr.predict_one(pos as f64)
    }

    pub fn predict(&self, pos: &[usize]) -> Vec<f64> {
        pos.iter().map(|&p| self.predict_one(p)).collect()
    }

    pub fn metrics(&self) -> &ModelMetrics {
        &self.metrics
    }
}
