use crate::stat_funcs::{mean, median};

/// Hold-out regression diagnostics
#[derive(Debug, Copy, Clone)]
pub struct ModelMetrics {
    pub r2: f64,
    pub explained_var: f64,
    pub mean_abs_err: f64,
    pub median_abs_err: f64,
    pub mean_abs_pct_err: f64,
}

impl ModelMetrics {
    pub fn new(obs: &[f64], pred: &[f64]) -> Self {
        assert_eq!(obs.len(), pred.len(), "Observed/predicted length mismatch");
        let abs_err: Vec<f64> = obs.iter().zip(pred).map(|(y, p)| (y - p).abs()).collect();
        let pct_err: Vec<f64> = obs
            .iter()
            .zip(abs_err.iter())
            .map(|(y, e)| e / y.abs().max(f64::EPSILON))
            .collect();
        Self {
            r2: r2_score(obs, pred),
            explained_var: explained_variance(obs, pred),
            mean_abs_err: mean(&abs_err),
            median_abs_err: median(&abs_err),
            mean_abs_pct_err: mean(&pct_err),
        }
    }
}

// Score for a zero variance target: perfect prediction scores 1, anything else 0
fn ratio_score(num: f64, den: f64, n: usize) -> f64 {
    if n < 2 {
        f64::NAN
    } else if den == 0.0 {
        if num == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - num / den
    }
}

fn sum_sq_dev(v: &[f64]) -> f64 {
    let mu = mean(v);
    v.iter().map(|x| (x - mu) * (x - mu)).sum()
}

pub fn r2_score(obs: &[f64], pred: &[f64]) -> f64 {
    let ss_res: f64 = obs.iter().zip(pred).map(|(y, p)| (y - p) * (y - p)).sum();
    ratio_score(ss_res, sum_sq_dev(obs), obs.len())
}

pub fn explained_variance(obs: &[f64], pred: &[f64]) -> f64 {
    let resid: Vec<f64> = obs.iter().zip(pred).map(|(y, p)| y - p).collect();
    ratio_score(sum_sq_dev(&resid), sum_sq_dev(obs), obs.len())
}
