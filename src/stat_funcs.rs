//! Small numeric helpers over plain `f64` slices.
//!
//! NaN values are skipped by every function here, so a position with an
//! undefined rate never poisons an aggregate.

/// Two sided 90% normal quantile used for outlier trimming
pub const OUTLIER_Z: f64 = 1.645;

fn finite(v: &[f64]) -> impl Iterator<Item = f64> + '_ {
    v.iter().copied().filter(|x| !x.is_nan())
}

pub fn mean(v: &[f64]) -> f64 {
    let (n, s) = finite(v).fold((0usize, 0.0), |(n, s), x| (n + 1, s + x));
    if n == 0 {
        f64::NAN
    } else {
        s / n as f64
    }
}

/// Sample standard deviation (n - 1 denominator)
pub fn std_dev(v: &[f64]) -> f64 {
    let mu = mean(v);
    let (n, ss) = finite(v).fold((0usize, 0.0), |(n, ss), x| {
        let d = x - mu;
        (n + 1, ss + d * d)
    });
    if n < 2 {
        f64::NAN
    } else {
        (ss / (n - 1) as f64).sqrt()
    }
}

pub fn median(v: &[f64]) -> f64 {
    let mut w: Vec<f64> = finite(v).collect();
    let n = w.len();
    if n == 0 {
        return f64::NAN;
    }
    w.sort_unstable_by(|a, b| a.total_cmp(b));
    if n & 1 == 1 {
        w[n >> 1]
    } else {
        0.5 * (w[(n >> 1) - 1] + w[n >> 1])
    }
}

/// Drop values outside the open interval (mu - 1.645 sd, mu + 1.645 sd).
///
/// Input with fewer than 2 usable values or zero spread comes back unchanged.
/// NaN values are never retained once trimming takes place.
pub fn trim_outliers(v: &[f64]) -> Vec<f64> {
    let sd = std_dev(v);
    if sd.is_nan() || sd == 0.0 {
        return v.to_vec();
    }
    let mu = mean(v);
    let (lo, hi) = (mu - OUTLIER_Z * sd, mu + OUTLIER_Z * sd);
    v.iter().copied().filter(|&x| x > lo && x < hi).collect()
}

/// Median, mean and sample sd of one series
#[derive(Debug, Copy, Clone)]
pub struct Spread {
    pub median: f64,
    pub mean: f64,
    pub sd: f64,
}

impl Spread {
    pub fn of(v: &[f64]) -> Self {
        Self {
            median: median(v),
            mean: mean(v),
            sd: std_dev(v),
        }
    }
}
