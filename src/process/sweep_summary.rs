use std::{collections::BTreeMap, sync::Arc};

use crate::{ratio::TargetSummary, stat_funcs::Spread};

/// target_rate statistics for one target across all cutlen values tried
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub target: Arc<str>,
    pub n: usize,
    pub rate_c: Spread,
    pub rate: Spread,
}

/// Group per-cutlen summaries by target (sorted by name) and take the
/// median/mean/sd of the raw and trimmed rates
pub fn aggregate(summaries: &[TargetSummary]) -> Vec<SweepSummary> {
    let mut groups: BTreeMap<&str, (&Arc<str>, Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for s in summaries.iter() {
        let e = groups
            .entry(&*s.target)
            .or_insert_with(|| (&s.target, Vec::new(), Vec::new()));
        e.1.push(s.rate_c.median);
        e.2.push(s.rate);
    }
    groups
        .into_values()
        .map(|(target, rate_c, rate)| SweepSummary {
            target: target.clone(),
            n: rate.len(),
            rate_c: Spread::of(&rate_c),
            rate: Spread::of(&rate),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ModelMetrics, ratio::Trimmed};
    use assert_approx_eq::assert_approx_eq;

    fn summary(target: &str, cutlen: usize, rate: f64, rate_c: f64) -> TargetSummary {
        let t = |median| Trimmed { median, sd: 99.0 };
        TargetSummary {
            target: Arc::from(target),
            cutlen,
            depth: 10.0,
            predicted: 40.0,
            deficit: 30.0,
            rate,
            depth_c: t(10.0),
            predicted_c: t(40.0),
            deficit_c: t(30.0),
            rate_c: t(rate_c),
            metrics: ModelMetrics {
                r2: 1.0,
                explained_var: 1.0,
                mean_abs_err: 0.0,
                median_abs_err: 0.0,
                mean_abs_pct_err: 0.0,
            },
        }
    }

    #[test]
    fn grouped_by_target_in_name_order() {
        let v = vec![
            summary("T2", 100, 0.5, 0.4),
            summary("T1", 100, 0.1, 0.2),
            summary("T2", 200, 0.7, 0.6),
            summary("T1", 200, 0.3, 0.4),
            summary("T1", 300, 0.8, 0.9),
        ];
        let agg = aggregate(&v);
        assert_eq!(agg.len(), 2);
        assert_eq!(&*agg[0].target, "T1");
        assert_eq!(agg[0].n, 3);
        assert_eq!(&*agg[1].target, "T2");
        assert_eq!(agg[1].n, 2);

        // Trimmed medians, not their sd or the raw rates
        assert_approx_eq!(agg[0].rate_c.median, 0.4);
        assert_approx_eq!(agg[0].rate_c.mean, 0.5);
        assert_approx_eq!(agg[0].rate_c.sd, 0.360555127546399);
        assert_approx_eq!(agg[0].rate.median, 0.3);
        assert_approx_eq!(agg[0].rate.mean, 0.4);
        assert_approx_eq!(agg[1].rate_c.median, 0.5);
        assert_approx_eq!(agg[1].rate_c.sd, 0.141421356237310);
    }
}
