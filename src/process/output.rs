use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Context;
use csv::{Writer, WriterBuilder};

use super::sweep_summary::SweepSummary;
use crate::ratio::{PositionResult, TargetSummary};

const SUMMARY_FULL_HEADER: [&str; 19] = [
    "target_name",
    "cutlen",
    "depth",
    "predict_depth",
    "DEL_depth",
    "target_rate",
    "depth_c",
    "depth_c_std",
    "predict_depth_c",
    "predict_depth_c_std",
    "DEL_depth_c",
    "DEL_depth_c_std",
    "target_rate_c",
    "target_rate_c_std",
    "ML_median_abs_er",
    "ML_mean_abs_er",
    "ML_R2",
    "ML_explained_var",
    "ML_mean_abs_pct_er",
];

const SUMMARY_CAL_HEADER: [&str; 7] = [
    "target_name",
    "target_rate_c_median",
    "target_rate_c_mean",
    "target_rate_c_std",
    "target_rate_median",
    "target_rate_mean",
    "target_rate_std",
];

const POSITIONS_HEADER: [&str; 7] = [
    "target_name",
    "cutlen",
    "position",
    "depth",
    "predict_depth",
    "DEL_depth",
    "target_rate",
];

/// CSV field for a float; undefined values are left empty
fn fld(x: f64) -> String {
    if x.is_nan() {
        String::new()
    } else {
        x.to_string()
    }
}

pub(super) fn output_path(prefix: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}_{}", prefix, suffix))
}

fn create<P: AsRef<Path>>(path: P, header: &[&str]) -> anyhow::Result<Writer<File>> {
    let path = path.as_ref();
    let mut wrt = WriterBuilder::default()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Could not open output file {}", path.display()))?;
    wrt.write_record(header)?;
    Ok(wrt)
}

fn summary_record(s: &TargetSummary) -> Vec<String> {
    let m = &s.metrics;
    let mut v = vec![s.target.to_string(), s.cutlen.to_string()];
    v.extend(
        [
            s.depth,
            s.predicted,
            s.deficit,
            s.rate,
            s.depth_c.median,
            s.depth_c.sd,
            s.predicted_c.median,
            s.predicted_c.sd,
            s.deficit_c.median,
            s.deficit_c.sd,
            s.rate_c.median,
            s.rate_c.sd,
            m.median_abs_err,
            m.mean_abs_err,
            m.r2,
            m.explained_var,
            m.mean_abs_pct_err,
        ]
        .into_iter()
        .map(fld),
    );
    v
}

pub(super) fn write_summary_full<P: AsRef<Path>>(
    path: P,
    summaries: &[TargetSummary],
) -> anyhow::Result<()> {
    let mut wrt = create(&path, &SUMMARY_FULL_HEADER)?;
    for s in summaries.iter() {
        wrt.write_record(summary_record(s))?;
    }
    wrt.flush()?;
    debug!(
        "Wrote {} rows to {}",
        summaries.len(),
        path.as_ref().display()
    );
    Ok(())
}

pub(super) fn write_summary_cal<P: AsRef<Path>>(
    path: P,
    sweep: &[SweepSummary],
) -> anyhow::Result<()> {
    let mut wrt = create(&path, &SUMMARY_CAL_HEADER)?;
    for s in sweep.iter() {
        let mut v = vec![s.target.to_string()];
        v.extend(
            [
                s.rate_c.median,
                s.rate_c.mean,
                s.rate_c.sd,
                s.rate.median,
                s.rate.mean,
                s.rate.sd,
            ]
            .into_iter()
            .map(fld),
        );
        wrt.write_record(v)?;
    }
    wrt.flush()?;
    debug!("Wrote {} rows to {}", sweep.len(), path.as_ref().display());
    Ok(())
}

/// Per position output, written incrementally after each cutlen
pub(super) struct PositionWriter {
    wrt: Writer<File>,
}

impl PositionWriter {
    pub(super) fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let wrt = create(path, &POSITIONS_HEADER)?;
        Ok(Self { wrt })
    }

    pub(super) fn write(&mut self, cutlen: usize, rows: &[PositionResult]) -> anyhow::Result<()> {
        for p in rows.iter() {
            let name = if p.flanking {
                format!("flanking_{}", p.target)
            } else {
                p.target.to_string()
            };
            self.wrt.write_record([
                name,
                cutlen.to_string(),
                p.pos.to_string(),
                fld(p.depth),
                fld(p.predicted),
                fld(p.deficit),
                fld(p.rate),
            ])?;
        }
        Ok(())
    }

    pub(super) fn finish(mut self) -> anyhow::Result<()> {
        self.wrt.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat_funcs::Spread;
    use std::{fs, sync::Arc};

    #[test]
    fn nan_fields_are_empty() {
        assert_eq!(fld(f64::NAN), "");
        assert_eq!(fld(0.25), "0.25");
        assert_eq!(fld(-3.0), "-3");
    }

    fn spread(x: f64) -> Spread {
        Spread {
            median: x,
            mean: x,
            sd: f64::NAN,
        }
    }

    #[test]
    fn target_names_with_separators_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cal.csv");
        let sweep = vec![
            SweepSummary {
                target: Arc::from("geneA,v2"),
                n: 1,
                rate_c: spread(0.5),
                rate: spread(0.25),
            },
            SweepSummary {
                target: Arc::from("say \"hi\""),
                n: 1,
                rate_c: spread(0.1),
                rate: spread(0.2),
            },
        ];
        write_summary_cal(&path, &sweep).unwrap();

        let txt = fs::read_to_string(&path).unwrap();
        assert!(txt.contains("\"geneA,v2\",0.5,0.5,,0.25,0.25,"));

        let mut rdr = csv::ReaderBuilder::default()
            .has_headers(true)
            .from_path(&path)
            .unwrap();
        assert_eq!(rdr.headers().unwrap().len(), SUMMARY_CAL_HEADER.len());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        for r in rows.iter() {
            assert_eq!(r.len(), 7);
        }
        assert_eq!(&rows[0][0], "geneA,v2");
        assert_eq!(&rows[1][0], "say \"hi\"");
        assert_eq!(&rows[1][4], "0.2");
    }

    #[test]
    fn flanking_rows_keep_column_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.csv");
        let target: Arc<str> = Arc::from("T,1");
        let rows: Vec<PositionResult> = [false, true]
            .into_iter()
            .map(|flanking| PositionResult {
                target: target.clone(),
                flanking,
                pos: 10,
                depth: 0.0,
                predicted: 0.0,
                deficit: 0.0,
                rate: f64::NAN,
            })
            .collect();
        let mut w = PositionWriter::new(&path).unwrap();
        w.write(200, &rows).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let recs: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(recs.len(), 2);
        assert_eq!(&recs[0][0], "T,1");
        assert_eq!(&recs[1][0], "flanking_T,1");
        assert_eq!(recs[1].len(), POSITIONS_HEADER.len());
        assert_eq!(&recs[1][6], "");
    }
}
