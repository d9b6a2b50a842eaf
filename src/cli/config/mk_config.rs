use std::path::PathBuf;

use clap::ArgMatches;

use super::{super::CutlenSweep, Config};
use crate::model::{ModelParams, SvrParams};

fn get_path(m: &ArgMatches, id: &str) -> anyhow::Result<PathBuf> {
    m.try_get_one::<PathBuf>(id)?
        .cloned()
        .ok_or_else(|| anyhow!("Missing argument {}", id))
}

fn get_value<T: Clone + Send + Sync + 'static>(m: &ArgMatches, id: &str) -> anyhow::Result<T> {
    m.try_get_one::<T>(id)?
        .cloned()
        .ok_or_else(|| anyhow!("Missing argument {}", id))
}

fn check_positive(x: f64, name: &str) -> anyhow::Result<f64> {
    if x.is_finite() && x > 0.0 {
        Ok(x)
    } else {
        Err(anyhow!("{} must be positive (got {})", name, x))
    }
}

impl Config {
    pub fn from_matches(m: &ArgMatches) -> anyhow::Result<Self> {
        let mapping_ref = get_path(m, "mapping_ref")?;
        let targets = get_path(m, "targets")?;
        let depth_tab = get_path(m, "depth_tab")?;
        let blastn = get_path(m, "blastn")?;
        for p in [&mapping_ref, &targets, &depth_tab] {
            if !p.exists() {
                return Err(anyhow!("Input file {} not found", p.display()));
            }
        }

        let sweep = CutlenSweep::new(
            get_value(m, "cutlen")?,
            m.try_get_one::<usize>("cutlen_from")?.copied(),
            m.try_get_one::<usize>("cutlen_to")?.copied(),
            get_value(m, "cut_step")?,
        )?;
        let cutlens = sweep.values();
        debug!("cutlen values: {}", sweep);

        let fixlen: usize = get_value(m, "fixlen")?;
        if cutlens.iter().all(|&c| c <= fixlen) {
            warn!(
                "fixlen ({}) is not less than any cutlen - no flanking data will be available",
                fixlen
            );
        }

        let test_fraction: f64 = get_value(m, "test_fraction")?;
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(anyhow!(
                "test-fraction must be between 0 and 1 (got {})",
                test_fraction
            ));
        }
        let model_params = ModelParams {
            svr: SvrParams {
                c: check_positive(get_value(m, "svr_c")?, "svr-c")?,
                gamma: check_positive(get_value(m, "svr_gamma")?, "svr-gamma")?,
                epsilon: get_value::<f64>(m, "svr_epsilon")?.max(0.0),
                ..SvrParams::default()
            },
            test_fraction,
            seed: get_value(m, "seed")?,
        };

        let contig = m.get_one::<String>("contig").map(|s| Box::from(s.as_str()));
        let output_prefix = m
            .get_one::<String>("output_prefix")
            .map(|s| Box::from(s.as_str()))
            .ok_or_else(|| anyhow!("Missing output prefix"))?;

        Ok(Self {
            mapping_ref,
            targets,
            depth_tab,
            blastn,
            contig,
            output_prefix,
            sweep,
            cutlens,
            fixlen,
            threads: get_value(m, "threads")?,
            aligner_timeout: m.try_get_one::<u64>("aligner_timeout")?.copied(),
            model_params,
            output_positions: m.get_flag("positions"),
        })
    }

    #[cfg(test)]
    pub fn from_args<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let m = super::super::cli_model::cli_model().try_get_matches_from(args)?;
        Self::from_matches(&m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Inputs {
        _dir: tempfile::TempDir,
        files: [String; 3],
    }

    fn inputs() -> Inputs {
        let dir = tempfile::tempdir().unwrap();
        let files = ["ref.fa", "targets.fa", "depth.tsv"].map(|n| {
            let p = dir.path().join(n);
            fs::write(&p, "").unwrap();
            p.to_str().unwrap().to_owned()
        });
        Inputs { _dir: dir, files }
    }

    fn cfg(inp: &Inputs, extra: &[&str]) -> anyhow::Result<Config> {
        let mut args = vec![
            "rmrate",
            "-T",
            inp.files[0].as_str(),
            "-t",
            inp.files[1].as_str(),
            "-d",
            inp.files[2].as_str(),
        ];
        args.extend_from_slice(extra);
        Config::from_args(args)
    }

    #[test]
    fn defaults() {
        let inp = inputs();
        let c = cfg(&inp, &[]).unwrap();
        assert_eq!(c.cutlens(), &[5000]);
        assert_eq!(c.fixlen(), 0);
        assert_eq!(c.output_prefix(), "report");
        assert_eq!(c.threads(), 0);
        assert_eq!(c.contig(), None);
        assert!(c.aligner_timeout().is_none());
        assert!(!c.output_positions());
        assert_eq!(c.model_params().seed, 1);
        assert_eq!(c.model_params().svr.c, 50.0);
        assert_eq!(c.blastn().to_str(), Some("blastn"));
    }

    #[test]
    fn sweep_overrides_cutlen() {
        let inp = inputs();
        let c = cfg(
            &inp,
            &["-c", "10", "--cutlen-from", "100", "--cutlen-to", "200"],
        )
        .unwrap();
        assert_eq!(c.cutlens(), &[100, 150, 200]);
        assert_eq!(
            c.sweep(),
            &CutlenSweep::Range {
                from: 100,
                to: 200,
                step: 50
            }
        );
    }

    #[test]
    fn invalid_settings() {
        let inp = inputs();
        assert!(cfg(&inp, &["--cutlen-from", "300", "--cutlen-to", "200"]).is_err());
        assert!(cfg(&inp, &["--cutlen-from", "300"]).is_err());
        assert!(cfg(&inp, &["--cutlen-from", "1", "--cutlen-to", "2", "--cut-step", "0"]).is_err());
        assert!(cfg(&inp, &["-c", "0"]).is_err());
        assert!(cfg(&inp, &["--test-fraction", "1.5"]).is_err());
        assert!(cfg(&inp, &["--svr-gamma", "0"]).is_err());
    }

    #[test]
    fn missing_input_file() {
        let inp = inputs();
        let r = Config::from_args([
            "rmrate",
            "-T",
            inp.files[0].as_str(),
            "-t",
            "/nonexistent/targets.fa",
            "-d",
            inp.files[2].as_str(),
        ]);
        assert!(r.is_err());
    }
}
