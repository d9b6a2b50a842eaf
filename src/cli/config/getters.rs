use std::{path::Path, time::Duration};

use super::{super::CutlenSweep, Config};
use crate::model::ModelParams;

impl Config {
    pub fn mapping_ref(&self) -> &Path {
        &self.mapping_ref
    }

    pub fn targets(&self) -> &Path {
        &self.targets
    }

    pub fn depth_tab(&self) -> &Path {
        &self.depth_tab
    }

    pub fn blastn(&self) -> &Path {
        &self.blastn
    }

    pub fn contig(&self) -> Option<&str> {
        self.contig.as_ref().map(|x| x as &str)
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    pub fn sweep(&self) -> &CutlenSweep {
        &self.sweep
    }

    pub fn cutlens(&self) -> &[usize] {
        &self.cutlens
    }

    pub fn fixlen(&self) -> usize {
        self.fixlen
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn aligner_timeout(&self) -> Option<Duration> {
        self.aligner_timeout.map(Duration::from_secs)
    }

    pub fn model_params(&self) -> &ModelParams {
        &self.model_params
    }

    pub fn output_positions(&self) -> bool {
        self.output_positions
    }
}
