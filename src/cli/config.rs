use std::path::PathBuf;

use super::CutlenSweep;
use crate::model::ModelParams;

mod getters;
mod mk_config;

pub struct Config {
    mapping_ref: PathBuf,
    targets: PathBuf,
    depth_tab: PathBuf,
    blastn: PathBuf,
    contig: Option<Box<str>>,
    output_prefix: Box<str>,
    sweep: CutlenSweep,
    cutlens: Vec<usize>,
    fixlen: usize,
    threads: usize,
    aligner_timeout: Option<u64>,
    model_params: ModelParams,
    output_positions: bool,
}
