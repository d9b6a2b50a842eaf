#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

mod align;
mod cli;
mod depth;
mod fasta;
mod log_utils;
mod model;
mod process;
mod ratio;
mod region;
mod stat_funcs;
mod target_error;

fn main() -> anyhow::Result<()> {
    let cfg = cli::handle_cli()?;
    process::process_data(cfg)
}
