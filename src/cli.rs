mod cli_model;
mod config;
mod cutlen;

pub use config::Config;
pub use cutlen::CutlenSweep;

pub fn handle_cli() -> anyhow::Result<Config> {
    let m = cli_model::cli_model().get_matches();
    super::log_utils::init_log(&m)?;
    Config::from_matches(&m)
}
