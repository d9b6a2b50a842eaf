use std::path::PathBuf;

use clap::{command, value_parser, Arg, ArgAction, Command};

use crate::log_utils::LogLevel;

pub(super) fn cli_model() -> Command {
    command!()
    .arg(
        Arg::new("cutlen")
            .short('c')
            .long("cutlen")
            .default_value("5000")
            .value_parser(value_parser!(usize))
            .value_name("INT")
            .help("Flank length on each side of a target used to train the depth model"),
    )
    .arg(
        Arg::new("cutlen_from")
            .long("cutlen-from")
            .value_parser(value_parser!(usize))
            .value_name("INT")
            .help("Start of a cutlen sweep (overrides --cutlen)"),
    )
    .arg(
        Arg::new("cutlen_to")
            .long("cutlen-to")
            .value_parser(value_parser!(usize))
            .value_name("INT")
            .help("End of a cutlen sweep (inclusive)"),
    )
    .arg(
        Arg::new("cut_step")
            .long("cut-step")
            .default_value("50")
            .value_parser(value_parser!(usize))
            .value_name("INT")
            .help("Step between cutlen values in a sweep"),
    )
    .arg(
        Arg::new("fixlen")
            .short('f')
            .long("fixlen")
            .default_value("0")
            .value_parser(value_parser!(usize))
            .value_name("INT")
            .help("Positions next to the target excluded from the flanks"),
    )
    .arg(
        Arg::new("svr_c")
            .long("svr-c")
            .hide(true)
            .default_value("50")
            .value_parser(value_parser!(f64))
            .value_name("FLOAT")
            .help("SVR penalty parameter"),
    )
    .arg(
        Arg::new("svr_gamma")
            .long("svr-gamma")
            .hide(true)
            .default_value("0.1")
            .value_parser(value_parser!(f64))
            .value_name("FLOAT")
            .help("SVR RBF kernel coefficient"),
    )
    .arg(
        Arg::new("svr_epsilon")
            .long("svr-epsilon")
            .hide(true)
            .default_value("0.1")
            .value_parser(value_parser!(f64))
            .value_name("FLOAT")
            .help("SVR epsilon tube width"),
    )
    .arg(
        Arg::new("test_fraction")
            .long("test-fraction")
            .hide(true)
            .default_value("0.25")
            .value_parser(value_parser!(f64))
            .value_name("FRAC")
            .help("Fraction of flanking points held out for model validation"),
    )
    .next_help_heading("Operation")
    .arg(
        Arg::new("contig")
            .short('r')
            .long("contig")
            .value_parser(value_parser!(String))
            .value_name("NAME")
            .help("Reference sequence to use from the depth table"),
    )
    .arg(
        Arg::new("threads")
            .long("threads")
            .default_value("0")
            .value_parser(value_parser!(usize))
            .value_name("INT")
            .help("Number of worker threads (0 = all available cores)"),
    )
    .arg(
        Arg::new("seed")
            .long("seed")
            .default_value("1")
            .value_parser(value_parser!(u64))
            .value_name("INT")
            .help("Seed for the model validation split"),
    )
    .arg(
        Arg::new("blastn")
            .long("blastn")
            .default_value("blastn")
            .value_parser(value_parser!(PathBuf))
            .value_name("PATH")
            .help("blastn executable"),
    )
    .arg(
        Arg::new("aligner_timeout")
            .long("aligner-timeout")
            .value_parser(value_parser!(u64))
            .value_name("SECS")
            .help("Abort if the aligner runs for longer than this"),
    )
    .next_help_heading("Input/Output")
    .arg(
        Arg::new("mapping_ref")
            .short('T')
            .long("mapping-ref")
            .value_parser(value_parser!(PathBuf))
            .required(true)
            .value_name("FASTA File")
            .help("Reference FASTA used for read mapping"),
    )
    .arg(
        Arg::new("targets")
            .short('t')
            .long("targets")
            .value_parser(value_parser!(PathBuf))
            .required(true)
            .value_name("FASTA File")
            .help("FASTA file with target sequences"),
    )
    .arg(
        Arg::new("depth_tab")
            .short('d')
            .long("depth-tab")
            .value_parser(value_parser!(PathBuf))
            .required(true)
            .value_name("Depth File")
            .help("Per position depth table (reference, position, depth)"),
    )
    .arg(
        Arg::new("output_prefix")
            .short('o')
            .long("out")
            .default_value("report")
            .value_parser(value_parser!(String))
            .value_name("PREFIX")
            .help("Output prefix"),
    )
    .arg(
        Arg::new("positions")
            .long("positions")
            .action(ArgAction::SetTrue)
            .help("Also write per position results"),
    )
    .arg(
        Arg::new("loglevel")
            .short('l')
            .long("loglevel")
            .value_name("LOGLEVEL")
            .value_parser(value_parser!(LogLevel))
            .ignore_case(true)
            .default_value("info")
            .help("Set log level"),
    )
    .arg(
        Arg::new("timestamp")
            .long("timestamp")
            .action(ArgAction::SetTrue)
            .help("Prepend time stamps to log messages"),
    )
}
