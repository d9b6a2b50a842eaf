use clap::{builder::PossibleValue, ArgMatches, ValueEnum};
use stderrlog::Timestamp;

/// Minimum level of messages written to stderr.  `None` silences logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    None,
}

const LEVELS: [(LogLevel, &str); 6] = [
    (LogLevel::Error, "error"),
    (LogLevel::Warn, "warn"),
    (LogLevel::Info, "info"),
    (LogLevel::Debug, "debug"),
    (LogLevel::Trace, "trace"),
    (LogLevel::None, "none"),
];

impl ValueEnum for LogLevel {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Error,
            Self::Warn,
            Self::Info,
            Self::Debug,
            Self::Trace,
            Self::None,
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        LEVELS
            .iter()
            .find(|(l, _)| l == self)
            .map(|(_, s)| PossibleValue::new(*s))
    }
}

impl LogLevel {
    /// stderrlog verbosity (0 = errors only)
    fn verbosity(self) -> usize {
        match self {
            Self::Error | Self::None => 0,
            Self::Warn => 1,
            Self::Info => 2,
            Self::Debug => 3,
            Self::Trace => 4,
        }
    }
}

/// Initialize logging from command line arguments
pub fn init_log(m: &ArgMatches) -> anyhow::Result<()> {
    let level = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel::Info);
    let ts = if m.get_flag("timestamp") {
        Timestamp::Second
    } else {
        Timestamp::Off
    };

    stderrlog::new()
        .quiet(level == LogLevel::None)
        .verbosity(level.verbosity())
        .timestamp(ts)
        .init()?;
    Ok(())
}
