use colored::Color;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity of a log record, ordered from least to most severe.
///
/// Numeric values follow the Bunyan convention (trace=10 ... fatal=60).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown log level: '{0}'. Valid levels are: trace, debug, info, warn, error, fatal")]
pub struct UnknownLevel(pub String);

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Maps a Bunyan numeric severity onto the nearest level at or below it.
    pub fn from_number(value: i64) -> Self {
        match value {
            i64::MIN..=19 => Level::Trace,
            20..=29 => Level::Debug,
            30..=39 => Level::Info,
            40..=49 => Level::Warn,
            50..=59 => Level::Error,
            _ => Level::Fatal,
        }
    }

    pub fn as_number(self) -> i64 {
        match self {
            Level::Trace => 10,
            Level::Debug => 20,
            Level::Info => 30,
            Level::Warn => 40,
            Level::Error => 50,
            Level::Fatal => 60,
        }
    }

    /// Upper-case name, as shown in rendered output and used by `.level` lookups.
    pub fn name(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Name left-padded to a fixed width of 5 columns.
    pub fn padded_label(self) -> String {
        format!("{:>5}", self.name())
    }

    pub fn color(self) -> Color {
        match self {
            Level::Trace => Color::BrightBlack,
            Level::Debug => Color::Yellow,
            Level::Info => Color::Green,
            Level::Warn => Color::Magenta,
            Level::Error | Level::Fatal => Color::Red,
        }
    }
}

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
