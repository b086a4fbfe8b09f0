use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;

/// How records are written out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// `[date-time] LEVEL: name/pid on host: message (fields)` plus indented blobs
    #[default]
    Long,
    /// `time LEVEL name: message (fields)` plus indented blobs
    Short,
    /// `LEVEL - message`
    Simple,
    /// The input object, pretty-printed
    Json,
    /// The input object as a single compact line
    Bunyan,
}

impl OutputMode {
    pub fn is_json(self) -> bool {
        matches!(self, OutputMode::Json | OutputMode::Bunyan)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputMode::Long => "long",
            OutputMode::Short => "short",
            OutputMode::Simple => "simple",
            OutputMode::Json => "json",
            OutputMode::Bunyan => "bunyan",
        };
        f.write_str(name)
    }
}
