use crate::cli::OutputMode;
use chrono::{DateTime, Local, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown timezone: '{0}'")]
pub struct UnknownTimezone(pub String);

/// The timezone timestamps are displayed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayZone {
    #[default]
    Utc,
    Local,
    Named(chrono_tz::Tz),
}

impl DisplayZone {
    pub fn is_utc(self) -> bool {
        matches!(self, DisplayZone::Utc)
    }

    /// Formats `time` in this zone with a `chrono` format string.
    pub fn format(self, time: DateTime<Utc>, format: &str) -> String {
        match self {
            DisplayZone::Utc => time.format(format).to_string(),
            DisplayZone::Local => time.with_timezone(&Local).format(format).to_string(),
            DisplayZone::Named(tz) => time.with_timezone(&tz).format(format).to_string(),
        }
    }
}

impl FromStr for DisplayZone {
    type Err = UnknownTimezone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "Z" | "z" => Ok(DisplayZone::Utc),
            name if name.eq_ignore_ascii_case("utc") => Ok(DisplayZone::Utc),
            name if name.eq_ignore_ascii_case("local") => Ok(DisplayZone::Local),
            name => name
                .parse::<chrono_tz::Tz>()
                .map(DisplayZone::Named)
                .map_err(|_| UnknownTimezone(name.to_string())),
        }
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayZone::Utc => f.write_str("UTC"),
            DisplayZone::Local => f.write_str("Local"),
            DisplayZone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Options for controlling how records are rendered
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub mode: OutputMode,
    pub zone: DisplayZone,
    pub use_colors: bool,
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn use_colors(mut self, value: bool) -> Self {
        self.use_colors = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_zones() {
        assert_eq!("UTC".parse::<DisplayZone>(), Ok(DisplayZone::Utc));
        assert_eq!("utc".parse::<DisplayZone>(), Ok(DisplayZone::Utc));
        assert_eq!("local".parse::<DisplayZone>(), Ok(DisplayZone::Local));
        assert_eq!(
            "Europe/Paris".parse::<DisplayZone>(),
            Ok(DisplayZone::Named(chrono_tz::Europe::Paris))
        );
        assert_eq!(
            "Mars/Olympus".parse::<DisplayZone>(),
            Err(UnknownTimezone("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn test_format_in_named_zone() {
        let time = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let zone = DisplayZone::Named(chrono_tz::Asia::Tokyo);
        assert_eq!(zone.format(time, "%H:%M%:z"), "21:00+09:00");
        assert_eq!(DisplayZone::Utc.format(time, "%H:%M"), "12:00");
    }
}
