//! Record filtering
//!
//! A filter decides whether a decoded record is shown. Two kinds of filters
//! can be combined: a level set (`--level`) and a condition (`--condition`).
//!
//! # Condition syntax
//!
//! ```text
//! .name                 value of a record field
//! "text", text          string constant
//! 42, 1.5               number
//! true, false           boolean
//! /pattern/             regular expression
//! a == b                equality of the text of both sides
//! a =~ /pattern/        regular expression match
//! !cond, a && b, a || b, (cond)
//! ```
//!
//! Operators are tried in the order `&&`, `||`, `==`, `=~`, splitting on the
//! first occurrence of the first one present.
//!
//! # Examples
//!
//! ```text
//! .level == "ERROR"
//! .topic == db && .msg =~ /timeout/
//! !(.hostname == "build-agent")
//! ```

pub mod condition;
pub mod error;
pub mod leaf;
pub mod level_set;

pub use condition::ConditionNode;
pub use error::FilterParseError;
pub use leaf::LeafNode;
pub use level_set::LevelSet;

use crate::parser::LogRecord;

/// Decides whether a record is shown
#[derive(Debug, Clone, Default)]
pub enum LogFilter {
    /// Shows everything
    #[default]
    All,
    Level(LevelSet),
    Condition(ConditionNode),
    /// Shows a record only if every inner filter does
    Multi(Vec<LogFilter>),
}

impl LogFilter {
    pub fn level(spec: &str) -> Result<Self, FilterParseError> {
        Ok(LogFilter::Level(spec.parse()?))
    }

    pub fn condition(condition: &str) -> Result<Self, FilterParseError> {
        Ok(LogFilter::Condition(ConditionNode::parse(condition)?))
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        match self {
            LogFilter::All => true,
            LogFilter::Level(set) => set.should_show(record.level, &record.topic, &record.scope),
            LogFilter::Condition(node) => node.evaluate(record),
            LogFilter::Multi(filters) => filters.iter().all(|filter| filter.matches(record)),
        }
    }

    /// Collapses an empty or single-element `Multi` into its cheapest equivalent.
    pub fn reduce(self) -> Self {
        match self {
            LogFilter::Multi(mut filters) => match filters.len() {
                0 => LogFilter::All,
                1 => filters.remove(0).reduce(),
                _ => LogFilter::Multi(filters),
            },
            other => other,
        }
    }
}

/// Accumulates filters that must all pass
#[derive(Debug, Clone, Default)]
pub struct MultiFilter {
    filters: Vec<LogFilter>,
}

impl MultiFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: LogFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn add(&mut self, filter: LogFilter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn build(self) -> LogFilter {
        LogFilter::Multi(self.filters).reduce()
    }
}

/// Builds the filter for the optional `--level` and `--condition` values.
pub fn build_filter(level: Option<&str>, condition: Option<&str>) -> Result<LogFilter, FilterParseError> {
    let mut filters = MultiFilter::new();
    if let Some(spec) = level.filter(|s| !s.trim().is_empty()) {
        log::info!("Adding log level filter at {spec}");
        filters.add(LogFilter::level(spec)?);
    }
    if let Some(condition) = condition.filter(|s| !s.trim().is_empty()) {
        log::info!("Adding condition filter: {condition}");
        filters.add(LogFilter::condition(condition)?);
    }
    Ok(filters.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn record(level: Level, message: &str) -> LogRecord {
        LogRecord {
            level,
            message: message.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_reduce() {
        assert!(matches!(LogFilter::Multi(vec![]).reduce(), LogFilter::All));
        assert!(matches!(
            LogFilter::Multi(vec![LogFilter::level("info").unwrap()]).reduce(),
            LogFilter::Level(_)
        ));
        assert!(matches!(
            LogFilter::Multi(vec![LogFilter::All, LogFilter::All]).reduce(),
            LogFilter::Multi(filters) if filters.len() == 2
        ));
        assert!(matches!(MultiFilter::new().build(), LogFilter::All));
    }

    #[test]
    fn test_multi_is_conjunction() {
        let filter = MultiFilter::new()
            .with(LogFilter::level("warn").unwrap())
            .with(LogFilter::condition(".msg =~ /disk/").unwrap())
            .build();

        assert!(filter.matches(&record(Level::Error, "disk full")));
        assert!(!filter.matches(&record(Level::Info, "disk full")));
        assert!(!filter.matches(&record(Level::Error, "out of memory")));
    }

    #[test]
    fn test_build_filter() {
        assert!(matches!(build_filter(None, None), Ok(LogFilter::All)));
        assert!(matches!(build_filter(Some(""), Some("  ")), Ok(LogFilter::All)));
        assert!(matches!(build_filter(Some("info"), None), Ok(LogFilter::Level(_))));
        assert!(matches!(
            build_filter(Some("info"), Some(".a == b")),
            Ok(LogFilter::Multi(_))
        ));
        assert!(matches!(
            build_filter(None, Some(".msg =~ nope")),
            Err(FilterParseError::InvalidOperandType { .. })
        ));
    }
}
