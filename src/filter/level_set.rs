use super::error::FilterParseError;
use crate::level::Level;
use std::collections::HashMap;
use std::str::FromStr;

/// Visibility thresholds, optionally narrowed to a topic or a topic/scope pair.
///
/// # Syntax
///
/// ```text
/// info                        show info and above
/// warn;debug:db               warn and above, but debug and above for topic "db"
/// error;trace:http/handshake  trace and above for topic "http", scope "handshake"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSet {
    default: Level,
    topics: HashMap<String, Level>,
    scopes: HashMap<(String, String), Level>,
}

impl Default for LevelSet {
    fn default() -> Self {
        Self {
            default: Level::Trace,
            topics: HashMap::new(),
            scopes: HashMap::new(),
        }
    }
}

impl LevelSet {
    pub fn new(default: Level) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>, level: Level) -> Self {
        self.topics.insert(topic.into(), level);
        self
    }

    pub fn with_scope(mut self, topic: impl Into<String>, scope: impl Into<String>, level: Level) -> Self {
        self.scopes.insert((topic.into(), scope.into()), level);
        self
    }

    /// The most specific threshold that applies to `topic`/`scope`.
    pub fn threshold(&self, topic: &str, scope: &str) -> Level {
        self.scopes
            .get(&(topic.to_string(), scope.to_string()))
            .or_else(|| self.topics.get(topic))
            .copied()
            .unwrap_or(self.default)
    }

    pub fn should_show(&self, level: Level, topic: &str, scope: &str) -> bool {
        level >= self.threshold(topic, scope)
    }
}

impl FromStr for LevelSet {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(FilterParseError::InvalidLevelSet(s.to_string()));
        }

        let mut set = LevelSet::default();
        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (level, target) = match entry.split_once(':') {
                Some((level, target)) => (level.trim(), Some(target.trim())),
                None => (entry, None),
            };
            let level: Level = level
                .parse()
                .map_err(|_| FilterParseError::InvalidLevel(level.to_string()))?;

            match target {
                None => set.default = level,
                Some("") => return Err(FilterParseError::InvalidLevelSet(entry.to_string())),
                Some(target) => match target.split_once('/') {
                    Some((topic, scope)) if !topic.is_empty() && !scope.is_empty() => {
                        set.scopes.insert((topic.to_string(), scope.to_string()), level);
                    }
                    Some(_) => return Err(FilterParseError::InvalidLevelSet(entry.to_string())),
                    None => {
                        set.topics.insert(target.to_string(), level);
                    }
                },
            }
        }

        Ok(set)
    }
}
