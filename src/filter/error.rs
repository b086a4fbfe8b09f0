use thiserror::Error;

/// Errors that can occur when building a filter.
///
/// All of them are raised before the first line is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("Malformed condition: '{0}'")]
    MalformedExpression(String),

    #[error("Operator '{operator}' expects a /regex/ on its right side, got: '{operand}'")]
    InvalidOperandType {
        operator: &'static str,
        operand: String,
    },

    #[error("Unknown log level: '{0}'. Valid levels are: trace, debug, info, warn, error, fatal")]
    InvalidLevel(String),

    #[error("Invalid level set: '{0}'")]
    InvalidLevelSet(String),
}
