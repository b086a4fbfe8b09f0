use super::error::FilterParseError;
use super::leaf::LeafNode;
use crate::parser::LogRecord;
use regex::Regex;

/// A boolean expression over the fields of a record
#[derive(Debug, Clone)]
pub enum ConditionNode {
    And(Box<ConditionNode>, Box<ConditionNode>),
    Or(Box<ConditionNode>, Box<ConditionNode>),
    Not(Box<ConditionNode>),
    /// `left == right`, comparing canonical text
    Equals(LeafNode, LeafNode),
    /// `left =~ /pattern/`
    Match(LeafNode, Regex),
}

/// Binary operators, in the order they are tried.
///
/// The first operator found anywhere in the expression wins, so `&&` binds
/// looser than `||`, and both bind looser than the comparisons.
const OPERATORS: [Operator; 4] = [
    Operator::And,
    Operator::Or,
    Operator::Equals,
    Operator::Match,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    And,
    Or,
    Equals,
    Match,
}

impl Operator {
    fn symbol(self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Equals => "==",
            Operator::Match => "=~",
        }
    }

    fn build(self, left: &str, right: &str) -> Result<ConditionNode, FilterParseError> {
        match self {
            Operator::And => Ok(ConditionNode::And(
                Box::new(ConditionNode::parse(left)?),
                Box::new(ConditionNode::parse(right)?),
            )),
            Operator::Or => Ok(ConditionNode::Or(
                Box::new(ConditionNode::parse(left)?),
                Box::new(ConditionNode::parse(right)?),
            )),
            Operator::Equals => Ok(ConditionNode::Equals(
                LeafNode::parse(left.trim()),
                LeafNode::parse(right.trim()),
            )),
            Operator::Match => match LeafNode::parse(right.trim()) {
                LeafNode::Regex(regex) => Ok(ConditionNode::Match(LeafNode::parse(left.trim()), regex)),
                other => Err(FilterParseError::InvalidOperandType {
                    operator: self.symbol(),
                    operand: other.to_string(),
                }),
            },
        }
    }
}

impl ConditionNode {
    /// Parses a condition such as `.level == "ERROR" && .msg =~ /timeout/`.
    ///
    /// Operators are split on their first occurrence without regard to
    /// parentheses or quoting, so an operator inside a string or regex literal
    /// still splits the expression.
    pub fn parse(condition: &str) -> Result<Self, FilterParseError> {
        let condition = condition.trim();

        if let Some(inner) = strip_outer_parens(condition) {
            return Self::parse(inner);
        }

        if let Some(rest) = condition.strip_prefix('!') {
            return Ok(ConditionNode::Not(Box::new(Self::parse(rest)?)));
        }

        for operator in OPERATORS {
            if let Some((left, right)) = condition.split_once(operator.symbol()) {
                return operator.build(left, right);
            }
        }

        Err(FilterParseError::MalformedExpression(condition.to_string()))
    }

    pub fn evaluate(&self, record: &LogRecord) -> bool {
        match self {
            ConditionNode::And(left, right) => left.evaluate(record) && right.evaluate(record),
            ConditionNode::Or(left, right) => left.evaluate(record) || right.evaluate(record),
            ConditionNode::Not(node) => !node.evaluate(record),
            ConditionNode::Equals(left, right) => left.value(record) == right.value(record),
            ConditionNode::Match(left, regex) => regex.is_match(&left.value(record)),
        }
    }
}

/// Returns the inside of `s` when the first `(` is closed by the last `)`.
fn strip_outer_parens(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return None,
            ')' => depth -= 1,
            _ => {}
        }
    }
    Some(inner)
}
