use std::fmt::Display;
use thiserror::Error;

/// The grammar construct that was being parsed when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Value,
    Object,
    Member,
    Array,
    String,
    Escape,
    Number,
    Literal,
    EndOfInput,
}

/// A syntax error: the input is not a JSON document.
///
/// `offset` is a byte index into the input. `line` (1-based) and `column`
/// (0-based, counted in characters) point at the same place for humans.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg} at line {line}, column {column} (while parsing {rule})")]
pub struct ParseError {
    pub msg: String,
    pub rule: Rule,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(msg: String, rule: Rule, offset: usize, line: usize, column: usize) -> Self {
        Self {
            msg,
            rule,
            offset,
            line,
            column,
        }
    }
}

/// Outcome of a failed grammar rule.
///
/// A `Mismatch` lets the caller backtrack and try another alternative; the
/// details live in the scanner's furthest-failure record. An `Abort` ends
/// the whole parse with the given error.
#[derive(Debug)]
pub(crate) enum Failure {
    Mismatch,
    Abort(ParseError),
}

pub(crate) type RuleResult<T> = Result<T, Failure>;

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Value => f.write_str("value"),
            Rule::Object => f.write_str("object"),
            Rule::Member => f.write_str("object member"),
            Rule::Array => f.write_str("array"),
            Rule::String => f.write_str("string"),
            Rule::Escape => f.write_str("escape sequence"),
            Rule::Number => f.write_str("number"),
            Rule::Literal => f.write_str("literal"),
            Rule::EndOfInput => f.write_str("end of input"),
        }
    }
}
