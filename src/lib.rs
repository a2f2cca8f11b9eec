//! A JSON parser that follows the json.org grammar rule by rule.
//!
//! Numbers keep their syntactic kind ([`Value::Int`] vs [`Value::Float`]) and,
//! unlike standard JSON, may carry a leading `+`. Use [`parse_with`] and
//! [`ParseOptions::strict`] to turn that off.
//!
//! ```
//! use json_grammar::{parse, Value};
//!
//! let value = parse(r#"{ "id": +7, "scale": 1e1 }"#).unwrap();
//! assert_eq!(value.get("id"), Some(&Value::Int(7)));
//! assert_eq!(value.get("scale"), Some(&Value::Float(10.0)));
//! ```
mod data;
mod errors;
mod options;
mod parser;
mod scanner;

pub use data::{Map, Value};
pub use errors::{ParseError, Rule};
pub use options::{DuplicateKeys, ParseOptions, DEFAULT_MAX_DEPTH};

/// Parses a JSON string into a [Value], or returns a [ParseError].
pub fn parse(json: impl AsRef<str>) -> Result<Value, ParseError> {
    parse_with(json, &ParseOptions::default())
}

/// Parses a JSON string with the given options.
pub fn parse_with(json: impl AsRef<str>, options: &ParseOptions) -> Result<Value, ParseError> {
    let result = parser::JsonParser::new(json.as_ref(), *options).parse();
    if let Err(error) = &result {
        log::debug!("rejected JSON input: {error}");
    }
    result
}
