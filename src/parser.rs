use crate::data::{Map, Value};
use crate::errors::{Failure, ParseError, Rule, RuleResult};
use crate::options::{DuplicateKeys, ParseOptions};
use crate::scanner::Scanner;
use indexmap::map::Entry;

/// A grammar rule producing a value. Rules refer to each other through these
/// pointers, which are only looked up while parsing.
type ValueRule<'a> = fn(&mut JsonParser<'a>) -> RuleResult<Value>;

pub struct JsonParser<'a> {
    scanner: Scanner<'a>,
    options: ParseOptions,
    // Number of arrays/objects currently open.
    depth: usize,
}

impl<'a> JsonParser<'a> {
    pub fn new(source: &'a str, options: ParseOptions) -> Self {
        Self {
            scanner: Scanner::new(source, options.allow_leading_plus),
            options,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Value, ParseError> {
        match self.json() {
            Ok(value) => Ok(value),
            Err(Failure::Abort(error)) => Err(error),
            Err(Failure::Mismatch) => Err(self.scanner.into_error()),
        }
    }

    fn json(&mut self) -> RuleResult<Value> {
        let value = self.element()?;

        // Matching a value is not enough, the whole input has to be consumed
        if !self.scanner.is_at_end() {
            let x = self.scanner.peek().unwrap_or_default();
            let msg = format!("Unexpected character after the end of the document: '{x}'");
            return self.scanner.expected(Rule::EndOfInput, msg);
        }

        Ok(value)
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // Values

    fn element(&mut self) -> RuleResult<Value> {
        self.scanner.skip_whitespace();
        let value = self.value()?;
        self.scanner.skip_whitespace();
        Ok(value)
    }

    fn value(&mut self) -> RuleResult<Value> {
        // Every alternative starts with a different character, so the order only decides
        // which rule gets to complain first.
        let rules: [ValueRule<'a>; 7] = [
            Self::object,
            Self::array,
            Self::string,
            Self::number,
            Self::true_literal,
            Self::false_literal,
            Self::null_literal,
        ];

        for rule in rules {
            match self.attempt(rule) {
                Err(Failure::Mismatch) => continue,
                result => return result,
            }
        }

        let msg = self.unexpected_value_msg();
        self.scanner.expected(Rule::Value, msg)
    }

    fn string(&mut self) -> RuleResult<Value> {
        self.scanner.string().map(Value::String)
    }

    fn number(&mut self) -> RuleResult<Value> {
        self.scanner.number()
    }

    fn true_literal(&mut self) -> RuleResult<Value> {
        self.scanner.literal("true").map(|_| Value::Bool(true))
    }

    fn false_literal(&mut self) -> RuleResult<Value> {
        self.scanner.literal("false").map(|_| Value::Bool(false))
    }

    fn null_literal(&mut self) -> RuleResult<Value> {
        self.scanner.literal("null").map(|_| Value::Null)
    }

    fn unexpected_value_msg(&self) -> String {
        let word = self.scanner.word_at_cursor();
        match self.scanner.peek() {
            None => "Expected a value, found end-of-file".into(),
            Some(_) if !word.is_empty() => {
                let hint = match word.to_lowercase().as_str() {
                    "true" => " (hint: maybe you meant 'true')",
                    "false" => " (hint: maybe you meant 'false')",
                    "null" => " (hint: maybe you meant 'null')",
                    _ => "",
                };
                format!("Unknown keyword '{word}'{hint}")
            }
            Some(x) => format!("Unexpected character: '{x}'"),
        }
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // Arrays

    fn array(&mut self) -> RuleResult<Value> {
        let start = self.scanner.offset();
        if !self.scanner.matches('[') {
            return Err(Failure::Mismatch);
        }

        self.enter(Rule::Array, start)?;
        let items = self.array_items();
        self.depth -= 1;

        items.map(Value::Array)
    }

    fn array_items(&mut self) -> RuleResult<Vec<Value>> {
        self.scanner.skip_whitespace();
        if self.scanner.matches(']') {
            return Ok(Vec::new());
        }

        // Every comma must be followed by another element, so no trailing commas
        let mut items = vec![self.element()?];
        while self.scanner.matches(',') {
            items.push(self.element()?);
        }

        if !self.scanner.matches(']') {
            return self
                .scanner
                .expected(Rule::Array, "Expected ',' or ']' after an array element");
        }

        Ok(items)
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // Objects

    fn object(&mut self) -> RuleResult<Value> {
        let start = self.scanner.offset();
        if !self.scanner.matches('{') {
            return Err(Failure::Mismatch);
        }

        self.enter(Rule::Object, start)?;
        let members = self.object_members();
        self.depth -= 1;

        members.map(Value::Object)
    }

    fn object_members(&mut self) -> RuleResult<Map> {
        let mut map = Map::new();

        self.scanner.skip_whitespace();
        if self.scanner.matches('}') {
            return Ok(map);
        }

        loop {
            let (key, value, key_offset) = self.member()?;
            self.insert_member(&mut map, key, value, key_offset)?;
            if !self.scanner.matches(',') {
                break;
            }
        }

        if !self.scanner.matches('}') {
            return self
                .scanner
                .expected(Rule::Object, "Expected ',' or '}' after an object member");
        }

        Ok(map)
    }

    fn member(&mut self) -> RuleResult<(String, Value, usize)> {
        self.scanner.skip_whitespace();
        let key_offset = self.scanner.offset();

        let key = match self.scanner.string() {
            Err(Failure::Mismatch) => {
                return self.scanner.expected(Rule::Member, "Expected a string key")
            }
            key => key?,
        };

        self.scanner.skip_whitespace();
        if !self.scanner.matches(':') {
            return self
                .scanner
                .expected(Rule::Member, format!("Expected ':' after the key \"{key}\""));
        }

        let value = self.element()?;
        Ok((key, value, key_offset))
    }

    fn insert_member(
        &self,
        map: &mut Map,
        key: String,
        value: Value,
        key_offset: usize,
    ) -> RuleResult<()> {
        match map.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(mut entry) => match self.options.duplicate_keys {
                DuplicateKeys::LastWins => {
                    log::trace!("duplicate key {:?} at offset {key_offset}, keeping the last value", entry.key());
                    entry.insert(value);
                }
                DuplicateKeys::FirstWins => {
                    log::trace!("duplicate key {:?} at offset {key_offset}, keeping the first value", entry.key());
                }
                DuplicateKeys::Reject => {
                    let msg = format!("Duplicate key \"{}\"", entry.key());
                    return Err(Failure::Abort(self.scanner.error_at(key_offset, Rule::Member, msg)));
                }
            },
        }

        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // Control

    fn attempt(&mut self, rule: ValueRule<'a>) -> RuleResult<Value> {
        /* Runs a value rule, rewinding the scanner if it fails. */
        let start = self.scanner.offset();
        let result = rule(self);
        if result.is_err() {
            self.scanner.rewind(start);
        }
        result
    }

    fn enter(&mut self, rule: Rule, start: usize) -> RuleResult<()> {
        /* Opens one nesting level, failing hard past the configured maximum. */
        match self.options.max_depth {
            Some(max) if self.depth >= max => {
                let msg = format!("Nesting is deeper than the maximum of {max} levels");
                Err(Failure::Abort(self.scanner.error_at(start, rule, msg)))
            }
            _ => {
                self.depth += 1;
                Ok(())
            }
        }
    }
}
