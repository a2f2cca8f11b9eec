use crate::data::Value;
use crate::errors::{Failure, ParseError, Rule, RuleResult};

// The furthest point any rule got to before failing. When the whole parse fails,
// this is what gets reported: the alternative that made the most progress is the
// one whose complaint is most useful.
#[derive(Debug)]
struct Expectation {
    offset: usize,
    rule: Rule,
    msg: String,
}

pub struct Scanner<'a> {
    // The original string, sliced directly to match literals and numbers.
    source: &'a str,
    // Byte index into `source`. It only ever moves by whole characters, so it always
    // sits on a char boundary and slicing at it cannot panic.
    current: usize,
    furthest: Option<Expectation>,
    allow_leading_plus: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, allow_leading_plus: bool) -> Self {
        Self {
            source,
            current: 0,
            furthest: None,
            allow_leading_plus,
        }
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // Literals

    pub fn literal(&mut self, keyword: &'static str) -> RuleResult<()> {
        /* Matches an exact keyword. Near misses are diagnosed by the value rule,
         * which knows every keyword, so nothing is recorded here. */
        if self.rest().starts_with(keyword) {
            self.current += keyword.len();
            Ok(())
        } else {
            Err(Failure::Mismatch)
        }
    }

    pub fn word_at_cursor(&self) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|ch: char| !is_letter(ch)).unwrap_or(rest.len());
        &rest[..end]
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // String scanning

    pub fn string(&mut self) -> RuleResult<String> {
        self.attempt(Self::scan_string)
    }

    fn scan_string(&mut self) -> RuleResult<String> {
        if !self.matches('"') {
            return Err(Failure::Mismatch);
        }

        // Characters are collected as UTF-16 code units: a \uXXXX escape contributes
        // exactly one unit, and decoding happens once the string is closed.
        let mut units: Vec<u16> = Vec::new();

        loop {
            match self.peek() {
                None => return self.expected(Rule::String, "Unterminated string"),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.parse_escape(&mut units)?;
                }
                Some(x) if is_control(x) => {
                    let msg = string_error_msg(x);
                    return self.expected(Rule::String, msg);
                }
                Some(x) => {
                    self.advance();
                    push_char(&mut units, x);
                }
            }
        }

        // Lone surrogates have no scalar value and become U+FFFD.
        Ok(String::from_utf16_lossy(&units))
    }

    fn parse_escape(&mut self, units: &mut Vec<u16>) -> RuleResult<()> {
        let decoded = match self.peek() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\x08',
            Some('f') => '\x0C',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => {
                self.advance();
                units.push(self.parse_code_unit()?);
                return Ok(());
            }
            Some(' ') => {
                return self.expected(
                    Rule::Escape,
                    "A lone \\ is not allowed inside a string (hint: you can escape it with \\\\)",
                )
            }
            Some(x) => return self.expected(Rule::Escape, format!("Invalid escape sequence: \\{x}")),
            None => return self.expected(Rule::String, "Unterminated string"),
        };

        self.advance();
        push_char(units, decoded);
        Ok(())
    }

    fn parse_code_unit(&mut self) -> RuleResult<u16> {
        /* Parses the code unit of a \uXXXX escape. The scanner sits right after the 'u'. */
        let seq: String = self.rest().chars().take(4).collect();

        if seq.chars().count() < 4 || !is_hex(&seq) {
            return self.expected(
                Rule::Escape,
                format!("Invalid Unicode escape sequence: '{seq}' (should be a 4-character hex code)"),
            );
        }

        let unit = u16::from_str_radix(&seq, 16).map_err(|_| Failure::Mismatch)?;
        self.current += seq.len();
        Ok(unit)
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // Number scanning

    pub fn number(&mut self) -> RuleResult<Value> {
        self.attempt(Self::scan_number)
    }

    fn scan_number(&mut self) -> RuleResult<Value> {
        let start = self.current;
        self.scan_integer()?;
        let has_fraction = self.optional(Self::scan_fraction)?;
        let has_exponent = self.optional(Self::scan_exponent)?;
        let numeral = &self.source[start..self.current];

        // The numeral matches the JSON grammar at this point, which is a subset of
        // what Rust's i64 and f64 parsers accept (both take a leading '+').
        if !has_fraction && !has_exponent {
            numeral.parse().map(Value::Int).map_err(|_| {
                let msg = format!("Integer literal {numeral} is out of the 64-bit range");
                Failure::Abort(self.error_at(start, Rule::Number, msg))
            })
        } else {
            numeral.parse().map(Value::Float).map_err(|_| {
                let msg = format!("Invalid floating point literal {numeral}");
                Failure::Abort(self.error_at(start, Rule::Number, msg))
            })
        }
    }

    fn scan_integer(&mut self) -> RuleResult<()> {
        match self.peek() {
            Some('-') => self.advance(),
            Some('+') if self.allow_leading_plus => self.advance(),
            Some('+') => {
                return self.expected(Rule::Number, "A leading '+' is not allowed on numbers")
            }
            Some(x) if x.is_ascii_digit() => {}
            _ => return Err(Failure::Mismatch),
        }

        // A leading zero stands alone: "01" scans as "0" and leaves the '1' behind.
        match self.peek() {
            Some('0') => self.advance(),
            Some('1'..='9') => {
                self.advance();
                self.skip_digits();
            }
            _ => {
                let sign = self.peek_behind();
                return self.expected(
                    Rule::Number,
                    format!("At least a digit is expected after '{sign}'"),
                );
            }
        }

        Ok(())
    }

    fn scan_fraction(&mut self) -> RuleResult<()> {
        /* Scans a fraction part, consisting of a dot and at least one digit. */
        if !self.matches('.') {
            return Err(Failure::Mismatch);
        }
        if self.skip_digits() == 0 {
            return self.expected(Rule::Number, "At least a digit is expected after a fraction dot");
        }
        Ok(())
    }

    fn scan_exponent(&mut self) -> RuleResult<()> {
        /* Scans an exponent part, consisting of 'e|E', an optional sign,
         * and at least one digit. */
        if !matches!(self.peek(), Some('e' | 'E')) {
            return Err(Failure::Mismatch);
        }
        self.advance();
        if matches!(self.peek(), Some('-' | '+')) {
            self.advance();
        }
        if self.skip_digits() == 0 {
            return self.expected(Rule::Number, "At least a digit is expected after an exponent");
        }
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // Failures

    pub fn expected<T, S: Into<String>>(&mut self, rule: Rule, msg: S) -> RuleResult<T> {
        /* Records a failure at the current character and backs out of the rule.
         * Only a failure strictly further into the input replaces the record, so among
         * failures at the same offset the first, most specific one is kept. */
        let offset = self.current;
        if self.furthest.as_ref().map_or(true, |f| offset > f.offset) {
            self.furthest = Some(Expectation {
                offset,
                rule,
                msg: msg.into(),
            });
        }
        Err(Failure::Mismatch)
    }

    pub fn error_at<S: Into<String>>(&self, offset: usize, rule: Rule, msg: S) -> ParseError {
        let (line, column) = self.position_of(offset);
        ParseError::new(msg.into(), rule, offset, line, column)
    }

    pub fn into_error(self) -> ParseError {
        match &self.furthest {
            Some(e) => self.error_at(e.offset, e.rule, e.msg.clone()),
            None => self.error_at(0, Rule::Value, "Invalid JSON"),
        }
    }

    fn position_of(&self, offset: usize) -> (usize, usize) {
        /* Line is 1-based and column is 0-based. Columns count characters, not bytes. */
        let before = &self.source[..offset.min(self.source.len())];
        let line = 1 + before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        (line, before[line_start..].chars().count())
    }

    ///////////////////////////////////////////////////////////////////////////////////////////////////////////
    // Scanning control

    pub fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> RuleResult<T>) -> RuleResult<T> {
        /* Runs a rule, rewinding to where it started if it fails. */
        let start = self.current;
        let result = rule(self);
        if result.is_err() {
            self.current = start;
        }
        result
    }

    fn optional(&mut self, rule: impl FnOnce(&mut Self) -> RuleResult<()>) -> RuleResult<bool> {
        match self.attempt(rule) {
            Ok(()) => Ok(true),
            Err(Failure::Mismatch) => Ok(false),
            Err(abort) => Err(abort),
        }
    }

    pub fn offset(&self) -> usize {
        self.current
    }

    pub fn rewind(&mut self, offset: usize) {
        self.current = offset;
    }

    pub fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.current += ch.len_utf8();
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_behind(&self) -> char {
        self.source[..self.current].chars().next_back().unwrap_or('\0')
    }

    pub fn matches(&mut self, expected: char) -> bool {
        let matched = self.peek() == Some(expected);
        if matched {
            self.advance();
        }
        matched
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\n' | '\r' | '\t')) {
            self.advance();
        }
    }

    fn skip_digits(&mut self) -> usize {
        /* Advances the scanner forward until a non-digit is found */
        let start = self.current;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        self.current - start
    }

    pub fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.current..]
    }
}

fn is_letter(s: char) -> bool {
    matches!(s, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_hex(s: &str) -> bool {
    s.chars().all(|ch| ch.is_ascii_hexdigit())
}

fn is_control(x: char) -> bool {
    // Everything under U+0020 must be escaped
    x < '\u{20}'
}

fn push_char(units: &mut Vec<u16>, ch: char) {
    let mut buf = [0u16; 2];
    units.extend_from_slice(ch.encode_utf16(&mut buf));
}

fn string_error_msg(ch: char) -> String {
    match ch {
        '\n' => "Line breaks are not allowed inside a string (hint: you can escape them as \\n)".into(),
        '\t' => "Literal tabs are not allowed inside a string (hint: you can escape them as \\t)".into(),
        '\r' => "Carriage return line breaks are not allowed inside a string (hint: you can escape them as \\r)".into(),
        '\x08' => "Backspace control characters are not allowed inside a string (hint: you can escape them as \\b)".into(),
        '\x0C' => "Form-feed control characters are not allowed inside a string (hint: you can escape them as \\f)".into(),
        _ => {
            let hex = format!("{:04X}", ch as u32);
            format!("The control character U+{hex} is not allowed inside a string (hint: you can escape it as \\u{hex})")
        }
    }
}
