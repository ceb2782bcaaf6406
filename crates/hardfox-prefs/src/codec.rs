//! Preference file text codec
//!
//! A preference file is a sequence of `user_pref("key", value);` or
//! `pref("key", value);` statements. Parsing is fail-soft: anything that is
//! not a statement is skipped and reported as a [`ParseWarning`], and the
//! scan resumes on the next line.

use std::fmt;

use crate::value::{PrefMap, PrefValue, quote};

/// Statement prefix used when writing a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallForm {
    /// `user_pref(`, values the user may change afterwards.
    UserPref,
    /// `pref(`, values re-applied on every start.
    Pref,
}

impl CallForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserPref => "user_pref",
            Self::Pref => "pref",
        }
    }

    fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "user_pref" => Some(Self::UserPref),
            "pref" => Some(Self::Pref),
            _ => None,
        }
    }
}

impl fmt::Display for CallForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Comment,
    Malformed,
}

/// A skipped piece of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line where the skipped text starts.
    pub line: usize,
    pub kind: WarningKind,
    /// The skipped text, trimmed, limited to its first line.
    pub text: String,
    /// Why a malformed statement was rejected. Empty for comments.
    pub reason: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::Comment => write!(f, "line {}: comment skipped", self.line),
            WarningKind::Malformed => {
                write!(f, "line {}: {} in `{}`", self.line, self.reason, self.text)
            }
        }
    }
}

/// Result of parsing a preference file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPrefs {
    pub prefs: PrefMap,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedPrefs {
    /// Warnings for statements that could not be parsed, ignoring comments.
    pub fn malformed(&self) -> impl Iterator<Item = &ParseWarning> {
        self.warnings
            .iter()
            .filter(|w| w.kind == WarningKind::Malformed)
    }
}

/// Parse preference file text.
///
/// Duplicate keys resolve to the last occurrence.
pub fn parse(text: &str) -> ParsedPrefs {
    let mut scanner = Scanner::new(text);
    let mut parsed = ParsedPrefs::default();

    loop {
        scanner.skip_whitespace();
        if scanner.at_end() {
            break;
        }

        let start = scanner.mark();
        if scanner.starts_with("//") || scanner.starts_with("#") {
            scanner.skip_line();
            parsed.warnings.push(comment(&scanner, start));
            continue;
        }
        if scanner.starts_with("/*") {
            scanner.skip_block_comment();
            parsed.warnings.push(comment(&scanner, start));
            continue;
        }

        match scanner.statement() {
            Ok((key, value)) => {
                if parsed.prefs.insert(key.clone(), value).is_some() {
                    tracing::debug!("Duplicate preference '{}', last occurrence wins", key);
                }
            }
            Err(reason) => {
                scanner.reset(start);
                scanner.skip_line();
                let warning = ParseWarning {
                    line: start.line,
                    kind: WarningKind::Malformed,
                    text: scanner.first_line_from(start),
                    reason,
                };
                tracing::warn!("Skipping malformed preference at {}", warning);
                parsed.warnings.push(warning);
            }
        }
    }

    parsed
}

fn comment(scanner: &Scanner<'_>, start: Mark) -> ParseWarning {
    ParseWarning {
        line: start.line,
        kind: WarningKind::Comment,
        text: scanner.first_line_from(start),
        reason: String::new(),
    }
}

/// Serialize a mapping as preference file text.
///
/// One statement per line in key order, trailing newline, no header. An
/// empty mapping yields empty text.
pub fn serialize(prefs: &PrefMap, form: CallForm) -> String {
    let mut out = String::new();
    for (key, value) in prefs {
        out.push_str(form.as_str());
        out.push('(');
        out.push_str(&quote(key));
        out.push_str(", ");
        out.push_str(&value.to_literal());
        out.push_str(");\n");
    }
    out
}

/// Decode raw file bytes.
///
/// UTF-8 (with or without BOM) is decoded as is; anything else falls back to
/// Latin-1 so a stray byte never makes a file unreadable.
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::warn!(
                "Preference file is not valid UTF-8 (byte {}), decoding as Latin-1",
                e.valid_up_to()
            );
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

type Step<T> = std::result::Result<T, String>;

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Advance past the next newline, or to the end of input.
    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while !self.at_end() {
            if self.starts_with("*/") {
                self.pos += 2;
                return;
            }
            self.bump();
        }
    }

    fn first_line_from(&self, mark: Mark) -> String {
        let consumed = &self.src[mark.pos..self.pos];
        consumed.lines().next().unwrap_or("").trim().to_string()
    }

    fn expect(&mut self, wanted: char) -> Step<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == wanted => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(format!("expected '{wanted}', found '{c}'")),
            None => Err(format!("expected '{wanted}', found end of input")),
        }
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn statement(&mut self) -> Step<(String, PrefValue)> {
        let ident = self.ident();
        if CallForm::from_ident(ident).is_none() {
            return Err("expected user_pref or pref".to_string());
        }

        self.expect('(')?;
        self.skip_whitespace();
        let key = self.string()?;
        if key.is_empty() {
            return Err("empty preference name".to_string());
        }
        self.expect(',')?;
        self.skip_whitespace();
        let value = self.value()?;
        self.expect(')')?;

        let after = self.mark();
        self.skip_whitespace();
        if self.peek() == Some(';') {
            self.bump();
        } else {
            self.reset(after);
        }
        Ok((key, value))
    }

    fn value(&mut self) -> Step<PrefValue> {
        match self.peek() {
            Some('"') | Some('\'') => self.string().map(PrefValue::String),
            Some(c) if c.is_ascii_alphabetic() => match self.ident() {
                "true" => Ok(PrefValue::Bool(true)),
                "false" => Ok(PrefValue::Bool(false)),
                other => Err(format!("unexpected value '{other}'")),
            },
            Some(_) => self.number(),
            None => Err("expected a value, found end of input".to_string()),
        }
    }

    fn number(&mut self) -> Step<PrefValue> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        {
            self.bump();
        }
        let literal = &self.src[start..self.pos];
        if literal.is_empty() {
            return Err("expected a value".to_string());
        }

        if literal.contains(['.', 'e', 'E']) {
            match literal.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(PrefValue::Float(f)),
                _ => Err(format!("invalid number '{literal}'")),
            }
        } else {
            literal
                .parse::<i64>()
                .map(PrefValue::Int)
                .map_err(|_| format!("invalid integer '{literal}'"))
        }
    }

    fn string(&mut self) -> Step<String> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err("expected a quoted string".to_string()),
        };
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated string".to_string()),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Step<char> {
        match self.bump() {
            Some('\\') => Ok('\\'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.unicode_escape(),
            Some(c) => Err(format!("unknown escape '\\{c}'")),
            None => Err("unterminated string".to_string()),
        }
    }

    fn unicode_escape(&mut self) -> Step<char> {
        let high = self.hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or_else(|| format!("invalid code point {high:#x}"));
        }

        if !self.starts_with("\\u") {
            return Err("unpaired surrogate".to_string());
        }
        self.pos += 2;
        let low = self.hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err("unpaired surrogate".to_string());
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| format!("invalid code point {code:#x}"))
    }

    fn hex4(&mut self) -> Step<u32> {
        let digits = self.rest().get(..4).ok_or("truncated \\u escape")?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid \\u escape '{digits}'"));
        }
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| format!("invalid \\u escape '{digits}'"))?;
        self.pos += 4;
        Ok(code)
    }
}
