use std::collections::HashMap;
use std::io::BufRead;

use crate::env::{EnvLookup, HostEnv};
use crate::error::{Error, ParseError, ParseErrorKind};
use crate::escape::{Dialect, expand_escape, unescape};
use crate::interpolate::interpolate;
use crate::model::Binding;

/// Parse dotenv bindings from UTF-8 text, falling back to the process
/// environment for `${NAME}` references.
pub fn parse_str(input: &str) -> Result<Vec<Binding>, Error> {
    parse_str_with_env(input, &HostEnv::process())
}

/// Parse dotenv bindings from UTF-8 text using `env` as the interpolation
/// fallback.
pub fn parse_str_with_env(input: &str, env: &dyn EnvLookup) -> Result<Vec<Binding>, Error> {
    Parser::new(input, env).parse().map_err(Error::from)
}

/// Parse dotenv bindings from UTF-8 bytes.
pub fn parse_bytes(input: &[u8]) -> Result<Vec<Binding>, Error> {
    parse_bytes_with_env(input, &HostEnv::process())
}

/// Parse dotenv bindings from UTF-8 bytes using `env` as the interpolation
/// fallback.
pub fn parse_bytes_with_env(input: &[u8], env: &dyn EnvLookup) -> Result<Vec<Binding>, Error> {
    let text = std::str::from_utf8(input)?;
    parse_str_with_env(text, env)
}

/// Parse dotenv bindings from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<Binding>, Error> {
    parse_reader_with_env(reader, &HostEnv::process())
}

/// Parse dotenv bindings from a buffered reader using `env` as the
/// interpolation fallback.
pub fn parse_reader_with_env<R: BufRead>(
    mut reader: R,
    env: &dyn EnvLookup,
) -> Result<Vec<Binding>, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_bytes_with_env(&buf, env)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
}

impl Quote {
    fn from_leading(value: &str) -> Option<Self> {
        match value.as_bytes().first() {
            Some(b'"') => Some(Self::Double),
            Some(b'\'') => Some(Self::Single),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }

    fn triple(self) -> &'static str {
        match self {
            Self::Double => "\"\"\"",
            Self::Single => "'''",
        }
    }

    fn dialect(self) -> Dialect {
        match self {
            Self::Double => Dialect::Full,
            Self::Single => Dialect::Literal,
        }
    }
}

/// Line store, cursor and output list for a single parse pass.
struct Parser<'a> {
    lines: Vec<&'a str>,
    position: usize,
    bindings: Vec<Binding>,
    /// Index of the first binding for each name.
    first_by_name: HashMap<String, usize>,
    env: &'a dyn EnvLookup,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, env: &'a dyn EnvLookup) -> Self {
        Self {
            lines: input.lines().collect(),
            position: 0,
            bindings: Vec::new(),
            first_by_name: HashMap::new(),
            env,
        }
    }

    fn parse(mut self) -> Result<Vec<Binding>, ParseError> {
        while self.position < self.lines.len() {
            self.parse_line()?;
            self.position += 1;
        }
        Ok(self.bindings)
    }

    fn line_number(&self) -> u32 {
        u32::try_from(self.position + 1).unwrap_or(u32::MAX)
    }

    fn parse_line(&mut self) -> Result<(), ParseError> {
        let line_num = self.line_number();
        let line: &'a str = self.lines[self.position];
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let line = line.strip_prefix("export ").unwrap_or(line).trim();
        let Some((name, raw_value)) = line.split_once('=') else {
            return Ok(());
        };

        let name = name.trim();
        if !is_valid_name(name) {
            return Err(ParseError::new(
                line_num,
                ParseErrorKind::InvalidName(name.to_owned()),
            ));
        }

        let value = self.parse_value(raw_value, line_num)?;
        self.first_by_name
            .entry(name.to_owned())
            .or_insert(self.bindings.len());
        self.bindings.push(Binding::new(name, value, line_num));
        Ok(())
    }

    fn parse_value(&mut self, raw_value: &'a str, line_num: u32) -> Result<String, ParseError> {
        let value = raw_value.trim_start();
        if value.is_empty() {
            return Ok(String::new());
        }

        match Quote::from_leading(value) {
            Some(quote) => match value.strip_prefix(quote.triple()) {
                Some(rest) => self.parse_multiline(rest, quote, line_num),
                None => self.parse_quoted(&value[1..], quote, line_num),
            },
            None => Ok(self.parse_unquoted(value)),
        }
    }

    /// Reads a `"""`/`'''` value, pulling further lines from the store until
    /// one ends with the closing delimiter.
    fn parse_multiline(
        &mut self,
        rest: &str,
        quote: Quote,
        line_num: u32,
    ) -> Result<String, ParseError> {
        let delimiter = quote.triple();
        let mut text = String::new();

        if !rest.trim().is_empty() {
            if let Some(content) = rest.strip_suffix(delimiter) {
                return Ok(self.finish(content, quote));
            }
            text.push_str(rest);
            text.push('\n');
        }

        loop {
            self.position += 1;
            let Some(line) = self.lines.get(self.position).copied() else {
                return Err(ParseError::new(
                    line_num,
                    ParseErrorKind::UnterminatedMultiline,
                ));
            };
            if let Some(content) = line.strip_suffix(delimiter) {
                text.push_str(content);
                break;
            }
            text.push_str(line);
            text.push('\n');
        }

        Ok(self.finish(&text, quote))
    }

    /// `body` starts right after the opening quote. Anything after the
    /// closing quote is ignored.
    fn parse_quoted(&self, body: &str, quote: Quote, line_num: u32) -> Result<String, ParseError> {
        let closing = quote.as_char();
        let dialect = quote.dialect();
        let mut out = String::with_capacity(body.len());
        let mut idx = 0usize;

        while let Some(ch) = body[idx..].chars().next() {
            if ch == closing {
                return Ok(self.finish(&out, quote));
            }
            if ch == '\\' {
                idx += 1 + expand_escape(&body[idx + 1..], dialect, &mut out);
                continue;
            }
            out.push(ch);
            idx += ch.len_utf8();
        }

        Err(ParseError::new(line_num, ParseErrorKind::UnterminatedQuote))
    }

    /// The first `#` always starts a comment.
    fn parse_unquoted(&self, value: &str) -> String {
        let value = value
            .split_once('#')
            .map(|(head, _)| head)
            .unwrap_or(value)
            .trim_end();
        self.expand(value)
    }

    fn finish(&self, text: &str, quote: Quote) -> String {
        match quote {
            Quote::Double => self.expand(text),
            Quote::Single => text.to_owned(),
        }
    }

    /// Escape expansion followed by `${NAME}` interpolation.
    fn expand(&self, text: &str) -> String {
        let unescaped = unescape(text, Dialect::Full);
        interpolate(&unescaped, |name| self.lookup(name), self.env)
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.first_by_name
            .get(name)
            .map(|&idx| self.bindings[idx].value.as_str())
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
