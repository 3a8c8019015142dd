use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No candidate dotenv file was found.
    #[error("no dotenv file found")]
    NoFile,
    /// A candidate file was found but could not be opened or read. Together
    /// with [`Error::NoFile`] this covers every "no usable dotenv file" case;
    /// the path and OS error are kept for diagnostics.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid UTF-8 input: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

/// A fatal parse failure. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line}: {kind}")]
pub struct ParseError {
    pub line: u32,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(line: u32, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid variable name `{0}`")]
    InvalidName(String),
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    #[error("unterminated multiline string")]
    UnterminatedMultiline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_line_and_kind() {
        let err = ParseError::new(3, ParseErrorKind::InvalidName("1BAD".to_owned()));
        assert_eq!(
            err.to_string(),
            "parse error at line 3: invalid variable name `1BAD`"
        );
    }

    #[test]
    fn parse_error_converts_transparently() {
        let err = Error::from(ParseError::new(1, ParseErrorKind::UnterminatedQuote));
        assert_eq!(
            err.to_string(),
            "parse error at line 1: unterminated quoted string"
        );
    }
}
