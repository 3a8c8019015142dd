/// Backslash escape rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    /// `\n \r \t \f \b \" \' \\` and `\uXXXX`; any other escaped character
    /// is kept with the backslash dropped.
    Full,
    /// Only `\'` and `\\` are unescaped; every other backslash is literal.
    Literal,
}

/// Expands the escape whose backslash immediately precedes `rest`.
///
/// Pushes the expansion to `out` and returns how many bytes of `rest` were
/// consumed. A return of `0` means only the backslash was handled and the
/// next character must be processed normally.
pub(crate) fn expand_escape(rest: &str, dialect: Dialect, out: &mut String) -> usize {
    let Some(next) = rest.chars().next() else {
        out.push('\\');
        return 0;
    };

    match dialect {
        Dialect::Literal => {
            if next == '\'' || next == '\\' {
                out.push(next);
                1
            } else {
                out.push('\\');
                0
            }
        }
        Dialect::Full => {
            let unescaped = match next {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                'f' => '\u{0C}',
                'b' => '\u{08}',
                'u' => {
                    if let Some(ch) = rest.get(1..5).and_then(decode_hex4) {
                        out.push(ch);
                        return 5;
                    }
                    'u'
                }
                _ => next,
            };
            out.push(unescaped);
            next.len_utf8()
        }
    }
}

/// Expands every escape in `input` under `dialect`.
pub(crate) fn unescape(input: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find('\\') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let consumed = expand_escape(after, dialect, &mut out);
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

fn decode_hex4(digits: &str) -> Option<char> {
    if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(digits, 16).ok()?;
    Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
}
