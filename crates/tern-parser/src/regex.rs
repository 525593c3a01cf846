//! Regular expression literal scanning.
//!
//! The lexer always reads `/` as division. When the parser finds one in value
//! position it rolls the lexer back and hands the bytes after the slash to a
//! [`RegexScanner`], which decides where the pattern and flags end. Pattern
//! compilation belongs to the runtime and is not done here.

use crate::span::Span;

/// Where a regular expression literal's parts lie in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexLiteral {
    /// Pattern text between the slashes.
    pub pattern: Span,
    /// Flag letters after the closing slash (possibly empty).
    pub flags: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegexErrorKind {
    /// End of line or input before the closing slash.
    Unterminated,
    /// Unknown or repeated flag letter.
    InvalidFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexError {
    pub kind: RegexErrorKind,
    pub span: Span,
}

/// Scans a regular expression literal whose opening `/` ends at `start`.
pub trait RegexScanner {
    fn scan(&self, source: &[u8], start: usize) -> Result<RegexLiteral, RegexError>;
}

/// Scanner accepting the literal grammar the runtime's regex engine accepts:
/// escapes, character classes (in which `/` does not terminate) and the
/// `gimsuy` flags, each at most once.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRegexScanner;

const FLAGS: &[u8] = b"gimsuy";

impl RegexScanner for BasicRegexScanner {
    fn scan(&self, source: &[u8], start: usize) -> Result<RegexLiteral, RegexError> {
        let mut p = start;
        let mut in_class = false;

        while p < source.len() {
            let c = source[p];
            p += 1;

            match c {
                b'\\' => match source.get(p) {
                    Some(b'\n' | b'\r') | None => break,
                    Some(_) => p += 1,
                },
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => return scan_flags(source, start, p),
                b'\n' | b'\r' => {
                    p -= 1;
                    break;
                }
                _ => {}
            }
        }

        Err(RegexError {
            kind: RegexErrorKind::Unterminated,
            span: Span::from_offsets(start - 1, p),
        })
    }
}

fn scan_flags(source: &[u8], start: usize, slash_end: usize) -> Result<RegexLiteral, RegexError> {
    let mut p = slash_end;
    let mut seen = 0u8;
    let mut valid = true;

    while let Some(&c) = source.get(p) {
        if !(c.is_ascii_alphanumeric() || c == b'_' || c == b'$') {
            break;
        }

        match FLAGS.iter().position(|&f| f == c) {
            Some(bit) if seen & (1 << bit) == 0 => seen |= 1 << bit,
            _ => valid = false,
        }

        p += 1;
    }

    let flags = Span::from_offsets(slash_end, p);

    if !valid {
        return Err(RegexError {
            kind: RegexErrorKind::InvalidFlags,
            span: flags,
        });
    }

    Ok(RegexLiteral {
        pattern: Span::from_offsets(start, slash_end - 1),
        flags,
    })
}
