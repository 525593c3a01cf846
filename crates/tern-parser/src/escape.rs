//! Two-pass decoding of escaped string and template text.
//!
//! The first pass walks the escapes and computes the decoded byte size and
//! code point length without allocating. The second pass reserves exactly
//! that many bytes in the arena and fills them. Both passes share one walker
//! and differ only in the sink they feed.

use crate::arena::{Arena, String};
use thiserror::Error;

const REPLACEMENT: char = '\u{FFFD}';

/// Size of a decoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoded {
    /// UTF-8 bytes.
    pub size: usize,
    /// Code points.
    pub length: usize,
}

/// A malformed escape. `offset` is the backslash's position in the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid escape at offset {offset}")]
pub struct EscapeError {
    pub offset: usize,
}

trait Sink {
    fn push(&mut self, c: char);
}

impl Sink for Decoded {
    fn push(&mut self, c: char) {
        self.size += c.len_utf8();
        self.length += 1;
    }
}

impl Sink for String<'_> {
    fn push(&mut self, c: char) {
        String::push(self, c);
    }
}

/// Pass 1: size and length of the decoded text.
pub fn measure(raw: &str) -> Result<Decoded, EscapeError> {
    let mut decoded = Decoded::default();
    walk(raw, &mut decoded)?;
    Ok(decoded)
}

/// Pass 2: decode `raw` into an exactly sized arena string.
pub fn decode_in<'a>(arena: &'a Arena, raw: &str) -> Result<(&'a str, Decoded), EscapeError> {
    let decoded = measure(raw)?;

    let mut out = arena.string_with_capacity(decoded.size);
    walk(raw, &mut out)?;
    debug_assert_eq!(out.len(), decoded.size);

    Ok((out.into_bump_str(), decoded))
}

fn walk(raw: &str, sink: &mut impl Sink) -> Result<(), EscapeError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    // Leading surrogate waiting for its trailing half.
    let mut pending: Option<u32> = None;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += push_char(raw, i, sink);
            continue;
        }

        let backslash = i;
        let invalid = EscapeError { offset: backslash };
        i += 1;

        let Some(&e) = bytes.get(i) else {
            return Err(invalid);
        };
        i += 1;

        let cp = match e {
            b'u' if bytes.get(i) == Some(&b'{') => {
                let start = i + 1;
                let end = bytes[start..]
                    .iter()
                    .position(|&b| !b.is_ascii_hexdigit())
                    .map_or(bytes.len(), |n| start + n);

                if end == start || end - start > 6 || bytes.get(end) != Some(&b'}') {
                    return Err(invalid);
                }

                i = end + 1;
                let cp = hex(&bytes[start..end]);
                if cp > 0x10FFFF {
                    return Err(invalid);
                }
                cp
            }
            b'u' => {
                let digits = bytes.get(i..i + 4).ok_or(invalid)?;
                if !digits.iter().all(u8::is_ascii_hexdigit) {
                    return Err(invalid);
                }
                i += 4;
                hex(digits)
            }
            b'x' => {
                let digits = bytes.get(i..i + 2).ok_or(invalid)?;
                if !digits.iter().all(u8::is_ascii_hexdigit) {
                    return Err(invalid);
                }
                i += 2;
                hex(digits)
            }
            b'\r' => {
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                continue;
            }
            b'\n' => continue,
            b'0' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' => {
                sink.push(match e {
                    b'0' => '\0',
                    b'b' => '\u{8}',
                    b'f' => '\u{c}',
                    b'n' => '\n',
                    b'r' => '\r',
                    b't' => '\t',
                    _ => '\u{b}',
                });
                continue;
            }
            _ => {
                // Any other character stands for itself.
                i = backslash + 1;
                i += push_char(raw, i, sink);
                continue;
            }
        };

        if let Some(lead) = pending.take() {
            if (0xDC00..=0xDFFF).contains(&cp) {
                let combined = 0x10000 + ((lead - 0xD800) << 10) + (cp - 0xDC00);
                sink.push(char::from_u32(combined).unwrap_or(REPLACEMENT));
                continue;
            }
            sink.push(REPLACEMENT);
        }

        if (0xD800..=0xDFFF).contains(&cp) {
            if cp <= 0xDBFF && bytes[i..].starts_with(b"\\u") {
                pending = Some(cp);
            } else {
                sink.push(REPLACEMENT);
            }
            continue;
        }

        sink.push(char::from_u32(cp).unwrap_or(REPLACEMENT));
    }

    if pending.is_some() {
        sink.push(REPLACEMENT);
    }

    Ok(())
}

/// Push the character starting at byte `i`; returns its width.
fn push_char(raw: &str, i: usize, sink: &mut impl Sink) -> usize {
    match raw[i..].chars().next() {
        Some(c) => {
            sink.push(c);
            c.len_utf8()
        }
        None => 1,
    }
}

fn hex(digits: &[u8]) -> u32 {
    digits.iter().fold(0, |value, &b| {
        let digit = (b as char).to_digit(16).unwrap_or(0);
        value * 16 + digit
    })
}
