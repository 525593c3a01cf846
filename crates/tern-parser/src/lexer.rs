//! Lexer (tokenizer).
//!
//! The lexer is pulled one token at a time by the parser. It never decides
//! between division and a regular expression: `/` is always an operator here,
//! and the parser rolls back and calls [`Lexer::regex`] when it expected a
//! value. Template literal text is likewise scanned on the parser's request
//! through [`Lexer::template_segment`].
//!
//! Line terminators are reported as [`TokenKind::LineEnd`] tokens so that the
//! previous-token slot can answer "was there a line break before this token",
//! which is all automatic semicolon insertion needs.

use crate::error::{LexError, LexErrorKind};
use crate::keyword::{self, hash_add, HASH_INIT};
use crate::regex::{RegexError, RegexLiteral, RegexScanner};
use crate::span::Span;
use crate::token::{Token, TokenKind};
use tracing::trace;

/// First-byte classification.
#[derive(Clone, Copy)]
enum ByteClass {
    Illegal,
    Space,
    LineEnd,
    Letter,
    Digit,
    Quote,
    Dot,
    Slash,
    Single(TokenKind),
    Multi(TokenKind, &'static [Multi]),
}

/// One "next byte -> longer token" candidate.
#[derive(Clone, Copy)]
struct Multi {
    byte: u8,
    kind: TokenKind,
    next: &'static [Multi],
}

const fn multi(byte: u8, kind: TokenKind, next: &'static [Multi]) -> Multi {
    Multi { byte, kind, next }
}

// === Maximal munch tables ===

const STRICT_EQUAL: &[Multi] = &[multi(b'=', TokenKind::StrictEqual, &[])];
const ASSIGNMENT: &[Multi] = &[multi(b'=', TokenKind::Equal, STRICT_EQUAL)];

const STRICT_NOT_EQUAL: &[Multi] = &[multi(b'=', TokenKind::StrictNotEqual, &[])];
const LOGICAL_NOT: &[Multi] = &[multi(b'=', TokenKind::NotEqual, STRICT_NOT_EQUAL)];

const ADDITION: &[Multi] = &[
    multi(b'+', TokenKind::Increment, &[]),
    multi(b'=', TokenKind::AdditionAssignment, &[]),
];

const SUBTRACTION: &[Multi] = &[
    multi(b'-', TokenKind::Decrement, &[]),
    multi(b'=', TokenKind::SubtractionAssignment, &[]),
];

const EXPONENTIATION: &[Multi] = &[multi(b'=', TokenKind::ExponentiationAssignment, &[])];
const MULTIPLICATION: &[Multi] = &[
    multi(b'=', TokenKind::MultiplicationAssignment, &[]),
    multi(b'*', TokenKind::Exponentiation, EXPONENTIATION),
];

const REMAINDER: &[Multi] = &[multi(b'=', TokenKind::RemainderAssignment, &[])];

const BITWISE_AND: &[Multi] = &[
    multi(b'&', TokenKind::LogicalAnd, &[]),
    multi(b'=', TokenKind::BitwiseAndAssignment, &[]),
];

const BITWISE_OR: &[Multi] = &[
    multi(b'|', TokenKind::LogicalOr, &[]),
    multi(b'=', TokenKind::BitwiseOrAssignment, &[]),
];

const BITWISE_XOR: &[Multi] = &[multi(b'=', TokenKind::BitwiseXorAssignment, &[])];

const LEFT_SHIFT: &[Multi] = &[multi(b'=', TokenKind::LeftShiftAssignment, &[])];
const LESS: &[Multi] = &[
    multi(b'=', TokenKind::LessOrEqual, &[]),
    multi(b'<', TokenKind::LeftShift, LEFT_SHIFT),
];

const UNSIGNED_RIGHT_SHIFT: &[Multi] =
    &[multi(b'=', TokenKind::UnsignedRightShiftAssignment, &[])];
const RIGHT_SHIFT: &[Multi] = &[
    multi(b'=', TokenKind::RightShiftAssignment, &[]),
    multi(b'>', TokenKind::UnsignedRightShift, UNSIGNED_RIGHT_SHIFT),
];
const GREATER: &[Multi] = &[
    multi(b'=', TokenKind::GreaterOrEqual, &[]),
    multi(b'>', TokenKind::RightShift, RIGHT_SHIFT),
];

const CONDITIONAL: &[Multi] = &[multi(b'?', TokenKind::Coalesce, &[])];

static BYTE_CLASS: [ByteClass; 256] = build_byte_classes();

const fn build_byte_classes() -> [ByteClass; 256] {
    let mut table = [ByteClass::Illegal; 256];
    let mut i = 0;

    while i < 128 {
        table[i] = match i as u8 {
            b'\t' | 0x0b | 0x0c | b'\r' | b' ' => ByteClass::Space,
            b'\n' => ByteClass::LineEnd,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => ByteClass::Letter,
            b'0'..=b'9' => ByteClass::Digit,
            b'"' | b'\'' => ByteClass::Quote,
            b'.' => ByteClass::Dot,
            b'/' => ByteClass::Slash,
            b'(' => ByteClass::Single(TokenKind::OpenParen),
            b')' => ByteClass::Single(TokenKind::CloseParen),
            b'[' => ByteClass::Single(TokenKind::OpenBracket),
            b']' => ByteClass::Single(TokenKind::CloseBracket),
            b'{' => ByteClass::Single(TokenKind::OpenBrace),
            b'}' => ByteClass::Single(TokenKind::CloseBrace),
            b',' => ByteClass::Single(TokenKind::Comma),
            b';' => ByteClass::Single(TokenKind::Semicolon),
            b':' => ByteClass::Single(TokenKind::Colon),
            b'~' => ByteClass::Single(TokenKind::BitwiseNot),
            b'`' => ByteClass::Single(TokenKind::Grave),
            b'=' => ByteClass::Multi(TokenKind::Assignment, ASSIGNMENT),
            b'!' => ByteClass::Multi(TokenKind::LogicalNot, LOGICAL_NOT),
            b'+' => ByteClass::Multi(TokenKind::Addition, ADDITION),
            b'-' => ByteClass::Multi(TokenKind::Subtraction, SUBTRACTION),
            b'*' => ByteClass::Multi(TokenKind::Multiplication, MULTIPLICATION),
            b'%' => ByteClass::Multi(TokenKind::Remainder, REMAINDER),
            b'&' => ByteClass::Multi(TokenKind::BitwiseAnd, BITWISE_AND),
            b'|' => ByteClass::Multi(TokenKind::BitwiseOr, BITWISE_OR),
            b'^' => ByteClass::Multi(TokenKind::BitwiseXor, BITWISE_XOR),
            b'<' => ByteClass::Multi(TokenKind::Less, LESS),
            b'>' => ByteClass::Multi(TokenKind::Greater, GREATER),
            b'?' => ByteClass::Multi(TokenKind::Conditional, CONDITIONAL),
            _ => ByteClass::Illegal,
        };
        i += 1;
    }

    table
}

#[inline]
fn is_word_byte(c: u8) -> bool {
    matches!(BYTE_CLASS[c as usize], ByteClass::Letter | ByteClass::Digit)
}

#[inline]
fn digit_value(c: u8, radix: u32) -> Option<u32> {
    (c as char).to_digit(radix)
}

/// Raw text of one template literal segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSegment {
    /// Text between the delimiters, undecoded.
    pub span: Span,
    /// Whether the text contains a backslash.
    pub escaped: bool,
    /// `true` when the segment ended at the closing backtick, `false` at `${`.
    pub tail: bool,
}

/// State restored by [`Lexer::rollback`].
#[derive(Clone, Copy)]
struct Saved {
    pos: usize,
    line: u32,
    kind: TokenKind,
    prev_kind: TokenKind,
}

/// The lexer state.
pub struct Lexer<'a> {
    source: &'a str,
    text: &'a [u8],
    pos: usize,
    line: u32,
    /// Kind of the last token produced.
    kind: TokenKind,
    /// Kind of the token before that.
    prev_kind: TokenKind,
    saved: Saved,
    /// Start and line of the last token produced, where a rolled-back `/`
    /// is re-read as a regex.
    last_start: usize,
    last_line: u32,
    rolled_back: bool,
    /// Return the next word as a plain name.
    property: bool,
    /// Kind the last property-mode word would have had.
    property_token: TokenKind,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let saved = Saved {
            pos: 0,
            line: 1,
            kind: TokenKind::End,
            prev_kind: TokenKind::End,
        };

        Self {
            source,
            text: source.as_bytes(),
            pos: 0,
            line: 1,
            kind: TokenKind::End,
            prev_kind: TokenKind::End,
            saved,
            last_start: 0,
            last_line: 1,
            rolled_back: false,
            property: false,
            property_token: TokenKind::Name,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Current byte position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Current line, 1-based.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Kind of the token produced before the last one.
    pub fn prev_kind(&self) -> TokenKind {
        self.prev_kind
    }

    /// Make the next word token a [`TokenKind::Name`] regardless of keywords.
    /// The mode ends with the next token that is not a line end.
    pub fn set_property_mode(&mut self, enabled: bool) {
        self.property = enabled;
    }

    /// The keyword kind suppressed by property mode, or `Name`.
    pub fn property_token(&self) -> TokenKind {
        self.property_token
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.saved = Saved {
            pos: self.pos,
            line: self.line,
            kind: self.kind,
            prev_kind: self.prev_kind,
        };
        self.rolled_back = false;

        let token = self.scan()?;

        self.prev_kind = self.kind;
        self.kind = token.kind;
        self.last_start = token.span.start as usize;
        self.last_line = token.line;

        if token.kind != TokenKind::LineEnd {
            self.property = false;
        }

        trace!(
            target: "tern_parser::lexer",
            kind = ?token.kind,
            start = token.span.start,
            end = token.span.end,
            line = token.line,
            "token"
        );

        Ok(token)
    }

    /// Undo the last token. Only one token of history is kept.
    pub fn rollback(&mut self) {
        debug_assert!(!self.rolled_back, "rollback called twice in a row");

        self.pos = self.saved.pos;
        self.line = self.saved.line;
        self.kind = self.saved.kind;
        self.prev_kind = self.saved.prev_kind;
        self.rolled_back = true;
    }

    /// Re-scan a `/` as a regular expression literal. The caller must have
    /// rolled back the division token first; scanning restarts at that
    /// token's own start, past any whitespace or comment before it.
    pub fn regex(
        &mut self,
        scanner: &dyn RegexScanner,
    ) -> Result<(Token, RegexLiteral), RegexError> {
        debug_assert!(self.rolled_back, "regex re-scan without a rollback");
        debug_assert_eq!(self.text.get(self.last_start), Some(&b'/'));

        let start = self.last_start;
        self.line = self.last_line;
        let literal = scanner.scan(self.text, start + 1)?;
        self.pos = literal.flags.end as usize;

        self.prev_kind = self.kind;
        self.kind = TokenKind::RegExp;
        self.rolled_back = true;

        let token = Token::new(
            TokenKind::RegExp,
            Span::from_offsets(start, self.pos),
            self.line,
        );

        trace!(target: "tern_parser::lexer", start, end = self.pos, "regexp");

        Ok((token, literal))
    }

    /// Scan template text from the cursor up to the closing backtick or the
    /// next `${`. The cursor must be just past the opening backtick or the `}`
    /// that closed an interpolation.
    pub fn template_segment(&mut self) -> Result<TemplateSegment, LexError> {
        let start = self.pos;
        let line = self.line;
        let mut escaped = false;
        let mut p = start;

        while p < self.text.len() {
            let c = self.text[p];
            p += 1;

            match c {
                b'\\' => {
                    if p == self.text.len() {
                        break;
                    }
                    if self.text[p] == b'\n' {
                        self.line += 1;
                    }
                    p += 1;
                    escaped = true;
                }
                b'\n' => self.line += 1,
                b'`' => return Ok(self.finish_segment(start, p, p - 1, escaped, true)),
                b'$' if self.text.get(p) == Some(&b'{') => {
                    return Ok(self.finish_segment(start, p + 1, p - 1, escaped, false));
                }
                _ => {}
            }
        }

        Err(LexError::new(
            LexErrorKind::UnterminatedTemplate,
            Span::from_offsets(start.saturating_sub(1), self.text.len()),
            line,
        ))
    }

    fn finish_segment(
        &mut self,
        start: usize,
        resume: usize,
        end: usize,
        escaped: bool,
        tail: bool,
    ) -> TemplateSegment {
        self.pos = resume;
        self.prev_kind = self.kind;
        self.kind = TokenKind::Grave;
        self.rolled_back = true;

        TemplateSegment {
            span: Span::from_offsets(start, end),
            escaped,
            tail,
        }
    }

    // === Scanning ===

    #[inline]
    fn peek(&self) -> u8 {
        self.text.get(self.pos).copied().unwrap_or(0)
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> u8 {
        self.text.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        loop {
            let start = self.pos;
            let line = self.line;

            let Some(&c) = self.text.get(start) else {
                return Ok(Token::new(TokenKind::End, Span::empty(start as u32), line));
            };

            self.pos += 1;

            let kind = match BYTE_CLASS[c as usize] {
                ByteClass::Space => continue,
                ByteClass::LineEnd => {
                    self.line += 1;
                    TokenKind::LineEnd
                }
                ByteClass::Letter => return Ok(self.scan_word(start, line)),
                ByteClass::Digit => self.scan_number(start)?,
                ByteClass::Dot => {
                    if self.peek().is_ascii_digit() {
                        self.scan_number(start)?
                    } else {
                        TokenKind::Dot
                    }
                }
                ByteClass::Quote => self.scan_string(start, c)?,
                ByteClass::Slash => match self.peek() {
                    b'/' => {
                        self.skip_line_comment();
                        continue;
                    }
                    b'*' => {
                        if !self.skip_block_comment(start)? {
                            continue;
                        }
                        TokenKind::LineEnd
                    }
                    b'=' => {
                        self.pos += 1;
                        TokenKind::DivisionAssignment
                    }
                    _ => TokenKind::Division,
                },
                ByteClass::Single(kind) => kind,
                ByteClass::Multi(kind, next) => self.scan_multi(kind, next),
                ByteClass::Illegal => {
                    let len = self.source[start..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                    return Err(LexError::new(
                        LexErrorKind::IllegalByte,
                        Span::from_offsets(start, start + len),
                        line,
                    ));
                }
            };

            return Ok(Token::new(kind, Span::from_offsets(start, self.pos), line));
        }
    }

    fn scan_multi(&mut self, mut kind: TokenKind, mut next: &'static [Multi]) -> TokenKind {
        while let Some(&c) = self.text.get(self.pos) {
            match next.iter().find(|m| m.byte == c) {
                Some(m) => {
                    self.pos += 1;
                    kind = m.kind;
                    next = m.next;
                }
                None => break,
            }
        }

        kind
    }

    fn skip_line_comment(&mut self) {
        // The newline itself is left for the LineEnd token.
        while self.pos < self.text.len() && self.text[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    /// Skip a block comment. Returns whether it spanned a line break.
    fn skip_block_comment(&mut self, start: usize) -> Result<bool, LexError> {
        let line = self.line;
        let mut lines = 0;
        self.pos += 1;

        while self.pos < self.text.len() {
            match self.text[self.pos] {
                b'\n' => lines += 1,
                b'*' if self.peek_at(1) == b'/' => {
                    self.pos += 2;
                    self.line += lines;
                    return Ok(lines > 0);
                }
                _ => {}
            }
            self.pos += 1;
        }

        Err(LexError::new(
            LexErrorKind::UnterminatedComment,
            Span::from_offsets(start, self.text.len()),
            line,
        ))
    }

    fn scan_word(&mut self, start: usize, line: u32) -> Token {
        let mut hash = hash_add(HASH_INIT, self.text[start]);

        while let Some(&c) = self.text.get(self.pos) {
            if !is_word_byte(c) {
                break;
            }
            hash = hash_add(hash, c);
            self.pos += 1;
        }

        let found = keyword::lookup(&self.text[start..self.pos], hash);

        let kind = if self.property {
            self.property_token = found.unwrap_or(TokenKind::Name);
            TokenKind::Name
        } else {
            found.unwrap_or(TokenKind::Name)
        };

        let mut token = Token::new(kind, Span::from_offsets(start, self.pos), line);
        token.key_hash = hash;
        token
    }

    fn scan_string(&mut self, start: usize, quote: u8) -> Result<TokenKind, LexError> {
        let line = self.line;
        let mut escaped = false;

        while self.pos < self.text.len() {
            let c = self.text[self.pos];

            match c {
                b'\\' => {
                    self.pos += 1;
                    if self.pos == self.text.len() {
                        break;
                    }

                    match self.text[self.pos] {
                        b'\r' if self.peek_at(1) == b'\n' => {
                            self.pos += 1;
                            self.line += 1;
                        }
                        b'\n' => self.line += 1,
                        _ => {}
                    }

                    self.pos += 1;
                    escaped = true;
                }
                // The terminator is part of the reported text.
                b'\r' | b'\n' => {
                    self.pos += 1;
                    break;
                }
                _ if c == quote => {
                    self.pos += 1;
                    return Ok(if escaped {
                        TokenKind::EscapedString
                    } else {
                        TokenKind::String
                    });
                }
                _ => self.pos += 1,
            }
        }

        Err(LexError::new(
            LexErrorKind::UnterminatedString,
            Span::from_offsets(start, self.pos),
            line,
        ))
    }

    // === Numbers ===

    /// Scan a numeric literal whose first byte (a digit or `.`) is at `start`.
    fn scan_number(&mut self, start: usize) -> Result<TokenKind, LexError> {
        let first = self.text[start];

        if first == b'0' {
            let radix = match self.peek() {
                b'x' | b'X' => 16,
                b'o' | b'O' => 8,
                b'b' | b'B' => 2,
                b'0'..=b'9' | b'_' => {
                    // Legacy octal.
                    return Err(self.illegal_number(start, self.pos + 1));
                }
                _ => 0,
            };

            if radix != 0 {
                self.pos += 1;
                return self.scan_radix(start, radix).map(TokenKind::Number);
            }
        }

        self.pos = start;
        self.scan_decimal(start).map(TokenKind::Number)
    }

    fn scan_radix(&mut self, start: usize, radix: u32) -> Result<f64, LexError> {
        let digits = self.pos;
        let mut value = 0.0;

        loop {
            let c = self.peek();

            if c == b'_' {
                self.separator(digits, radix)?;
                continue;
            }

            match digit_value(c, radix) {
                Some(d) => {
                    value = value * f64::from(radix) + f64::from(d);
                    self.pos += 1;
                }
                None => break,
            }
        }

        if self.pos == digits {
            return Err(self.illegal_number(start, self.pos));
        }

        let trailer = match radix {
            8 => matches!(self.peek(), b'8' | b'9'),
            2 => matches!(self.peek(), b'2'..=b'9'),
            _ => false,
        };

        if trailer {
            return Err(self.illegal_number(start, self.pos + 1));
        }

        Ok(value)
    }

    /// Consume digits with separators; the cursor must be on the first byte
    /// of the run. Returns whether any digit was consumed.
    fn scan_digits(&mut self, radix: u32) -> Result<bool, LexError> {
        let digits = self.pos;

        loop {
            let c = self.peek();

            if c == b'_' {
                self.separator(digits, radix)?;
            } else if digit_value(c, radix).is_some() {
                self.pos += 1;
            } else {
                return Ok(self.pos > digits);
            }
        }
    }

    /// Accept a `_` at the cursor only between two digits.
    fn separator(&mut self, digits: usize, radix: u32) -> Result<(), LexError> {
        let after_digit = self.pos > digits && digit_value(self.text[self.pos - 1], radix).is_some();
        let before_digit = digit_value(self.peek_at(1), radix).is_some();

        if !(after_digit && before_digit) {
            return Err(LexError::new(
                LexErrorKind::InvalidNumericSeparator,
                Span::from_offsets(self.pos, self.pos + 1),
                self.line,
            ));
        }

        self.pos += 1;
        Ok(())
    }

    fn scan_decimal(&mut self, start: usize) -> Result<f64, LexError> {
        self.scan_digits(10)?;

        if self.peek() == b'.' {
            self.pos += 1;
            self.scan_digits(10)?;
        }

        if matches!(self.peek(), b'e' | b'E') {
            let mark = self.pos;
            self.pos += 1;

            if matches!(self.peek(), b'+' | b'-') {
                self.pos += 1;
            }

            if !self.scan_digits(10)? {
                return Err(self.illegal_number(start, mark + 1));
            }
        }

        let mut digits: std::string::String = self.source[start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();

        if digits.ends_with('.') {
            digits.push('0');
        }

        digits
            .parse::<f64>()
            .map_err(|_| self.illegal_number(start, self.pos))
    }

    fn illegal_number(&self, start: usize, end: usize) -> LexError {
        LexError::new(
            LexErrorKind::IllegalByte,
            Span::from_offsets(start, end.min(self.text.len())),
            self.line,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::BasicRegexScanner;
    use crate::token::Builtin;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.kind == TokenKind::End {
                break;
            }
            tokens.push(token.kind);
        }
        tokens
    }

    fn lex_error(source: &str) -> LexError {
        let mut lexer = Lexer::new(source);
        loop {
            match lexer.next_token() {
                Ok(token) if token.kind == TokenKind::End => panic!("no error in {source:?}"),
                Ok(_) => {}
                Err(err) => return err,
            }
        }
    }

    fn number(source: &str) -> f64 {
        match tokenize(source).as_slice() {
            [TokenKind::Number(n)] => *n,
            other => panic!("expected one number, got {other:?}"),
        }
    }

    #[test]
    fn test_punctuation_maximal_munch() {
        assert_eq!(
            tokenize("< <= << <<= > >= >> >>= >>> >>>="),
            vec![
                TokenKind::Less,
                TokenKind::LessOrEqual,
                TokenKind::LeftShift,
                TokenKind::LeftShiftAssignment,
                TokenKind::Greater,
                TokenKind::GreaterOrEqual,
                TokenKind::RightShift,
                TokenKind::RightShiftAssignment,
                TokenKind::UnsignedRightShift,
                TokenKind::UnsignedRightShiftAssignment,
            ]
        );

        assert_eq!(
            tokenize("= == === ! != !== ** **= ?? ?"),
            vec![
                TokenKind::Assignment,
                TokenKind::Equal,
                TokenKind::StrictEqual,
                TokenKind::LogicalNot,
                TokenKind::NotEqual,
                TokenKind::StrictNotEqual,
                TokenKind::Exponentiation,
                TokenKind::ExponentiationAssignment,
                TokenKind::Coalesce,
                TokenKind::Conditional,
            ]
        );

        // No space: `a+++b` is `a ++ + b`.
        assert_eq!(
            tokenize("a+++b"),
            vec![
                TokenKind::Name,
                TokenKind::Increment,
                TokenKind::Addition,
                TokenKind::Name,
            ]
        );
    }

    #[test]
    fn test_keywords_and_property_mode() {
        assert_eq!(
            tokenize("typeof this Math foo"),
            vec![
                TokenKind::Typeof,
                TokenKind::This,
                TokenKind::Builtin(Builtin::Math),
                TokenKind::Name,
            ]
        );

        let mut lexer = Lexer::new("new new");
        lexer.set_property_mode(true);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Name);
        assert_eq!(lexer.property_token(), TokenKind::New);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::New);
    }

    #[test]
    fn test_word_hash_matches_keyword_hash() {
        let mut lexer = Lexer::new("value");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.key_hash, keyword::hash(b"value"));
    }

    #[test]
    fn test_line_ends_and_comments() {
        assert_eq!(
            tokenize("a // note\nb /* x */ c /* \n */ d"),
            vec![
                TokenKind::Name,
                TokenKind::LineEnd,
                TokenKind::Name,
                TokenKind::Name,
                TokenKind::LineEnd,
                TokenKind::Name,
            ]
        );

        let mut lexer = Lexer::new("a\n\nb");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let b = lexer.next_token().unwrap();
        assert_eq!(b.line, 3);
        assert_eq!(lexer.prev_kind(), TokenKind::LineEnd);

        let err = lex_error("a /* open");
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
    }

    #[test]
    fn test_strings() {
        assert_eq!(tokenize(r#""abc" 'd\'e'"#), vec![TokenKind::String, TokenKind::EscapedString]);

        let err = lex_error("\"abc");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.span, Span::new(0, 4));

        let err = lex_error("'ab\ncd'");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.span, Span::new(0, 4));

        // Backslash-newline is a continuation.
        assert_eq!(tokenize("'a\\\nb'"), vec![TokenKind::EscapedString]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(number("0"), 0.0);
        assert_eq!(number("42"), 42.0);
        assert_eq!(number("1_000"), 1000.0);
        assert_eq!(number("0x1F"), 31.0);
        assert_eq!(number("0XfF_fF"), 65535.0);
        assert_eq!(number("0o17"), 15.0);
        assert_eq!(number("0b101"), 5.0);
        assert_eq!(number(".5"), 0.5);
        assert_eq!(number("5."), 5.0);
        assert_eq!(number("1.5e3"), 1500.0);
        assert_eq!(number("2E-2"), 0.02);
        assert_eq!(number("1_0.0_1"), 10.01);
        assert!(number("NaN").is_nan());
        assert_eq!(number("Infinity"), f64::INFINITY);
    }

    #[test]
    fn test_numeric_separator_errors() {
        let err = lex_error("1__000");
        assert_eq!(err.kind, LexErrorKind::InvalidNumericSeparator);
        assert_eq!(err.span, Span::new(1, 2));

        let err = lex_error("1000_");
        assert_eq!(err.kind, LexErrorKind::InvalidNumericSeparator);
        assert_eq!(err.span, Span::new(4, 5));

        assert_eq!(lex_error("0x_1").kind, LexErrorKind::InvalidNumericSeparator);
        assert_eq!(lex_error("1._5").kind, LexErrorKind::InvalidNumericSeparator);

        // A leading underscore makes an identifier.
        assert_eq!(tokenize("_1000"), vec![TokenKind::Name]);
    }

    #[test]
    fn test_illegal_numbers() {
        for source in ["0x", "0o", "0b", "0o78", "0b12", "012", "0_1", "1e"] {
            assert_eq!(lex_error(source).kind, LexErrorKind::IllegalByte, "{source}");
        }
    }

    #[test]
    fn test_dot() {
        assert_eq!(
            tokenize("a.b .5"),
            vec![
                TokenKind::Name,
                TokenKind::Dot,
                TokenKind::Name,
                TokenKind::Number(0.5),
            ]
        );
    }

    #[test]
    fn test_illegal_byte() {
        let err = lex_error("a # b");
        assert_eq!(err.kind, LexErrorKind::IllegalByte);
        assert_eq!(err.span, Span::new(2, 3));

        // Non-ASCII identifiers are not supported.
        let err = lex_error("é");
        assert_eq!(err.span, Span::new(0, 2));
    }

    #[test]
    fn test_rollback() {
        let mut lexer = Lexer::new("a\n++b");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let inc = lexer.next_token().unwrap();
        assert_eq!(inc.kind, TokenKind::Increment);
        assert_eq!(lexer.prev_kind(), TokenKind::LineEnd);

        lexer.rollback();
        let again = lexer.next_token().unwrap();
        assert_eq!(again, inc);
        assert_eq!(lexer.prev_kind(), TokenKind::LineEnd);
    }

    #[test]
    fn test_regex_rescan() {
        let mut lexer = Lexer::new("x = /ab/g;");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Division);

        lexer.rollback();
        let (token, literal) = lexer.regex(&BasicRegexScanner).unwrap();
        assert_eq!(token.kind, TokenKind::RegExp);
        assert_eq!(token.span, Span::new(4, 9));
        assert_eq!(literal.pattern, Span::new(5, 7));
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_template_segments() {
        let mut lexer = Lexer::new("`a${x}b\\n`");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Grave);

        let head = lexer.template_segment().unwrap();
        assert_eq!(head.span, Span::new(1, 2));
        assert!(!head.tail);

        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Name);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::CloseBrace);

        let tail = lexer.template_segment().unwrap();
        assert_eq!(tail.span, Span::new(6, 9));
        assert!(tail.escaped);
        assert!(tail.tail);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::End);

        let mut lexer = Lexer::new("`abc");
        lexer.next_token().unwrap();
        let err = lexer.template_segment().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedTemplate);
    }
}
