//! Error taxonomy.
//!
//! Every failure is fatal for the compilation unit: the first error is
//! returned through every recursive call and no partial tree survives.

use crate::span::Span;
use serde::Serialize;
use thiserror::Error;

/// Lexical failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
pub enum LexErrorKind {
    /// A byte that cannot start a token, or an ill-formed numeric literal.
    #[error("illegal token")]
    IllegalByte,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated template literal")]
    UnterminatedTemplate,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid numeric separator")]
    InvalidNumericSeparator,
}

/// Grammar failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected token")]
    UnexpectedToken,
    /// `-2 ** 2`, or `??` mixed with `||`/`&&` without parentheses.
    #[error("parenthesization required")]
    RequiredParenthesization,
    #[error("missing token")]
    MissingToken,
    #[error("invalid regular expression")]
    InvalidRegExp,
    /// Assignment to `eval` or `arguments`.
    #[error("forbidden identifier")]
    ForbiddenIdentifier,
    #[error("invalid delete")]
    InvalidDelete,
    #[error("nesting too deep")]
    NestingTooDeep,
}

/// Binding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
pub enum ReferenceErrorKind {
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("arguments outside of a function")]
    ArgumentsOrThisOutsideFunction,
}

/// Error class and reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "class", content = "kind")]
pub enum ErrorKind {
    Lex(LexErrorKind),
    Syntax(SyntaxErrorKind),
    Reference(ReferenceErrorKind),
}

impl ErrorKind {
    /// Name of the script-visible error class. Lexical errors surface as
    /// `SyntaxError`s.
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Lex(_) | Self::Syntax(_) => "SyntaxError",
            Self::Reference(_) => "ReferenceError",
        }
    }
}

impl From<LexErrorKind> for ErrorKind {
    fn from(kind: LexErrorKind) -> Self {
        Self::Lex(kind)
    }
}

impl From<SyntaxErrorKind> for ErrorKind {
    fn from(kind: SyntaxErrorKind) -> Self {
        Self::Syntax(kind)
    }
}

impl From<ReferenceErrorKind> for ErrorKind {
    fn from(kind: ReferenceErrorKind) -> Self {
        Self::Reference(kind)
    }
}

/// Error raised by the lexer before any message text is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at {}..{}", .span.start, .span.end)]
pub struct LexError {
    pub kind: LexErrorKind,
    /// The offending text (for strings: from the opening quote).
    pub span: Span,
    pub line: u32,
}

impl LexError {
    pub const fn new(kind: LexErrorKind, span: Span, line: u32) -> Self {
        Self { kind, span, line }
    }
}

/// Structured error handed to the hosting compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}: {message} in {line}", .kind.class())]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: u32,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: impl Into<ErrorKind>, message: impl Into<String>, line: u32, span: Span) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            line,
            span,
        }
    }

    /// Attach the engine's message to a lexer error.
    pub fn from_lex(err: LexError, source: &str) -> Self {
        let text = source.get(err.span.range()).unwrap_or("");
        let message = match err.kind {
            LexErrorKind::IllegalByte => format!("Unexpected token \"{text}\""),
            LexErrorKind::UnterminatedString => format!("Unterminated string \"{text}\""),
            LexErrorKind::UnterminatedComment => "Unterminated comment".to_string(),
            LexErrorKind::UnterminatedTemplate => "Unterminated template literal".to_string(),
            LexErrorKind::InvalidEscape => format!("Invalid Unicode code point \"{text}\""),
            LexErrorKind::InvalidNumericSeparator => {
                "Numeric separators are allowed only between two digits".to_string()
            }
        };
        Self::new(err.kind, message, err.line, err.span)
    }

    pub const fn is_syntax(&self) -> bool {
        matches!(self.kind, ErrorKind::Lex(_) | ErrorKind::Syntax(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_engine_format() {
        let err = ParseError::new(
            SyntaxErrorKind::UnexpectedToken,
            "Unexpected token \")\"",
            3,
            Span::new(10, 11),
        );
        assert_eq!(err.to_string(), "SyntaxError: Unexpected token \")\" in 3");

        let err = ParseError::new(
            ReferenceErrorKind::InvalidAssignmentTarget,
            "Invalid left-hand side in assignment",
            1,
            Span::new(0, 1),
        );
        assert_eq!(
            err.to_string(),
            "ReferenceError: Invalid left-hand side in assignment in 1"
        );
        assert!(!err.is_syntax());
    }

    #[test]
    fn test_from_lex() {
        let source = "x = \"abc";
        let lex = LexError::new(LexErrorKind::UnterminatedString, Span::new(4, 8), 1);
        let err = ParseError::from_lex(lex, source);
        assert_eq!(err.kind, ErrorKind::Lex(LexErrorKind::UnterminatedString));
        assert_eq!(err.message, "Unterminated string \"\"abc\"");
        assert_eq!(err.kind.class(), "SyntaxError");
    }
}
