//! Token definitions.
//!
//! Tokens never own text: the span points into the caller's buffer and the
//! terminal resolver slices it when a node needs the characters.

use crate::span::Span;
use serde::Serialize;

/// A classified, positioned unit of lexical input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line of the first byte.
    pub line: u32,
    /// Rolling hash of identifier/keyword text, zero for everything else.
    pub key_hash: u32,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span, line: u32) -> Self {
        Self {
            kind,
            span,
            line,
            key_hash: 0,
        }
    }
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TokenKind {
    End,
    /// A line terminator. The parser skips these but the lexer remembers
    /// having produced one, which is what automatic semicolon insertion needs.
    LineEnd,

    // === Punctuation ===
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Dot,
    Semicolon,
    Colon,
    Conditional,
    Coalesce,
    Grave,

    // === Assignment ===
    Assignment,
    AdditionAssignment,
    SubtractionAssignment,
    MultiplicationAssignment,
    ExponentiationAssignment,
    DivisionAssignment,
    RemainderAssignment,
    LeftShiftAssignment,
    RightShiftAssignment,
    UnsignedRightShiftAssignment,
    BitwiseAndAssignment,
    BitwiseXorAssignment,
    BitwiseOrAssignment,

    // === Operators ===
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    Addition,
    Increment,
    Subtraction,
    Decrement,
    Multiplication,
    Exponentiation,
    Division,
    Remainder,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    BitwiseAnd,
    LogicalAnd,
    BitwiseOr,
    LogicalOr,
    BitwiseXor,
    BitwiseNot,
    LogicalNot,

    // === Literals ===
    Number(f64),
    Boolean(bool),
    /// A string literal without backslashes; its span is used verbatim.
    String,
    /// A string literal containing at least one backslash; decoded later.
    EscapedString,
    /// Produced only by the parser-driven re-scan of a `/` in value position.
    RegExp,

    // === Names and keywords ===
    Name,
    Undefined,
    Null,
    This,
    Arguments,
    In,
    Typeof,
    Instanceof,
    Void,
    New,
    Delete,
    Yield,
    Var,
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Function,
    Return,
    With,
    Try,
    Catch,
    Finally,
    Throw,
    Builtin(Builtin),
    /// Future reserved word.
    Reserved,
}

impl TokenKind {
    /// Kinds that may be written as an assignment target's operator.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Self::Assignment
                | Self::AdditionAssignment
                | Self::SubtractionAssignment
                | Self::MultiplicationAssignment
                | Self::ExponentiationAssignment
                | Self::DivisionAssignment
                | Self::RemainderAssignment
                | Self::LeftShiftAssignment
                | Self::RightShiftAssignment
                | Self::UnsignedRightShiftAssignment
                | Self::BitwiseAndAssignment
                | Self::BitwiseXorAssignment
                | Self::BitwiseOrAssignment
        )
    }
}

/// Names bound to fixed engine slots instead of ordinary variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Builtin {
    // Namespaces
    Njs,
    Math,
    Json,

    // Constructors
    Object,
    Array,
    Boolean,
    Number,
    String,
    Function,
    RegExp,
    Date,
    Error,
    EvalError,
    InternalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    UriError,
    MemoryError,

    // Functions
    Eval,
    ToString,
    IsNaN,
    IsFinite,
    ParseInt,
    ParseFloat,
    EncodeUri,
    EncodeUriComponent,
    DecodeUri,
    DecodeUriComponent,
    Require,
    SetTimeout,
    SetImmediate,
    ClearTimeout,
}

/// How a built-in is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuiltinClass {
    /// Shared object registered as a global variable.
    Object,
    /// Constructor with a fixed engine slot.
    Constructor,
    /// Shared function registered as a global variable.
    Function,
}

impl Builtin {
    const FIRST_CONSTRUCTOR: u32 = Builtin::Object as u32;
    const FIRST_FUNCTION: u32 = Builtin::Eval as u32;

    pub const fn class(self) -> BuiltinClass {
        let n = self as u32;
        if n < Self::FIRST_CONSTRUCTOR {
            BuiltinClass::Object
        } else if n < Self::FIRST_FUNCTION {
            BuiltinClass::Constructor
        } else {
            BuiltinClass::Function
        }
    }

    /// Engine slot within the built-in's class table.
    pub const fn slot(self) -> u32 {
        let n = self as u32;
        match self.class() {
            BuiltinClass::Object => n,
            BuiltinClass::Constructor => n - Self::FIRST_CONSTRUCTOR,
            BuiltinClass::Function => n - Self::FIRST_FUNCTION,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Njs => "njs",
            Self::Math => "Math",
            Self::Json => "JSON",
            Self::Object => "Object",
            Self::Array => "Array",
            Self::Boolean => "Boolean",
            Self::Number => "Number",
            Self::String => "String",
            Self::Function => "Function",
            Self::RegExp => "RegExp",
            Self::Date => "Date",
            Self::Error => "Error",
            Self::EvalError => "EvalError",
            Self::InternalError => "InternalError",
            Self::RangeError => "RangeError",
            Self::ReferenceError => "ReferenceError",
            Self::SyntaxError => "SyntaxError",
            Self::TypeError => "TypeError",
            Self::UriError => "URIError",
            Self::MemoryError => "MemoryError",
            Self::Eval => "eval",
            Self::ToString => "toString",
            Self::IsNaN => "isNaN",
            Self::IsFinite => "isFinite",
            Self::ParseInt => "parseInt",
            Self::ParseFloat => "parseFloat",
            Self::EncodeUri => "encodeURI",
            Self::EncodeUriComponent => "encodeURIComponent",
            Self::DecodeUri => "decodeURI",
            Self::DecodeUriComponent => "decodeURIComponent",
            Self::Require => "require",
            Self::SetTimeout => "setTimeout",
            Self::SetImmediate => "setImmediate",
            Self::ClearTimeout => "clearTimeout",
        }
    }
}
