//! tern-parser: expression front end of the tern JavaScript engine
//!
//! Turns source text into an arena-allocated expression tree ready for code
//! generation.
//!
//! # Design Principles
//!
//! 1. **Table-driven lexing**
//!    - One 256-entry table classifies the first byte of every token
//!    - Multi-character operators are a small longest-match tree per byte
//!    - One token of rollback, used for regex literals and `++`/`--` after
//!      a line break
//!
//! 2. **Precedence climbing**
//!    - Each binary level is a static table of (token, node) pairs
//!    - Operators with special rules (`**`, `??`, assignment, unary,
//!      update) have their own methods
//!
//! 3. **Arena-based allocation**
//!    - Nodes live in one vector, referenced by [`NodeId`]
//!    - Decoded strings are written to the arena once; plain ones borrow
//!      the source
//!
//! 4. **Fail fast**
//!    - The first error aborts the compilation unit and comes back as a
//!      [`ParseError`] with class, message, line and span
//!
//! # Example
//!
//! ```
//! use tern_parser::{parse_expression, Arena, ParserOptions};
//!
//! let arena = Arena::new();
//! let program = parse_expression(&arena, "a + 2 * 3", ParserOptions::default())?;
//! assert_eq!(program.display(), "ADD(a, MULTIPLY(2, 3))");
//! # Ok::<(), tern_parser::ParseError>(())
//! ```

mod arena;
mod ast;
mod error;
mod escape;
mod expression;
mod keyword;
mod lexer;
mod parser;
mod precedence;
mod regex;
mod scope;
mod span;
mod terminal;
mod token;

// Re-exports
pub use arena::Arena;
pub use ast::{
    Ast, JsString, Node, NodeId, NodeKind, NodeView, Operation, Reference, ReferenceKind,
    STRING_MAP_STRIDE,
};
pub use error::{
    ErrorKind, LexError, LexErrorKind, ParseError, ReferenceErrorKind, SyntaxErrorKind,
};
pub use escape::{decode_in, measure, Decoded, EscapeError};
pub use keyword::hash as key_hash;
pub use lexer::{Lexer, TemplateSegment};
pub use parser::{parse_expression, parse_script, Parser, ParserOptions, Program};
pub use regex::{BasicRegexScanner, RegexError, RegexErrorKind, RegexLiteral, RegexScanner};
pub use scope::{Binding, FunctionScope, ScopeId, ScopeKind, ScopeResolver, ScopeTree, Slot};
pub use span::{LineIndex, Span};
pub use token::{Builtin, BuiltinClass, Token, TokenKind};
