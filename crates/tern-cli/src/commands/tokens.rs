//! `tern tokens`: dump the raw token stream.
//!
//! The lexer runs without a parser, so a `/` is always an operator here.
//! Regex literals only show up in `tern parse`.

use super::{fail, Output};
use miette::Result;
use serde::Serialize;
use tern_core::Source;
use tern_parser::{LineIndex, Lexer, ParseError, Span, TokenKind};
use tracing::debug;

#[derive(Debug, Serialize)]
struct TokenView<'a> {
    kind: TokenKind,
    span: Span,
    line: u32,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct TokensBody<'a> {
    tokens: Vec<TokenView<'a>>,
}

pub fn run(input: &Source, json: bool) -> Result<()> {
    let source = input.text.as_str();
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = match lexer.next_token() {
            Ok(token) => token,
            Err(err) => return fail(&ParseError::from_lex(err, source), input, json),
        };
        if token.kind == TokenKind::End {
            break;
        }
        tokens.push(TokenView {
            kind: token.kind,
            span: token.span,
            line: token.line,
            text: source.get(token.span.range()).unwrap_or(""),
        });
    }
    debug!(count = tokens.len(), "lexed");

    if json {
        return Output::new(true, TokensBody { tokens }).print();
    }

    let lines = LineIndex::new(source);
    for token in &tokens {
        let (line, column) = lines.line_col(token.span.start);
        println!("{line}:{column}\t{:?}\t{:?}", token.kind, token.text);
    }
    Ok(())
}
