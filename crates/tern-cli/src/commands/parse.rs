//! `tern parse`: print the expression tree.

use super::{fail, Output};
use miette::Result;
use serde::Serialize;
use tern_core::Source;
use tern_parser::{parse_expression, parse_script, Arena, NodeView, ParserOptions};
use tracing::debug;

#[derive(Serialize)]
struct ParseBody<'p, 'a> {
    display: String,
    nodes: usize,
    ast: Option<NodeView<'p, 'a>>,
}

pub fn run(input: &Source, script: bool, options: ParserOptions, json: bool) -> Result<()> {
    let arena = Arena::new();
    let result = if script {
        parse_script(&arena, &input.text, options)
    } else {
        parse_expression(&arena, &input.text, options)
    };

    let program = match result {
        Ok(program) => program,
        Err(err) => return fail(&err, input, json),
    };
    debug!(nodes = program.ast.len(), script, "parsed");

    if json {
        let body = ParseBody {
            display: program.display(),
            nodes: program.ast.len(),
            ast: program.root.map(|root| program.ast.serialize(root)),
        };
        return Output::new(true, body).print();
    }

    println!("{}", program.display());
    Ok(())
}
