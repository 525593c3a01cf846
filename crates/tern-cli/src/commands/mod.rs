//! CLI command implementations.

pub mod parse;
pub mod tokens;
pub mod version;

use miette::{IntoDiagnostic, LabeledSpan, NamedSource, Result};
use serde::Serialize;
use tern_core::version::OUTPUT_SCHEMA_VERSION;
use tern_core::Source;
use tern_parser::ParseError;

/// Envelope for JSON command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub schema_version: u32,
    pub ok: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(ok: bool, body: T) -> Self {
        Self {
            schema_version: OUTPUT_SCHEMA_VERSION,
            ok,
            body,
        }
    }

    pub fn print(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self).into_diagnostic()?;
        println!("{json}");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a ParseError,
}

/// Turn a parse error into a report that underlines the offending text.
pub fn report(err: &ParseError, input: &Source) -> miette::Report {
    let label = match err.kind {
        tern_parser::ErrorKind::Lex(kind) => kind.to_string(),
        tern_parser::ErrorKind::Syntax(kind) => kind.to_string(),
        tern_parser::ErrorKind::Reference(kind) => kind.to_string(),
    };

    miette::miette!(
        labels = vec![LabeledSpan::at(err.span.range(), label)],
        "{err}"
    )
    .with_source_code(NamedSource::new(&input.name, input.text.clone()))
}

/// Print the error as JSON when asked to, then hand back the report.
pub fn fail(err: &ParseError, input: &Source, json: bool) -> Result<()> {
    if json {
        Output::new(false, ErrorBody { error: err }).print()?;
    }
    Err(report(err, input))
}
