//! Keyword table and the rolling hash used to look it up.
//!
//! The lexer computes the hash while it scans an identifier, so finding the
//! keyword costs one map probe plus a byte comparison on the (usually single)
//! candidate. The same hash is handed to the scope resolver as a precomputed
//! key for variable lookup.

use crate::token::{Builtin, TokenKind};
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Seed of the djb hash.
pub const HASH_INIT: u32 = 5381;

/// Fold one byte into a djb hash.
#[inline]
pub const fn hash_add(hash: u32, byte: u8) -> u32 {
    (hash << 5).wrapping_add(hash) ^ byte as u32
}

/// Hash a whole name.
pub fn hash(bytes: &[u8]) -> u32 {
    bytes.iter().fold(HASH_INIT, |h, &b| hash_add(h, b))
}

struct Keyword {
    name: &'static str,
    kind: TokenKind,
}

const fn kw(name: &'static str, kind: TokenKind) -> Keyword {
    Keyword { name, kind }
}

static KEYWORDS: &[Keyword] = &[
    kw("undefined", TokenKind::Undefined),
    kw("null", TokenKind::Null),
    kw("false", TokenKind::Boolean(false)),
    kw("true", TokenKind::Boolean(true)),
    kw("NaN", TokenKind::Number(f64::NAN)),
    kw("Infinity", TokenKind::Number(f64::INFINITY)),
    // Operators.
    kw("in", TokenKind::In),
    kw("typeof", TokenKind::Typeof),
    kw("instanceof", TokenKind::Instanceof),
    kw("void", TokenKind::Void),
    kw("new", TokenKind::New),
    kw("delete", TokenKind::Delete),
    kw("yield", TokenKind::Yield),
    // Statements.
    kw("var", TokenKind::Var),
    kw("if", TokenKind::If),
    kw("else", TokenKind::Else),
    kw("while", TokenKind::While),
    kw("do", TokenKind::Do),
    kw("for", TokenKind::For),
    kw("break", TokenKind::Break),
    kw("continue", TokenKind::Continue),
    kw("switch", TokenKind::Switch),
    kw("case", TokenKind::Case),
    kw("default", TokenKind::Default),
    kw("function", TokenKind::Function),
    kw("return", TokenKind::Return),
    kw("with", TokenKind::With),
    kw("try", TokenKind::Try),
    kw("catch", TokenKind::Catch),
    kw("finally", TokenKind::Finally),
    kw("throw", TokenKind::Throw),
    // Bindings.
    kw("this", TokenKind::This),
    kw("arguments", TokenKind::Arguments),
    kw("njs", TokenKind::Builtin(Builtin::Njs)),
    kw("Math", TokenKind::Builtin(Builtin::Math)),
    kw("JSON", TokenKind::Builtin(Builtin::Json)),
    kw("Object", TokenKind::Builtin(Builtin::Object)),
    kw("Array", TokenKind::Builtin(Builtin::Array)),
    kw("Boolean", TokenKind::Builtin(Builtin::Boolean)),
    kw("Number", TokenKind::Builtin(Builtin::Number)),
    kw("String", TokenKind::Builtin(Builtin::String)),
    kw("Function", TokenKind::Builtin(Builtin::Function)),
    kw("RegExp", TokenKind::Builtin(Builtin::RegExp)),
    kw("Date", TokenKind::Builtin(Builtin::Date)),
    kw("Error", TokenKind::Builtin(Builtin::Error)),
    kw("EvalError", TokenKind::Builtin(Builtin::EvalError)),
    kw("InternalError", TokenKind::Builtin(Builtin::InternalError)),
    kw("RangeError", TokenKind::Builtin(Builtin::RangeError)),
    kw("ReferenceError", TokenKind::Builtin(Builtin::ReferenceError)),
    kw("SyntaxError", TokenKind::Builtin(Builtin::SyntaxError)),
    kw("TypeError", TokenKind::Builtin(Builtin::TypeError)),
    kw("URIError", TokenKind::Builtin(Builtin::UriError)),
    kw("MemoryError", TokenKind::Builtin(Builtin::MemoryError)),
    kw("eval", TokenKind::Builtin(Builtin::Eval)),
    kw("toString", TokenKind::Builtin(Builtin::ToString)),
    kw("isNaN", TokenKind::Builtin(Builtin::IsNaN)),
    kw("isFinite", TokenKind::Builtin(Builtin::IsFinite)),
    kw("parseInt", TokenKind::Builtin(Builtin::ParseInt)),
    kw("parseFloat", TokenKind::Builtin(Builtin::ParseFloat)),
    kw("encodeURI", TokenKind::Builtin(Builtin::EncodeUri)),
    kw("encodeURIComponent", TokenKind::Builtin(Builtin::EncodeUriComponent)),
    kw("decodeURI", TokenKind::Builtin(Builtin::DecodeUri)),
    kw("decodeURIComponent", TokenKind::Builtin(Builtin::DecodeUriComponent)),
    kw("require", TokenKind::Builtin(Builtin::Require)),
    kw("setTimeout", TokenKind::Builtin(Builtin::SetTimeout)),
    kw("setImmediate", TokenKind::Builtin(Builtin::SetImmediate)),
    kw("clearTimeout", TokenKind::Builtin(Builtin::ClearTimeout)),
    // Reserved words.
    kw("abstract", TokenKind::Reserved),
    kw("boolean", TokenKind::Reserved),
    kw("byte", TokenKind::Reserved),
    kw("char", TokenKind::Reserved),
    kw("class", TokenKind::Reserved),
    kw("const", TokenKind::Reserved),
    kw("debugger", TokenKind::Reserved),
    kw("double", TokenKind::Reserved),
    kw("enum", TokenKind::Reserved),
    kw("export", TokenKind::Reserved),
    kw("extends", TokenKind::Reserved),
    kw("final", TokenKind::Reserved),
    kw("float", TokenKind::Reserved),
    kw("goto", TokenKind::Reserved),
    kw("implements", TokenKind::Reserved),
    kw("import", TokenKind::Reserved),
    kw("int", TokenKind::Reserved),
    kw("interface", TokenKind::Reserved),
    kw("long", TokenKind::Reserved),
    kw("native", TokenKind::Reserved),
    kw("package", TokenKind::Reserved),
    kw("private", TokenKind::Reserved),
    kw("protected", TokenKind::Reserved),
    kw("public", TokenKind::Reserved),
    kw("short", TokenKind::Reserved),
    kw("static", TokenKind::Reserved),
    kw("super", TokenKind::Reserved),
    kw("synchronized", TokenKind::Reserved),
    kw("throws", TokenKind::Reserved),
    kw("transient", TokenKind::Reserved),
    kw("volatile", TokenKind::Reserved),
];

/// Hash -> indices into `KEYWORDS` sharing that hash.
fn table() -> &'static FxHashMap<u32, Vec<u16>> {
    static TABLE: OnceLock<FxHashMap<u32, Vec<u16>>> = OnceLock::new();

    TABLE.get_or_init(|| {
        let mut map: FxHashMap<u32, Vec<u16>> = FxHashMap::default();
        for (i, keyword) in KEYWORDS.iter().enumerate() {
            map.entry(hash(keyword.name.as_bytes()))
                .or_default()
                .push(i as u16);
        }
        map
    })
}

/// Find the keyword kind for `text`, given its precomputed hash.
pub fn lookup(text: &[u8], key_hash: u32) -> Option<TokenKind> {
    table()
        .get(&key_hash)?
        .iter()
        .map(|&i| &KEYWORDS[i as usize])
        .find(|keyword| keyword.name.as_bytes() == text)
        .map(|keyword| keyword.kind)
}
