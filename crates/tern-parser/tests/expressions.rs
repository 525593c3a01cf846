//! End-to-end behaviour of the expression front end.

use tern_parser::{
    parse_expression, parse_script, Arena, ErrorKind, LexErrorKind, Lexer, NodeId, NodeKind,
    ParseError, Parser, ParserOptions, Span, SyntaxErrorKind, TokenKind,
};

fn parse(source: &str) -> String {
    let arena = Arena::new();
    let result = match parse_expression(&arena, source, ParserOptions::default()) {
        Ok(program) => program.display(),
        Err(err) => panic!("{source}: {err}"),
    };
    result
}

fn script(source: &str) -> String {
    let arena = Arena::new();
    let result = match parse_script(&arena, source, ParserOptions::default()) {
        Ok(program) => program.display(),
        Err(err) => panic!("{source}: {err}"),
    };
    result
}

fn parse_err(source: &str) -> ParseError {
    let arena = Arena::new();
    let result = match parse_expression(&arena, source, ParserOptions::default()) {
        Ok(program) => panic!("{source}: parsed as {}", program.display()),
        Err(err) => err,
    };
    result
}

fn number(source: &str) -> f64 {
    let mut lexer = Lexer::new(source);
    match lexer.next_token().unwrap().kind {
        TokenKind::Number(n) => n,
        kind => panic!("{source}: lexed as {kind:?}"),
    }
}

// =============================================================================
// Numbers
// =============================================================================

#[test]
fn numeric_literals_survive_formatting() {
    for source in ["0", "7", "42", "3.25", "1e21", "0.000001", "0x1F", "0o17", "0b1011", "0XFF"] {
        let value = number(source);
        let formatted = value.to_string();
        assert_eq!(number(&formatted), value, "{source}");
    }
}

#[test]
fn numeric_separators() {
    assert_eq!(number("1_000"), 1000.0);
    assert_eq!(number("0xF_F"), 255.0);
    assert_eq!(number("0b1_0"), 2.0);

    for source in ["1__000", "1000_", "1_.5", "1e_5"] {
        let err = parse_err(source);
        assert_eq!(
            err.kind,
            ErrorKind::Lex(LexErrorKind::InvalidNumericSeparator),
            "{source}"
        );
    }

    // A leading underscore starts an identifier.
    assert_eq!(parse("_1000"), "_1000");
}

#[test]
fn illegal_numbers() {
    for source in ["0x", "0b2", "0o8", "01", "1e"] {
        let err = parse_err(source);
        assert_eq!(err.kind, ErrorKind::Lex(LexErrorKind::IllegalByte), "{source}");
    }
}

// =============================================================================
// Associativity and Precedence
// =============================================================================

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(parse("a-b-c"), parse("(a-b)-c"));
    assert_ne!(parse("a-b-c"), parse("a-(b-c)"));
}

#[test]
fn exponentiation_is_right_associative() {
    assert_eq!(parse("2**3**2"), "EXPONENT(2, EXPONENT(3, 2))");
    assert_eq!(parse("(-2)**2"), "EXPONENT(-2, 2)");
    assert_eq!(parse("2**-2"), "EXPONENT(2, -2)");

    for source in ["-2**2", "2**-2**2", "!a ** b"] {
        let err = parse_err(source);
        assert_eq!(
            err.kind,
            ErrorKind::Syntax(SyntaxErrorKind::RequiredParenthesization),
            "{source}"
        );
    }
}

#[test]
fn nullish_does_not_mix_with_logical_operators() {
    assert!(parse_err("a ?? b || c").is_syntax());
    assert!(parse_err("a || b ?? c").is_syntax());
    assert_eq!(parse("(a ?? b) || c"), "OR(COALESCE(a, b), c)");
    assert_eq!(parse("a ?? (b || c)"), "COALESCE(a, OR(b, c))");
}

#[test]
fn multiplication_binds_tighter() {
    assert_eq!(parse("1+2*3"), "ADD(1, MULTIPLY(2, 3))");
}

// =============================================================================
// Automatic Semicolon Insertion
// =============================================================================

#[test]
fn increment_after_line_break_starts_a_statement() {
    assert_eq!(script("a\n++\nb"), "a; INCREMENT(b)");
    assert_eq!(script("a\n--b"), "a; DECREMENT(b)");
    assert_eq!(script("a++\nb"), "POST_INCREMENT(a); b");
}

#[test]
fn asi_statement_chain() {
    let arena = Arena::new();
    let program = parse_script(&arena, "a\n++\nb", ParserOptions::default()).unwrap();
    let statements = program.ast.statements(program.root);
    assert_eq!(statements.len(), 2);

    let second = program.ast.right(statements[1]).unwrap();
    assert!(matches!(program.ast.kind(second), NodeKind::Update(_)));
}

// =============================================================================
// Regex and Division
// =============================================================================

#[test]
fn slash_after_value_is_division() {
    assert_eq!(parse("x / 2"), "DIVIDE(x, 2)");
    assert_eq!(parse("x /2/ 1"), "DIVIDE(DIVIDE(x, 2), 1)");
    assert_eq!(parse("(a) / b"), "DIVIDE(a, b)");
}

#[test]
fn slash_in_value_position_is_regex() {
    assert_eq!(parse("x = /ab/g"), "ASSIGN(x, /ab/g)");
    assert_eq!(parse("[/a/, /b/i]"), "[/a/, /b/i]");
    // A line break does not turn a slash after a value into a regex.
    assert_eq!(script("a = 1\n/x/g"), "ASSIGN(a, DIVIDE(DIVIDE(1, x), g))");
}

#[test]
fn regex_after_comment() {
    assert_eq!(parse("x = /*c*/ /ab/g"), "ASSIGN(x, /ab/g)");
    assert_eq!(parse("x = /**/ /a\\/b/"), "ASSIGN(x, /a\\/b/)");
    assert_eq!(script("x = /* c */\n/ab/i"), "ASSIGN(x, /ab/i)");
    assert_eq!(parse("f(/*a*/ /x/, 1)"), "CALL(f, /x/, 1)");
}

#[test]
fn regex_span_starts_at_slash() {
    let arena = Arena::new();
    let program = parse_expression(&arena, "x = /*c*/ /ab/g", ParserOptions::default()).unwrap();
    let assign = program.root.unwrap();
    let regex = program.ast.right(assign).unwrap();
    assert_eq!(program.ast.get(regex).span, Span::new(10, 15));
}

// =============================================================================
// Strings and Templates
// =============================================================================

#[test]
fn unterminated_string_spans_to_end() {
    let err = parse_err("\"abc");
    assert_eq!(err.kind, ErrorKind::Lex(LexErrorKind::UnterminatedString));
    assert_eq!(err.span, Span::new(0, 4));
    assert_eq!(err.to_string(), "SyntaxError: Unterminated string \"\"abc\" in 1");
}

#[test]
fn string_cut_by_line_break_includes_the_break() {
    let err = parse_err("\"abc\nd\"");
    assert_eq!(err.kind, ErrorKind::Lex(LexErrorKind::UnterminatedString));
    assert_eq!(err.span, Span::new(0, 5));
    assert_eq!(err.line, 1);

    let err = parse_err("'ab\r\n'");
    assert_eq!(err.span, Span::new(0, 4));
}

#[test]
fn unicode_escape() {
    assert_eq!(parse("\"\\u0041\""), "\"A\"");
}

#[test]
fn tagged_template_arguments() {
    let arena = Arena::new();
    let program =
        parse_expression(&arena, "tag`a${1}b`", ParserOptions::default()).unwrap();
    let ast = &program.ast;
    let call = program.root.unwrap();

    assert!(matches!(ast.kind(call), NodeKind::FunctionCall { ctor: false }));
    assert_eq!(ast.display(ast.left(call).unwrap()), "tag");

    let args: Vec<NodeId> = ast.arguments(call);
    assert_eq!(args.len(), 2);
    assert_eq!(ast.display(args[0]), "[\"a\", \"b\"]");
    assert_eq!(ast.display(args[1]), "1");
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn dest_points_at_consumer() {
    let arena = Arena::new();
    let program = parse_expression(&arena, "f(a + b, c ? d : e)", ParserOptions::default()).unwrap();
    let ast = &program.ast;
    let call = program.root.unwrap();

    let first = ast.right(call).unwrap();
    let add = ast.left(first).unwrap();
    assert_eq!(ast.get(add).dest, Some(first));
    assert_eq!(ast.get(ast.left(add).unwrap()).dest, Some(add));

    let second = ast.right(first).unwrap();
    assert!(matches!(ast.kind(second), NodeKind::Argument { slot: 1 }));
    let cond = ast.left(second).unwrap();
    let branching = ast.right(cond).unwrap();
    assert_eq!(ast.get(ast.left(branching).unwrap()).dest, Some(cond));
    assert_eq!(ast.get(ast.right(branching).unwrap()).dest, Some(cond));
}

#[test]
fn nesting_limit() {
    let deep = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
    let err = parse_err(&deep);
    assert_eq!(err.kind, ErrorKind::Syntax(SyntaxErrorKind::NestingTooDeep));

    let unary = format!("{}a", "!".repeat(1000));
    assert!(matches!(
        parse_err(&unary).kind,
        ErrorKind::Syntax(SyntaxErrorKind::NestingTooDeep)
    ));

    let arena = Arena::new();
    let options = ParserOptions { max_depth: 8 };
    assert!(parse_expression(&arena, "((((((((((1))))))))))", options).is_err());
    assert!(parse_expression(&arena, "(1)", options).is_ok());
}

#[test]
fn parser_stops_before_following_token() {
    let arena = Arena::new();
    let mut parser = Parser::new(&arena, "a = 1 }", ParserOptions::default());
    let root = parser.parse_expression().unwrap();
    assert_eq!(parser.ast().display(root), "ASSIGN(a, 1)");
    assert_eq!(parser.token().kind, TokenKind::CloseBrace);
}

#[test]
fn error_lines() {
    let err = parse_err("1 +\n\n)");
    assert_eq!(err.line, 3);
    assert_eq!(err.to_string(), "SyntaxError: Unexpected token \")\" in 3");
}

#[test]
fn ast_serializes_to_json() {
    let arena = Arena::new();
    let program = parse_expression(&arena, "-x", ParserOptions::default()).unwrap();
    let json = serde_json::to_value(program.ast.serialize(program.root.unwrap())).unwrap();

    let nodes = json["nodes"].as_array().unwrap();
    let node = |id: &serde_json::Value| nodes.iter().find(|n| &n["id"] == id).unwrap();

    let root = node(&json["root"]);
    assert_eq!(root["kind"]["Unary"], "UnaryNegation");
    assert_eq!(node(&root["left"])["kind"]["Name"]["name"], "x");
}

#[test]
fn long_statement_chain_renders_and_serializes() {
    let source = "a;".repeat(10_000);
    let arena = Arena::new();
    let program = parse_script(&arena, &source, ParserOptions::default()).unwrap();

    let text = program.display();
    assert_eq!(text.matches("a").count(), 10_000);

    let json = serde_json::to_string(&program.ast.serialize(program.root.unwrap())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"].as_array().unwrap().len(), 20_000);
}

#[test]
fn long_sum_renders_and_serializes() {
    let source = format!("1{}", "+1".repeat(20_000));
    let arena = Arena::new();
    let program = parse_expression(&arena, &source, ParserOptions::default()).unwrap();

    let text = program.display();
    assert_eq!(text.matches("ADD(").count(), 20_000);

    let json = serde_json::to_string(&program.ast.serialize(program.root.unwrap())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"].as_array().unwrap().len(), 40_001);
}
