//! Lexer and expression parser benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tern_parser::{parse_script, Arena, Lexer, ParserOptions, TokenKind};

const SAMPLE_SOURCE: &str = r#"
// Expression statements in the shape request handlers produce
total = price * quantity + (shipping ?? 0) - discount
ratio = count > 0 ? hits / count : 0
key = headers['x-request-id'] || "anonymous"
flags = (mask & 0xFF) << 2 | (mode >>> 1) ^ 0b1010
label = `user ${user.name} has ${user.messages.length} messages`
config = { host: "localhost", port: 8080, secure: false, [prefix + "path"]: "/api" }
items = [1, 2.5, , 1_000_000, -3e-2, "four", /ab+c/gi]
result = JSON.stringify(Object.keys(config).map(parseInt), null, 2)
instance = new Date(Date.now() + 1000 * 60 ** 2)
counter++
typeof callback === "function" && callback(result, !error)
delete cache[key], void 0
"#;

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(SAMPLE_SOURCE));
            while let Ok(token) = lexer.next_token() {
                if token.kind == TokenKind::End {
                    break;
                }
            }
        });
    });

    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("sample", |b| {
        let mut arena = Arena::new();
        b.iter(|| {
            {
                let program =
                    parse_script(&arena, black_box(SAMPLE_SOURCE), ParserOptions::default());
                black_box(program.is_ok());
            }
            arena.reset();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parser);
criterion_main!(benches);
