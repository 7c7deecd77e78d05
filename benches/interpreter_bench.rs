use std::io;

use baby::lexer::tokenize;
use baby::{Environment, Evaluator, parse_str};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

// A reasonably complex program exercising closures, loops and collections
const BENCH_INPUT: &str = r#"
let fib = fun(n) {
    if (n < 2) { return n; }
    fib(n - 1) + fib(n - 2)
};

let map = fun(xs, f) {
    let out = [];
    let i = 0;
    while (i < len(xs)) {
        out = append(out, f(xs[i]));
        i = i + 1;
    }
    out
};

let people = {"name": "Ada", "age": 36, "langs": ["baby", "rust"]};
let older = people."age" + 1;
let doubled = map([1, 2, 3, 4, 5, 6, 7, 8], fun(x) { x * 2 });
let alias =& doubled;
alias = rest(doubled);
fib(15) + older + len(doubled)
"#;

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Interpreter Pipeline");

    group.bench_with_input(
        BenchmarkId::new("tokenize", "program"),
        &BENCH_INPUT,
        |b, input| b.iter(|| tokenize(black_box(input))),
    );

    group.bench_with_input(
        BenchmarkId::new("parse", "program"),
        &BENCH_INPUT,
        |b, input| b.iter(|| parse_str(black_box(input))),
    );

    // Parsing happens once; only evaluation is measured
    let (program, _) = parse_str(BENCH_INPUT);
    group.bench_with_input(BenchmarkId::new("eval", "program"), &program, |b, program| {
        b.iter(|| {
            let mut evaluator = Evaluator::with_output(io::sink());
            let env = Environment::new();
            evaluator.eval_program(black_box(program), &env)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
