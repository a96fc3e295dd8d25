use std::fs;
use std::io;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rask::ast::Program;
use rask::interpreter::Interpreter;
use rask::{lexer, parser};

const WORKLOADS: [(&str, &str); 2] = [
    ("fib", "tests/programs/fib.rk"),
    ("loops", "tests/programs/while_break.rk"),
];

fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}

fn load_program(path: &str) -> Program {
    let source = load_source(path);
    let tokens = lexer::tokenize(&source).unwrap_or_else(|err| panic!("tokenize {path}: {err}"));
    parser::parse(tokens).unwrap_or_else(|err| panic!("parse {path}: {err}"))
}

fn bench_frontend(c: &mut Criterion) {
    for (label, path) in WORKLOADS {
        let source = load_source(path);

        c.bench_function(&format!("frontend_tokenize_parse_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(&source)).expect("tokenize");
                let program = parser::parse(tokens).expect("parse");
                black_box(program);
            })
        });
    }
}

fn bench_interpreter(c: &mut Criterion) {
    for (label, path) in WORKLOADS {
        let program = load_program(path);

        c.bench_function(&format!("interpreter_run_{label}"), |b| {
            b.iter(|| {
                let mut interpreter = Interpreter::with_io(io::sink(), io::empty());
                let value = interpreter.run(black_box(&program)).expect("run");
                black_box(value);
            })
        });
    }
}

criterion_group!(benches, bench_frontend, bench_interpreter);
criterion_main!(benches);
