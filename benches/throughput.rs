use criterion::{black_box, criterion_group, criterion_main, Criterion};

use std::io;

use tapir::compiler::Compiler;
use tapir::interp::Interp;
use tapir::io::Io;
use tapir::specializer::Specializer;
use tapir::tape::Tape;

const HELLO: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]\
                     >>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

/// Triple-nested counter: loop-heavy, no I/O, exercises the hot path.
const COUNTER: &str = "++++++++++[>++++++++++[>++++++++++[>+<-]<-]<-]";

fn bench_aot(c: &mut Criterion) {
    let mut group = c.benchmark_group("aot");
    for (name, source) in [("hello", HELLO), ("counter", COUNTER)] {
        let program = Compiler::new().compile(source.as_bytes());
        let routine = Specializer::specialize(&program).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut tape = Tape::new();
                let mut input: &[u8] = b"";
                let mut output = io::sink();
                let mut sinks = Io::new(&mut input, &mut output);
                routine.run(&mut tape, &mut sinks).unwrap();
                black_box(tape.cursor());
            });
        });
    }
    group.finish();
}

fn bench_jit(c: &mut Criterion) {
    let mut group = c.benchmark_group("jit");
    for (name, source) in [("hello", HELLO), ("counter", COUNTER)] {
        let program = Compiler::unoptimized().compile(source.as_bytes());
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut tape = Tape::new();
                let mut input: &[u8] = b"";
                let mut output = io::sink();
                let mut sinks = Io::new(&mut input, &mut output);
                Interp::new().run(&program, &mut tape, &mut sinks).unwrap();
                black_box(tape.cursor());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aot, bench_jit);
criterion_main!(benches);
