use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;
use std::time::Instant;

use tapir::error::TapirResult;
use tapir::io::Io;
use tapir::Mode;

mod repl;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 1 {
        repl::start();
        return;
    }

    let mut timing = false;
    let mut rest: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        if arg == "--time" {
            timing = true;
        } else {
            rest.push(arg.as_str());
        }
    }

    if rest.len() != 2 {
        eprintln!("Usage: tapir [--time] <aot|jit> <file.bf>");
        process::exit(1);
    }

    let mode = match rest[0] {
        "aot" => Mode::Aot,
        "jit" => Mode::Jit,
        other => {
            eprintln!("unknown mode '{}': expected 'aot' or 'jit'", other);
            process::exit(1);
        }
    };

    let source = match fs::read(rest[1]) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading '{}': {}", rest[1], e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&source, mode, timing) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(source: &[u8], mode: Mode, timing: bool) -> TapirResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();
    let mut sinks = Io::new(&mut input, &mut output);

    let started = Instant::now();
    tapir::run(source, mode, &mut sinks)?;
    sinks.flush()?;

    if timing {
        // Stderr, so stdout stays byte-exact program output.
        eprintln!("executed in {:?}", started.elapsed());
        let _ = io::stderr().flush();
    }

    Ok(())
}
