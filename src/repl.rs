use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use std::io;

use tapir::io::Io;
use tapir::tape::{Tape, TAPE_LEN};
use tapir::Mode;

pub fn start() {
    let mut editor = match DefaultEditor::new() {
        Ok(ed) => ed,
        Err(e) => {
            eprintln!("failed to initialize REPL: {}", e);
            std::process::exit(1);
        }
    };

    println!("tapir: .exit quits, .reset clears the tape, .tape inspects it");

    // One tape for the whole session; each input line runs against the
    // cells the previous lines left behind.
    let mut tape = Tape::new();

    loop {
        let input = match read_input(&mut editor) {
            Some(line) => line,
            None => break,
        };

        match input.trim() {
            "" => continue,
            ".reset" => {
                tape.reset();
                continue;
            }
            ".tape" => {
                print_tape(&tape);
                continue;
            }
            _ => {}
        }

        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut writer = stdout.lock();
        let mut sinks = Io::new(&mut reader, &mut writer);

        let result = tapir::run_on_tape(input.as_bytes(), Mode::Jit, &mut tape, &mut sinks)
            .and_then(|_| sinks.flush());
        match result {
            Ok(()) => println!(),
            Err(e) => eprintln!("{}", e),
        }
    }
}

fn read_input(editor: &mut DefaultEditor) -> Option<String> {
    let first_line = match editor.readline("bf> ") {
        Ok(line) => line,
        Err(ReadlineError::Eof | ReadlineError::Interrupted) => return None,
        Err(e) => {
            eprintln!("readline error: {}", e);
            return None;
        }
    };

    if first_line.trim() == ".exit" {
        return None;
    }

    let mut buffer = first_line;

    while needs_continuation(&buffer) {
        match editor.readline("..> ") {
            Ok(line) => {
                buffer.push('\n');
                buffer.push_str(&line);
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(e) => {
                eprintln!("readline error: {}", e);
                break;
            }
        }
    }

    let _ = editor.add_history_entry(&buffer);
    Some(buffer)
}

/// More `[` than `]` so far: the loop body is still open, keep reading.
/// A stray `]` counts for nothing, matching the compiler's tolerance.
fn needs_continuation(input: &str) -> bool {
    let mut depth: i32 = 0;
    for &byte in input.as_bytes() {
        match byte {
            b'[' => depth += 1,
            b']' => depth = (depth - 1).max(0),
            _ => {}
        }
    }
    depth > 0
}

/// Prints a window of cells around the cursor, cursor cell bracketed.
fn print_tape(tape: &Tape) {
    let start = tape.cursor().saturating_sub(8);
    let end = (start + 16).min(TAPE_LEN);
    let cells: Vec<String> = (start..end)
        .map(|i| {
            if i == tape.cursor() {
                format!("[{}]", tape.get(i))
            } else {
                tape.get(i).to_string()
            }
        })
        .collect();
    println!("cursor {} | cells {}..{}: {}", tape.cursor(), start, end, cells.join(" "));
}
