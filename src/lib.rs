//! tapir is an optimizing Brainfuck engine. Source is compiled into a
//! flat IR with run-length folding, linked brackets, and idiom loops
//! rewritten into closed-form ops; execution is either ahead-of-time
//! specialization into a reduced step routine, or direct interpretation
//! with hot-loop pattern dispatch.

pub mod compiler;
pub mod error;
pub mod interp;
pub mod io;
pub mod ir;
pub mod lexer;
pub mod patterns;
pub mod specializer;
pub mod tape;
pub mod token;


use crate::compiler::Compiler;
use crate::error::TapirResult;
use crate::interp::Interp;
use crate::io::Io;
use crate::specializer::Specializer;
use crate::tape::Tape;

/// How a program is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compile with loop rewriting, specialize the whole program into a
    /// routine, run the routine.
    Aot,
    /// Compile without loop rewriting, interpret directly, let hot loops
    /// pick up their closed forms at run time.
    Jit,
}

/// Runs a source buffer against a fresh tape with the given I/O
/// endpoints.
///
/// # Errors
/// Propagates I/O failures and specializer-internal failures; source
/// malformedness is tolerated and never an error.
pub fn run(source: &[u8], mode: Mode, io: &mut Io<'_>) -> TapirResult<()> {
    let mut tape = Tape::new();
    run_on_tape(source, mode, &mut tape, io)
}

/// Runs a source buffer against a caller-owned tape. The REPL uses this
/// to keep cell state alive across inputs.
pub fn run_on_tape(source: &[u8], mode: Mode, tape: &mut Tape, io: &mut Io<'_>) -> TapirResult<()> {
    match mode {
        Mode::Aot => {
            let program = Compiler::new().compile(source);
            let routine = Specializer::specialize(&program)?;
            routine.run(tape, io)
        }
        Mode::Jit => {
            let program = Compiler::unoptimized().compile(source);
            Interp::new().run(&program, tape, io)
        }
    }
}
