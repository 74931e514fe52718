//! # Interp Module
//!
//! Direct IR interpretation with hot-loop specialization. Uses a tight
//! `match`-based dispatch loop; loop heads keep an execution counter in
//! an `FxHashMap`, and once a loop turns hot its body is analyzed for a
//! closed form that replaces iteration from then on.
//!
//! ## Key Design
//! - Counters and analysis verdicts live in sparse maps keyed by op
//!   index; the IR itself stays immutable.
//! - Analysis runs at most once per loop: the verdict is cached, and
//!   "no pattern here" is itself a verdict, so cold bodies are never
//!   re-walked.
//! - One interpreter instance is tied to one program; the maps are
//!   meaningless against another op sequence.

use rustc_hash::FxHashMap;

use crate::error::TapirResult;
use crate::io::Io;
use crate::ir::{Op, Program};
use crate::patterns::{self, LoopRewrite};
use crate::tape::Tape;

/// Loop-head executions before the body is analyzed for a closed form.
pub const HOT_THRESHOLD: u32 = 10;

// -----------------------------------------------------------------------------
// INTERPRETER STATE
// -----------------------------------------------------------------------------

/// The hot-loop interpreter.
pub struct Interp {
    /// Executions per `LoopOpen` index.
    hot_counts: FxHashMap<usize, u32>,
    /// Cached analysis verdict per `LoopOpen` index. `None` inside the
    /// map means "analyzed, no pattern"; the body is never re-walked.
    patterns: FxHashMap<usize, Option<LoopRewrite>>,
    /// Hotness threshold; `u32::MAX` disables specialization entirely.
    threshold: u32,
}

impl Interp {
    /// Creates an interpreter with the default hotness threshold.
    pub fn new() -> Self {
        Self::with_threshold(HOT_THRESHOLD)
    }

    /// Creates an interpreter with a custom hotness threshold. Passing
    /// `u32::MAX` yields plain direct interpretation with no rewriting.
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            hot_counts: FxHashMap::default(),
            patterns: FxHashMap::default(),
            threshold,
        }
    }

    // -------------------------------------------------------------------------
    // MAIN DISPATCH LOOP
    // -------------------------------------------------------------------------

    /// Executes the program against the given tape and I/O endpoints.
    ///
    /// # Errors
    /// Propagates I/O failures from the sinks; these abort the run.
    pub fn run(&mut self, program: &Program, tape: &mut Tape, io: &mut Io<'_>) -> TapirResult<()> {
        let ops = &program.ops;
        let mut pc = 0;

        while pc < ops.len() {
            match &ops[pc] {
                Op::MoveLeft { count } => tape.move_left(*count),
                Op::MoveRight { count } => tape.move_right(*count),
                Op::Add { count } => tape.add(*count),
                Op::Sub { count } => tape.sub(*count),
                Op::Output => io.write_byte(tape.current())?,
                Op::Input => {
                    let byte = io.read_byte()?;
                    tape.set_current(byte);
                }

                Op::LoopOpen { close } => {
                    if tape.current() == 0 {
                        pc = close + 1;
                        continue;
                    }

                    let count = {
                        let entry = self.hot_counts.entry(pc).or_insert(0);
                        *entry += 1;
                        *entry
                    };

                    if count >= self.threshold {
                        let verdict = self
                            .patterns
                            .entry(pc)
                            .or_insert_with(|| patterns::analyze(&ops[pc + 1..*close]));
                        if let Some(rewrite) = verdict.as_ref() {
                            rewrite.apply(tape);
                            pc = close + 1;
                            continue;
                        }
                    }
                    // Not hot, or no closed form: iterate the body.
                }
                Op::LoopClose { open } => {
                    if tape.current() != 0 {
                        pc = open + 1;
                        continue;
                    }
                }

                Op::Zero => tape.clear(),
                Op::Copy { offset } => tape.copy_to(*offset),
                Op::MulAdd { targets } => tape.mul_add(targets),
                Op::ScanLeft { stride } => tape.scan_left(*stride),
                Op::ScanRight { stride } => tape.scan_right(*stride),
            }
            pc += 1;
        }

        Ok(())
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}
