//! # Specializer Module
//!
//! Ahead-of-time specialization: lowers a compiled program into a
//! `Routine`, a reduced step sequence executed by a tight dispatch loop.
//! The routine borrows nothing from the IR; every step carries its own
//! constants.
//!
//! ## Offset batching
//! Cursor moves are not materialized one by one. A running `static_off`
//! accumulates the net movement, and every memory-touching step is
//! emitted against `cursor + static_off + k` directly. The offset is
//! flushed (a single `Advance` step) only where the real cursor value
//! matters: before `Input`, before scans, at both loop brackets, and at
//! the end of the program. Inside a straight-line block, a hundred `>`s
//! cost nothing at run time.

use std::fmt;

use crate::error::{TapirError, TapirResult};
use crate::io::Io;
use crate::ir::{Op, Program};
use crate::tape::Tape;

// -----------------------------------------------------------------------------
// STEP — Reduced Instruction Set
// -----------------------------------------------------------------------------

/// One step of a specialized routine. Offsets are relative to the live
/// cursor; `Advance` is the flushed form of batched moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `cursor += delta`, clamped at both tape ends.
    Advance { delta: isize },
    /// `tape[cursor + off] += amount` (mod 256).
    Add { off: isize, amount: u8 },
    /// `tape[cursor + off] -= amount` (mod 256).
    Sub { off: isize, amount: u8 },
    /// `tape[cursor + off] = 0`.
    Clear { off: isize },
    /// Writes `tape[cursor + off]` to the output sink.
    Output { off: isize },
    /// Reads one byte into the current cell. Only emitted flushed.
    Input,
    /// `tape[cursor + off + delta] += tape[cursor + off]`, then the
    /// source cell is zeroed.
    Copy { off: isize, delta: isize },
    /// Multiply-add fan-out from `cursor + off`, then the source cell is
    /// zeroed.
    MulAdd { off: isize, targets: Vec<(isize, u8)> },
    /// Strided scan left for a zero cell. Only emitted flushed.
    ScanLeft { stride: usize },
    /// Strided scan right for a zero cell. Only emitted flushed.
    ScanRight { stride: usize },
    /// Loop head: jump to `target` when the current cell is zero.
    JumpIfZero { target: usize },
    /// Loop tail: jump to `target` when the current cell is nonzero.
    JumpIfNonzero { target: usize },
}

// -----------------------------------------------------------------------------
// ROUTINE
// -----------------------------------------------------------------------------

/// A specialized routine: the whole program reduced to a flat step
/// sequence, invoked once per run against a caller-owned tape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    /// The step sequence.
    pub steps: Vec<Step>,
}

impl Routine {
    /// Executes the routine to completion.
    ///
    /// # Errors
    /// Propagates I/O failures from the sinks; these abort the run.
    pub fn run(&self, tape: &mut Tape, io: &mut Io<'_>) -> TapirResult<()> {
        let mut pc = 0;

        while pc < self.steps.len() {
            match &self.steps[pc] {
                Step::Advance { delta } => tape.advance(*delta),
                Step::Add { off, amount } => tape.add_at(*off, *amount),
                Step::Sub { off, amount } => tape.sub_at(*off, *amount),
                Step::Clear { off } => tape.clear_at(*off),
                Step::Output { off } => io.write_byte(tape.read_at(*off))?,
                Step::Input => {
                    let byte = io.read_byte()?;
                    tape.set_current(byte);
                }
                Step::Copy { off, delta } => tape.copy_at(*off, *delta),
                Step::MulAdd { off, targets } => tape.mul_add_at(*off, targets),
                Step::ScanLeft { stride } => tape.scan_left(*stride),
                Step::ScanRight { stride } => tape.scan_right(*stride),
                Step::JumpIfZero { target } => {
                    if tape.current() == 0 {
                        pc = *target;
                        continue;
                    }
                }
                Step::JumpIfNonzero { target } => {
                    if tape.current() != 0 {
                        pc = *target;
                        continue;
                    }
                }
            }
            pc += 1;
        }

        Ok(())
    }

    /// Checks the emitted steps for structural damage: jump targets must
    /// land inside the routine (or exactly one past the end, the normal
    /// exit). A violation means the generator itself is broken, so the
    /// error carries the full listing.
    pub fn verify(&self) -> TapirResult<()> {
        for (index, step) in self.steps.iter().enumerate() {
            let target = match step {
                Step::JumpIfZero { target } | Step::JumpIfNonzero { target } => *target,
                _ => continue,
            };
            if target > self.steps.len() {
                return Err(TapirError::compile(format!(
                    "step {index}: jump target {target} outside routine\n{self}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Routine {
    /// Renders the routine as a step listing, one step per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            writeln!(f, "{index:04}  {step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Advance { delta } => write!(f, "advance {delta:+}"),
            Step::Add { off, amount } => write!(f, "add    [{off:+}] {amount}"),
            Step::Sub { off, amount } => write!(f, "sub    [{off:+}] {amount}"),
            Step::Clear { off } => write!(f, "clear  [{off:+}]"),
            Step::Output { off } => write!(f, "out    [{off:+}]"),
            Step::Input => write!(f, "in     [+0]"),
            Step::Copy { off, delta } => write!(f, "copy   [{off:+}] -> [{:+}]", off + delta),
            Step::MulAdd { off, targets } => {
                write!(f, "muladd [{off:+}] ->")?;
                for (delta, factor) in targets {
                    write!(f, " [{:+}]x{}", off + delta, factor)?;
                }
                Ok(())
            }
            Step::ScanLeft { stride } => write!(f, "scanl  {stride}"),
            Step::ScanRight { stride } => write!(f, "scanr  {stride}"),
            Step::JumpIfZero { target } => write!(f, "jz     {target:04}"),
            Step::JumpIfNonzero { target } => write!(f, "jnz    {target:04}"),
        }
    }
}

// -----------------------------------------------------------------------------
// SPECIALIZER
// -----------------------------------------------------------------------------

/// Emits a `Routine` from a compiled program.
pub struct Specializer {
    steps: Vec<Step>,
    /// Net cursor movement not yet materialized as an `Advance`.
    static_off: isize,
    /// Step indices of open `JumpIfZero` heads awaiting their tail.
    open_stack: Vec<usize>,
}

impl Specializer {
    /// Specializes a whole program into one routine.
    ///
    /// # Errors
    /// Returns a `Compile`-kind error when the IR hands us a bracket
    /// structure the generator cannot pair, or when the emitted routine
    /// fails verification. Both carry the step listing.
    pub fn specialize(program: &Program) -> TapirResult<Routine> {
        let mut spec = Self {
            steps: Vec::with_capacity(program.len()),
            static_off: 0,
            open_stack: Vec::new(),
        };

        for op in &program.ops {
            spec.emit(op)?;
        }
        spec.flush();

        if let Some(&open) = spec.open_stack.last() {
            return Err(TapirError::compile(format!(
                "loop head at step {open} never closed\n{}",
                Routine { steps: spec.steps }
            )));
        }

        let routine = Routine { steps: spec.steps };
        routine.verify()?;
        Ok(routine)
    }

    /// Emits the step(s) for one IR op.
    fn emit(&mut self, op: &Op) -> TapirResult<()> {
        match op {
            Op::MoveLeft { count } => self.static_off -= *count as isize,
            Op::MoveRight { count } => self.static_off += *count as isize,
            Op::Add { count } => self.steps.push(Step::Add {
                off: self.static_off,
                amount: (*count % 256) as u8,
            }),
            Op::Sub { count } => self.steps.push(Step::Sub {
                off: self.static_off,
                amount: (*count % 256) as u8,
            }),
            Op::Output => self.steps.push(Step::Output {
                off: self.static_off,
            }),
            Op::Input => {
                self.flush();
                self.steps.push(Step::Input);
            }
            Op::Zero => self.steps.push(Step::Clear {
                off: self.static_off,
            }),
            Op::Copy { offset } => self.steps.push(Step::Copy {
                off: self.static_off,
                delta: *offset,
            }),
            Op::MulAdd { targets } => self.steps.push(Step::MulAdd {
                off: self.static_off,
                targets: targets.clone(),
            }),
            Op::ScanLeft { stride } => {
                self.flush();
                self.steps.push(Step::ScanLeft { stride: *stride });
            }
            Op::ScanRight { stride } => {
                self.flush();
                self.steps.push(Step::ScanRight { stride: *stride });
            }
            Op::LoopOpen { .. } => {
                self.flush();
                self.open_stack.push(self.steps.len());
                // Placeholder target; patched when the tail is emitted.
                self.steps.push(Step::JumpIfZero { target: usize::MAX });
            }
            Op::LoopClose { .. } => {
                self.flush();
                let open = self.open_stack.pop().ok_or_else(|| {
                    TapirError::compile(format!(
                        "loop tail at step {} has no open head\n{}",
                        self.steps.len(),
                        Routine {
                            steps: self.steps.clone()
                        }
                    ))
                })?;
                self.steps.push(Step::JumpIfNonzero { target: open + 1 });
                self.steps[open] = Step::JumpIfZero {
                    target: self.steps.len(),
                };
            }
        }
        Ok(())
    }

    /// Materializes the batched offset. After this the routine's view of
    /// the cursor agrees with the tape's.
    fn flush(&mut self) {
        if self.static_off != 0 {
            self.steps.push(Step::Advance {
                delta: self.static_off,
            });
            self.static_off = 0;
        }
    }
}
