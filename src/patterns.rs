//! # Patterns Module
//!
//! Loop idiom recognition. A Brainfuck loop iterates until the current
//! cell is zero; bodies with a fixed per-iteration shape have a closed
//! form the engine can execute in O(1) instead of O(iterations). The same
//! analysis runs in two places: eagerly in the compiler when a loop
//! closes, and lazily in the interpreter when a loop turns hot.
//!
//! ## Recognized shapes
//! - `[-]` / `[+]`: clear the current cell.
//! - Balanced decrement loops: bodies of only moves and adds that return
//!   the cursor to its starting cell and net that cell exactly -1 per
//!   iteration. Each other touched cell then receives
//!   `initial * (per-iteration delta)`, which degenerates to a plain copy
//!   when there is a single target with factor 1, and to a clear when
//!   there are no targets at all.
//! - `[<]` / `[>]` and strided variants: scan for a zero cell.

use std::collections::BTreeMap;

use crate::ir::Op;
use crate::tape::Tape;

// -----------------------------------------------------------------------------
// LOOP REWRITE
// -----------------------------------------------------------------------------

/// The closed form of a recognized loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopRewrite {
    /// Current cell becomes zero.
    Zero,
    /// Current cell is added into the cell at `offset`, then zeroed.
    Copy { offset: isize },
    /// `current x factor` is added into each target, then the current
    /// cell is zeroed. Targets are in ascending offset order.
    MulAdd { targets: Vec<(isize, u8)> },
    /// Cursor steps left by `stride` to the first zero cell.
    ScanLeft { stride: usize },
    /// Cursor steps right by `stride` to the first zero cell.
    ScanRight { stride: usize },
}

impl LoopRewrite {
    /// Converts the rewrite into the IR op that replaces the loop.
    pub fn into_op(self) -> Op {
        match self {
            LoopRewrite::Zero => Op::Zero,
            LoopRewrite::Copy { offset } => Op::Copy { offset },
            LoopRewrite::MulAdd { targets } => Op::MulAdd { targets },
            LoopRewrite::ScanLeft { stride } => Op::ScanLeft { stride },
            LoopRewrite::ScanRight { stride } => Op::ScanRight { stride },
        }
    }

    /// Executes the closed form once against the tape. Used by the
    /// interpreter's hot path in place of iterating the loop body.
    pub fn apply(&self, tape: &mut Tape) {
        match self {
            LoopRewrite::Zero => tape.clear(),
            LoopRewrite::Copy { offset } => tape.copy_to(*offset),
            LoopRewrite::MulAdd { targets } => tape.mul_add(targets),
            LoopRewrite::ScanLeft { stride } => tape.scan_left(*stride),
            LoopRewrite::ScanRight { stride } => tape.scan_right(*stride),
        }
    }
}

// -----------------------------------------------------------------------------
// BODY ANALYSIS
// -----------------------------------------------------------------------------

/// Attempts to recognize a loop body, trying the cheap single-op shapes
/// first. `body` is the op slice strictly between the loop's brackets.
/// Returns `None` when the loop must stay a loop.
pub fn analyze(body: &[Op]) -> Option<LoopRewrite> {
    // Single-op clear: `[-]` and its wraparound twin `[+]`.
    if let [Op::Add { count: 1 }] | [Op::Sub { count: 1 }] = body {
        return Some(LoopRewrite::Zero);
    }

    if let Some(rewrite) = analyze_balanced(body) {
        return Some(rewrite);
    }

    // Single-move scan, any stride.
    match body {
        [Op::MoveLeft { count }] => Some(LoopRewrite::ScanLeft { stride: *count }),
        [Op::MoveRight { count }] => Some(LoopRewrite::ScanRight { stride: *count }),
        _ => None,
    }
}

/// The balanced decrement analysis. Walks the body with a virtual cursor
/// offset, accumulating per-cell deltas modulo 256. The loop has a closed
/// form only when:
/// - the body contains nothing but moves and adds/subs,
/// - the virtual cursor returns to offset 0, and
/// - the net delta at offset 0 is exactly -1, so the loop runs once per
///   unit of the starting value.
fn analyze_balanced(body: &[Op]) -> Option<LoopRewrite> {
    let mut pos: isize = 0;
    let mut deltas: BTreeMap<isize, u8> = BTreeMap::new();

    for op in body {
        match op {
            Op::MoveLeft { count } => pos -= *count as isize,
            Op::MoveRight { count } => pos += *count as isize,
            Op::Add { count } => {
                let delta = deltas.entry(pos).or_insert(0);
                *delta = delta.wrapping_add((*count % 256) as u8);
            }
            Op::Sub { count } => {
                let delta = deltas.entry(pos).or_insert(0);
                *delta = delta.wrapping_sub((*count % 256) as u8);
            }
            _ => return None,
        }
    }

    if pos != 0 {
        return None;
    }

    // The decrementing cell is driven by the loop itself; anything other
    // than a net -1 (e.g. `[->+<-]`, net -2) has no per-unit closed form.
    if deltas.remove(&0) != Some(0u8.wrapping_sub(1)) {
        return None;
    }

    deltas.retain(|_, factor| *factor != 0);

    let mut targets: Vec<(isize, u8)> = deltas.into_iter().collect();
    Some(match targets.len() {
        0 => LoopRewrite::Zero,
        1 if targets[0].1 == 1 => LoopRewrite::Copy {
            offset: targets.remove(0).0,
        },
        _ => LoopRewrite::MulAdd { targets },
    })
}
