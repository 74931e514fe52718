//! # Compiler Module
//!
//! Drives the lexer and builds the linked, optimized IR in a single
//! pass. Bracket pairing, loop rewriting, and the tolerance rules for
//! malformed source all live here.
//!
//! ## Key Design
//! - Brackets link inline: `LoopOpen` is emitted with a placeholder and
//!   patched when its `LoopClose` arrives, the same emit-and-patch scheme
//!   used for jump offsets in any single-pass bytecode compiler.
//! - Loop rewriting happens at close time, so inner loops are already in
//!   final form (or already rewritten away) when an outer loop is
//!   examined; link indices never need fixing up after a rewrite.
//! - Malformed source is tolerated, never reported: a stray `]` is
//!   dropped on the spot; stray `[`s are dropped at end of input with
//!   their body ops preserved, after which surviving bracket pairs are
//!   relinked against the shifted indices.

use crate::ir::{Op, Program};
use crate::lexer::Lexer;
use crate::patterns;
use crate::token::Token;

// -----------------------------------------------------------------------------
// COMPILER STATE
// -----------------------------------------------------------------------------

/// The IR compiler. Consumes a source buffer, produces a `Program`.
pub struct Compiler {
    /// Ops emitted so far.
    ops: Vec<Op>,
    /// Indices of `LoopOpen` ops still waiting for their `]`.
    open_stack: Vec<usize>,
    /// Whether recognized loops are rewritten into their closed forms.
    rewrite_loops: bool,
}

impl Compiler {
    /// Creates a compiler that rewrites recognized loops (the AOT path).
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            open_stack: Vec::new(),
            rewrite_loops: true,
        }
    }

    /// Creates a compiler that only folds and links, leaving every loop
    /// in place. The hot-loop interpreter recognizes patterns at run
    /// time instead.
    pub fn unoptimized() -> Self {
        Self {
            rewrite_loops: false,
            ..Self::new()
        }
    }

    /// Compiles a source buffer. Infallible: unknown bytes are comments
    /// and unmatched brackets are dropped, so every input has an IR.
    pub fn compile(mut self, source: &[u8]) -> Program {
        let mut lexer = Lexer::new(source);

        while let Some(token) = lexer.next_token() {
            match token {
                Token::MoveLeft(count) => self.ops.push(Op::MoveLeft { count }),
                Token::MoveRight(count) => self.ops.push(Op::MoveRight { count }),
                Token::Add(count) => self.ops.push(Op::Add { count }),
                Token::Sub(count) => self.ops.push(Op::Sub { count }),
                Token::Output => self.ops.push(Op::Output),
                Token::Input => self.ops.push(Op::Input),
                Token::LoopOpen => {
                    self.open_stack.push(self.ops.len());
                    // Placeholder link; patched in close_loop.
                    self.ops.push(Op::LoopOpen { close: usize::MAX });
                }
                Token::LoopClose => self.close_loop(),
            }
        }

        self.discard_unmatched();
        Program { ops: self.ops }
    }

    // -------------------------------------------------------------------------
    // LOOP CLOSING — link or rewrite
    // -------------------------------------------------------------------------

    /// Handles a `]`: pops the matching `[`, tries to rewrite the loop
    /// into a closed form, and otherwise links the bracket pair.
    fn close_loop(&mut self) {
        let open = match self.open_stack.pop() {
            Some(index) => index,
            // Stray `]` with no matching `[`: dropped silently.
            None => return,
        };

        if self.rewrite_loops {
            if let Some(rewrite) = patterns::analyze(&self.ops[open + 1..]) {
                self.ops.truncate(open);
                self.ops.push(rewrite.into_op());
                return;
            }
        }

        let close = self.ops.len();
        self.ops.push(Op::LoopClose { open });
        self.ops[open] = Op::LoopOpen { close };
    }

    /// Drops `LoopOpen` ops left unmatched at end of input. Their body
    /// ops stay; removal shifts indices, so surviving pairs are relinked.
    fn discard_unmatched(&mut self) {
        if self.open_stack.is_empty() {
            return;
        }

        let strays = std::mem::take(&mut self.open_stack);
        for &index in strays.iter().rev() {
            self.ops.remove(index);
        }
        relink(&mut self.ops);
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Recomputes bracket links from scratch. Every bracket in `ops` has a
/// partner by the time this runs; pairs are matched with a plain index
/// stack.
fn relink(ops: &mut [Op]) {
    let mut stack = Vec::new();
    for i in 0..ops.len() {
        match ops[i] {
            Op::LoopOpen { .. } => stack.push(i),
            Op::LoopClose { .. } => {
                if let Some(open) = stack.pop() {
                    ops[open] = Op::LoopOpen { close: i };
                    ops[i] = Op::LoopClose { open };
                }
            }
            _ => {}
        }
    }
}
