//! # Lexer Module
//!
//! Hand-written tokenizer for Brainfuck source. Operates directly on a
//! byte slice: the eight command bytes become tokens, whitespace (tab,
//! LF, CR, space) and every other byte are skipped as commentary.
//!
//! ## Key Features
//! - Run-length folding: adjacent `<`, `>`, `+`, `-` runs collapse into a
//!   single token carrying the accumulated count, even when whitespace or
//!   comment bytes are interspersed within the run.
//! - Brackets and I/O commands are never fused.
//! - Infallible: there is no such thing as a malformed byte.

use crate::token::{is_command, is_fusible, Token};

// -----------------------------------------------------------------------------
// LEXER STATE
// -----------------------------------------------------------------------------

/// The Brainfuck lexer. Converts source bytes into a fused token stream.
pub struct Lexer<'src> {
    /// Source bytes being tokenized.
    source: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source buffer.
    pub fn new(source: &'src [u8]) -> Self {
        Self { source, pos: 0 }
    }

    /// Scans and returns the next token, or `None` at end of input.
    ///
    /// Fusible commands are folded here: after consuming a `+`, the lexer
    /// keeps consuming as long as the next command byte (skipping any
    /// intervening non-command bytes) is also `+`, and emits one
    /// `Add(count)` for the whole run.
    pub fn next_token(&mut self) -> Option<Token> {
        let byte = self.next_command()?;

        if !is_fusible(byte) {
            return Some(Token::from_command(byte, 1));
        }

        let mut count = 1;
        while self.peek_command() == Some(byte) {
            self.next_command();
            count += 1;
        }

        Some(Token::from_command(byte, count))
    }

    /// Collects the remaining tokens into a vector. Empty and
    /// comment-only sources produce an empty vector.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(self.source.len() / 4);
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    // -------------------------------------------------------------------------
    // LOW-LEVEL BYTE OPERATIONS
    // -------------------------------------------------------------------------

    /// Consumes bytes until a command byte is found, returning it.
    #[inline]
    fn next_command(&mut self) -> Option<u8> {
        while self.pos < self.source.len() {
            let byte = self.source[self.pos];
            self.pos += 1;
            if is_command(byte) {
                return Some(byte);
            }
        }
        None
    }

    /// Returns the next command byte without consuming anything.
    #[inline]
    fn peek_command(&self) -> Option<u8> {
        self.source[self.pos..].iter().copied().find(|&b| is_command(b))
    }
}
