//! # Error Module
//!
//! Unified error types for the tapir engine. Source-level problems
//! (unmatched brackets, unknown bytes) are tolerated silently and never
//! surface here; what remains is I/O failure at runtime and internal
//! failures while emitting or checking a specialized routine.

use std::fmt;
use std::io;

// -----------------------------------------------------------------------------
// ERROR KIND — Stage Classification
// -----------------------------------------------------------------------------

/// Classifies which stage of the engine produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error while emitting or verifying a specialized routine.
    Compile,
    /// Error during execution (interpreter or specialized routine).
    Runtime,
    /// Failure reading from the input source or writing to the output sink.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Compile => write!(f, "CompileError"),
            ErrorKind::Runtime => write!(f, "RuntimeError"),
            ErrorKind::Io => write!(f, "IoError"),
        }
    }
}

// -----------------------------------------------------------------------------
// TAPIR ERROR — Unified Error Type
// -----------------------------------------------------------------------------

/// The unified error type for the whole engine.
///
/// Every error carries a classification (`kind`) and a human-readable
/// `message`. Compile-kind errors embed the rendered routine listing so
/// the generated representation can be inspected.
#[derive(Debug, Clone)]
pub struct TapirError {
    /// Which stage produced this error.
    pub kind: ErrorKind,
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl TapirError {
    /// Creates a new error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a routine-emission error.
    #[inline]
    pub fn compile(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Compile, message)
    }

    /// Creates a runtime error.
    #[inline]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Wraps an I/O failure. Execution aborts on these; there is no retry.
    #[inline]
    pub fn io(err: io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}

impl fmt::Display for TapirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TapirError {}

/// Convenience type alias for Results throughout the engine.
pub type TapirResult<T> = std::result::Result<T, TapirError>;
