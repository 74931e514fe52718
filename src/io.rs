//! # Io Module
//!
//! Byte-at-a-time I/O for the `.` and `,` commands. The engine never
//! touches stdio directly; callers hand it a reader and a writer, which
//! keeps execution fully testable against in-memory buffers.

use std::io::{self, Read, Write};

use crate::error::{TapirError, TapirResult};

/// The I/O endpoints a program run reads from and writes to.
///
/// Failures on either side are fatal: they surface as `Io`-kind errors
/// and abort execution.
pub struct Io<'a> {
    input: &'a mut dyn Read,
    output: &'a mut dyn Write,
}

impl<'a> Io<'a> {
    /// Creates an I/O pair from any reader and writer.
    pub fn new(input: &'a mut dyn Read, output: &'a mut dyn Write) -> Self {
        Self { input, output }
    }

    /// Reads one byte from the input source. Returns 0 at EOF.
    pub fn read_byte(&mut self) -> TapirResult<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(0),
                Ok(_) => return Ok(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TapirError::io(e)),
            }
        }
    }

    /// Writes one byte to the output sink.
    pub fn write_byte(&mut self, byte: u8) -> TapirResult<()> {
        self.output.write_all(&[byte]).map_err(TapirError::io)
    }

    /// Flushes the output sink. The binary calls this once a run
    /// finishes so buffered program output reaches the terminal.
    pub fn flush(&mut self) -> TapirResult<()> {
        self.output.flush().map_err(TapirError::io)
    }
}
