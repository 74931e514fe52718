//! # Tape Module
//!
//! The runtime state of a Brainfuck program: a fixed array of 30 000
//! byte cells and a cursor. Cell arithmetic wraps modulo 256; cursor
//! moves clamp at both ends of the tape; writes through an out-of-range
//! offset are skipped.
//!
//! ## Key Design
//! - Cursor-relative accessors (`add`, `copy_to`, ...) serve the
//!   interpreter, which always operates at the real cursor.
//! - Offset-relative accessors (`add_at`, `copy_at`, ...) serve the
//!   specializer, whose batched static offset stands in for cursor moves
//!   that were never materialized. Effective addresses clamp into the
//!   tape the same way sequential cursor moves would.
//! - Stride-1 scans use `memchr`/`memrchr` to locate the first zero cell.

/// Number of cells on the tape.
pub const TAPE_LEN: usize = 30_000;

/// A fixed-size byte tape with a movable cursor.
///
/// Cells start zeroed and the cursor starts at cell 0. The tape outlives
/// a single program run; the REPL reuses one tape across inputs.
pub struct Tape {
    cells: Vec<u8>,
    cursor: usize,
}

impl Tape {
    /// Creates a zeroed tape with the cursor at cell 0.
    pub fn new() -> Self {
        Self {
            cells: vec![0; TAPE_LEN],
            cursor: 0,
        }
    }

    /// Current cursor position.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Reads the cell at an absolute index.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.cells[index]
    }

    /// Writes the cell at an absolute index.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        self.cells[index] = value;
    }

    /// Reads the cell under the cursor.
    #[inline]
    pub fn current(&self) -> u8 {
        self.cells[self.cursor]
    }

    /// Writes the cell under the cursor.
    #[inline]
    pub fn set_current(&mut self, value: u8) {
        self.cells[self.cursor] = value;
    }

    /// Resets every cell to zero and the cursor to cell 0.
    pub fn reset(&mut self) {
        self.cells.fill(0);
        self.cursor = 0;
    }

    // -------------------------------------------------------------------------
    // CURSOR MOVEMENT
    // -------------------------------------------------------------------------

    /// Moves the cursor left, clamping at cell 0.
    #[inline]
    pub fn move_left(&mut self, count: usize) {
        self.cursor = self.cursor.saturating_sub(count);
    }

    /// Moves the cursor right, clamping at the last cell.
    #[inline]
    pub fn move_right(&mut self, count: usize) {
        self.cursor = (self.cursor + count).min(TAPE_LEN - 1);
    }

    /// Moves the cursor by a signed delta, clamping at both ends.
    #[inline]
    pub fn advance(&mut self, delta: isize) {
        self.cursor = (self.cursor as isize + delta).clamp(0, TAPE_LEN as isize - 1) as usize;
    }

    // -------------------------------------------------------------------------
    // CURSOR-RELATIVE CELL OPS (interpreter)
    // -------------------------------------------------------------------------

    /// Adds a folded run to the current cell, modulo 256.
    #[inline]
    pub fn add(&mut self, count: usize) {
        self.add_at(0, (count % 256) as u8);
    }

    /// Subtracts a folded run from the current cell, modulo 256.
    #[inline]
    pub fn sub(&mut self, count: usize) {
        self.sub_at(0, (count % 256) as u8);
    }

    /// Sets the current cell to zero.
    #[inline]
    pub fn clear(&mut self) {
        self.cells[self.cursor] = 0;
    }

    /// Adds the current cell into the cell at `offset`, then zeroes the
    /// current cell. The target write is skipped when `cursor + offset`
    /// falls off the tape.
    #[inline]
    pub fn copy_to(&mut self, offset: isize) {
        self.copy_at(0, offset);
    }

    /// Adds `current x factor` into each target cell, then zeroes the
    /// current cell. Out-of-range targets are skipped; the final store is
    /// masked to 8 bits.
    #[inline]
    pub fn mul_add(&mut self, targets: &[(isize, u8)]) {
        self.mul_add_at(0, targets);
    }

    // -------------------------------------------------------------------------
    // OFFSET-RELATIVE CELL OPS (specializer)
    // -------------------------------------------------------------------------

    /// Reads the cell at `cursor + off`, with the address clamped into
    /// the tape.
    #[inline]
    pub fn read_at(&self, off: isize) -> u8 {
        self.cells[self.offset_clamped(off)]
    }

    /// Adds into the cell at `cursor + off`, modulo 256.
    #[inline]
    pub fn add_at(&mut self, off: isize, amount: u8) {
        let i = self.offset_clamped(off);
        self.cells[i] = self.cells[i].wrapping_add(amount);
    }

    /// Subtracts from the cell at `cursor + off`, modulo 256.
    #[inline]
    pub fn sub_at(&mut self, off: isize, amount: u8) {
        let i = self.offset_clamped(off);
        self.cells[i] = self.cells[i].wrapping_sub(amount);
    }

    /// Zeroes the cell at `cursor + off`.
    #[inline]
    pub fn clear_at(&mut self, off: isize) {
        let i = self.offset_clamped(off);
        self.cells[i] = 0;
    }

    /// `Copy` against a batched base: the source cell is `cursor + off`,
    /// the target sits `delta` cells away from it.
    pub fn copy_at(&mut self, off: isize, delta: isize) {
        let base = self.offset_clamped(off);
        let value = self.cells[base];
        if let Some(target) = Self::index_from(base, delta) {
            self.cells[target] = self.cells[target].wrapping_add(value);
        }
        self.cells[base] = 0;
    }

    /// `MulAdd` against a batched base. Target order is ascending offset;
    /// modulo-256 addition makes any order equivalent, but a fixed order
    /// keeps intermediate states reproducible.
    pub fn mul_add_at(&mut self, off: isize, targets: &[(isize, u8)]) {
        let base = self.offset_clamped(off);
        let value = self.cells[base];
        for &(delta, factor) in targets {
            if let Some(target) = Self::index_from(base, delta) {
                self.cells[target] = self.cells[target].wrapping_add(value.wrapping_mul(factor));
            }
        }
        self.cells[base] = 0;
    }

    // -------------------------------------------------------------------------
    // SCANS
    // -------------------------------------------------------------------------

    /// Steps the cursor left by `stride` until it lands on a zero cell.
    /// A step that would leave the tape clamps the cursor at cell 0 and
    /// terminates.
    pub fn scan_left(&mut self, stride: usize) {
        if stride == 1 {
            self.cursor = match memchr::memrchr(0, &self.cells[..=self.cursor]) {
                Some(i) => i,
                None => 0,
            };
            return;
        }
        while self.cells[self.cursor] != 0 {
            match self.cursor.checked_sub(stride) {
                Some(next) => self.cursor = next,
                None => {
                    self.cursor = 0;
                    break;
                }
            }
        }
    }

    /// Steps the cursor right by `stride` until it lands on a zero cell.
    /// A step that would leave the tape clamps the cursor at the last
    /// cell and terminates.
    pub fn scan_right(&mut self, stride: usize) {
        if stride == 1 {
            self.cursor = match memchr::memchr(0, &self.cells[self.cursor..]) {
                Some(i) => self.cursor + i,
                None => TAPE_LEN - 1,
            };
            return;
        }
        while self.cells[self.cursor] != 0 {
            let next = self.cursor + stride;
            if next >= TAPE_LEN {
                self.cursor = TAPE_LEN - 1;
                break;
            }
            self.cursor = next;
        }
    }

    // -------------------------------------------------------------------------
    // ADDRESSING
    // -------------------------------------------------------------------------

    /// Effective address for `cursor + off`, clamped into the tape. This
    /// mirrors what sequential clamped cursor moves would have reached.
    #[inline]
    fn offset_clamped(&self, off: isize) -> usize {
        (self.cursor as isize + off).clamp(0, TAPE_LEN as isize - 1) as usize
    }

    /// Address `delta` cells away from `base`, or `None` when it falls
    /// off the tape.
    #[inline]
    fn index_from(base: usize, delta: isize) -> Option<usize> {
        let target = base as isize + delta;
        if (0..TAPE_LEN as isize).contains(&target) {
            Some(target as usize)
        } else {
            None
        }
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}
