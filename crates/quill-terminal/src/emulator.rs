//! Client-side terminal emulator: a VTE parser driving a [`Grid`].
//!
//! The emulator receives PTY output verbatim; no transformation happens on
//! the way in; control sequences are interpreted here.

use vte::{Params, Perform};

use crate::grid::Grid;

/// One emulator instance per terminal tab: screen buffer, cursor and
/// scrollback, fed from raw PTY bytes.
pub struct Emulator {
    grid: Grid,
    parser: vte::Parser,
}

impl Emulator {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            grid: Grid::new(cols as usize, rows as usize),
            parser: vte::Parser::new(),
        }
    }

    /// Feed raw bytes from the PTY into the parser, updating the grid.
    pub fn process(&mut self, bytes: &[u8]) {
        // `parser` and `grid` are disjoint fields, so the two mutable
        // borrows are fine.
        self.parser.advance(&mut self.grid, bytes);
    }

    /// Append a host-generated notice line (bypasses the parser).
    pub fn feed_line(&mut self, text: &str) {
        self.grid.feed_line(text);
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.grid.resize(cols as usize, rows as usize);
    }

    pub fn cols(&self) -> u16 {
        self.grid.cols as u16
    }

    pub fn rows(&self) -> u16 {
        self.grid.rows as u16
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

// ---------------------------------------------------------------------------
// Perform implementation for Grid
// ---------------------------------------------------------------------------

impl Perform for Grid {
    fn print(&mut self, c: char) {
        self.put_char(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x08 => self.backspace(),       // BS
            0x09 => self.tab(),             // HT
            0x0A..=0x0C => self.newline(),  // LF, VT, FF
            0x0D => self.carriage_return(), // CR
            0x07 => {}                      // BEL
            _ => {
                tracing::trace!("unhandled execute byte: 0x{byte:02X}");
            }
        }
    }

    fn csi_dispatch(&mut self, params: &Params, _intermediates: &[u8], _ignore: bool, action: char) {
        let mut flat = [0u16; 8];
        let mut len = 0;
        for sub in params.iter() {
            if len < flat.len() {
                flat[len] = sub[0];
                len += 1;
            }
        }
        let p1 = flat.first().copied().unwrap_or(0);
        let p2 = flat.get(1).copied().unwrap_or(0);
        let p1_one = p1.max(1) as i32;

        match action {
            'A' => self.move_cursor_relative(-p1_one, 0),
            'B' => self.move_cursor_relative(p1_one, 0),
            'C' => self.move_cursor_relative(0, p1_one),
            'D' => self.move_cursor_relative(0, -p1_one),
            'G' => {
                let (row, _) = self.cursor();
                self.move_cursor(row, (p1.max(1) as usize) - 1);
            }
            'H' | 'f' => {
                self.move_cursor((p1.max(1) as usize) - 1, (p2.max(1) as usize) - 1);
            }
            'd' => {
                let (_, col) = self.cursor();
                self.move_cursor((p1.max(1) as usize) - 1, col);
            }
            'J' => self.erase_in_display(p1),
            'K' => self.erase_in_line(p1),
            // SGR and mode toggles carry styling/behavior the presentation
            // layer owns; the grid ignores them.
            'm' | 'h' | 'l' | 'r' => {}
            _ => {
                tracing::trace!("unhandled CSI action: {action}");
            }
        }
    }

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_printed() {
        let mut emu = Emulator::new(20, 4);
        emu.process(b"hello");
        assert_eq!(emu.grid().row_text(0), "hello");
    }

    #[test]
    fn crlf_moves_to_next_line() {
        let mut emu = Emulator::new(20, 4);
        emu.process(b"one\r\ntwo");
        assert_eq!(emu.grid().row_text(0), "one");
        assert_eq!(emu.grid().row_text(1), "two");
    }

    #[test]
    fn cursor_home_overwrites() {
        let mut emu = Emulator::new(20, 4);
        emu.process(b"abcdef");
        emu.process(b"\x1b[1;1HX");
        assert_eq!(emu.grid().row_text(0), "Xbcdef");
    }

    #[test]
    fn erase_display_sequence_clears_screen() {
        let mut emu = Emulator::new(20, 4);
        emu.process(b"garbage\r\nlines");
        emu.process(b"\x1b[2J");
        assert_eq!(emu.grid().visible_text(), "");
    }

    #[test]
    fn sgr_colors_are_ignored_but_text_kept() {
        let mut emu = Emulator::new(20, 4);
        emu.process(b"\x1b[1;32mgreen\x1b[0m");
        assert_eq!(emu.grid().row_text(0), "green");
    }

    #[test]
    fn erase_to_end_of_line() {
        let mut emu = Emulator::new(20, 4);
        emu.process(b"abcdef");
        emu.process(b"\x1b[4G\x1b[K");
        assert_eq!(emu.grid().row_text(0), "abc");
    }

    #[test]
    fn resize_updates_dimensions() {
        let mut emu = Emulator::new(80, 24);
        emu.resize(120, 40);
        assert_eq!(emu.cols(), 120);
        assert_eq!(emu.rows(), 40);
    }

    #[test]
    fn utf8_across_chunk_boundary() {
        let mut emu = Emulator::new(20, 4);
        let bytes = "héllo".as_bytes();
        // Split in the middle of the two-byte 'é' sequence.
        emu.process(&bytes[..2]);
        emu.process(&bytes[2..]);
        assert_eq!(emu.grid().row_text(0), "héllo");
    }
}
