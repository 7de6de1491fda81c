//! Character grid backing the client-side terminal emulator: screen buffer,
//! cursor, and bounded scrollback.

use std::collections::VecDeque;

use unicode_width::UnicodeWidthChar;

/// Maximum scrollback lines retained per emulator.
const MAX_SCROLLBACK: usize = 1_000;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub c: char,
    /// 1 = normal, 2 = wide CJK, 0 = continuation of a wide char.
    pub width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self { c: ' ', width: 1 }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

pub struct Grid {
    pub cols: usize,
    pub rows: usize,
    cells: Vec<Vec<Cell>>,
    cursor_row: usize,
    cursor_col: usize,
    scrollback: VecDeque<Vec<Cell>>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cells: Self::blank_cells(cols, rows),
            cursor_row: 0,
            cursor_col: 0,
            scrollback: VecDeque::new(),
        }
    }

    fn blank_cells(cols: usize, rows: usize) -> Vec<Vec<Cell>> {
        (0..rows).map(|_| Self::blank_row(cols)).collect()
    }

    fn blank_row(cols: usize) -> Vec<Cell> {
        vec![Cell::default(); cols]
    }

    // -- cursor -------------------------------------------------------------

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    pub fn move_cursor(&mut self, row: usize, col: usize) {
        self.cursor_row = row.min(self.rows - 1);
        self.cursor_col = col.min(self.cols - 1);
    }

    pub fn move_cursor_relative(&mut self, d_row: i32, d_col: i32) {
        let row = (self.cursor_row as i32 + d_row).clamp(0, self.rows as i32 - 1);
        let col = (self.cursor_col as i32 + d_col).clamp(0, self.cols as i32 - 1);
        self.cursor_row = row as usize;
        self.cursor_col = col as usize;
    }

    // -- writing ------------------------------------------------------------

    /// Write a printable character at the cursor, wrapping at the right
    /// margin and scrolling when the last row overflows.
    pub fn put_char(&mut self, c: char) {
        let width = c.width().unwrap_or(1).clamp(0, 2) as u8;
        if width == 0 {
            return; // zero-width combining marks are not stored
        }

        if self.cursor_col + width as usize > self.cols {
            self.newline();
            self.cursor_col = 0;
        }

        self.cells[self.cursor_row][self.cursor_col] = Cell { c, width };
        if width == 2 && self.cursor_col + 1 < self.cols {
            self.cells[self.cursor_row][self.cursor_col + 1] = Cell { c: ' ', width: 0 };
        }
        self.cursor_col += width as usize;
        if self.cursor_col >= self.cols {
            self.newline();
            self.cursor_col = 0;
        }
    }

    /// Line feed: move the cursor down, scrolling the top row into
    /// scrollback when already on the last row.
    pub fn newline(&mut self) {
        if self.cursor_row + 1 < self.rows {
            self.cursor_row += 1;
        } else {
            let scrolled = self.cells.remove(0);
            self.scrollback.push_back(scrolled);
            if self.scrollback.len() > MAX_SCROLLBACK {
                self.scrollback.pop_front();
            }
            self.cells.push(Self::blank_row(self.cols));
        }
    }

    pub fn carriage_return(&mut self) {
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    /// Advance to the next multiple-of-8 tab stop.
    pub fn tab(&mut self) {
        let next = (self.cursor_col / 8 + 1) * 8;
        self.cursor_col = next.min(self.cols - 1);
    }

    // -- erasing ------------------------------------------------------------

    /// ED, erase in display. 0 = cursor to end, 1 = start to cursor,
    /// 2 and 3 = everything.
    pub fn erase_in_display(&mut self, mode: u16) {
        match mode {
            0 => {
                self.erase_in_line(0);
                for row in self.cursor_row + 1..self.rows {
                    self.cells[row] = Self::blank_row(self.cols);
                }
            }
            1 => {
                self.erase_in_line(1);
                for row in 0..self.cursor_row {
                    self.cells[row] = Self::blank_row(self.cols);
                }
            }
            2 | 3 => {
                self.cells = Self::blank_cells(self.cols, self.rows);
            }
            _ => {}
        }
    }

    /// EL, erase in line. 0 = cursor to end, 1 = start through cursor,
    /// 2 = whole line.
    pub fn erase_in_line(&mut self, mode: u16) {
        let row = &mut self.cells[self.cursor_row];
        match mode {
            0 => {
                for cell in row.iter_mut().skip(self.cursor_col) {
                    *cell = Cell::default();
                }
            }
            1 => {
                for cell in row.iter_mut().take(self.cursor_col + 1) {
                    *cell = Cell::default();
                }
            }
            2 => *row = Self::blank_row(self.cols),
            _ => {}
        }
    }

    // -- resize -------------------------------------------------------------

    /// Resize the grid, preserving content where possible.
    pub fn resize(&mut self, new_cols: usize, new_rows: usize) {
        let new_cols = new_cols.max(1);
        let new_rows = new_rows.max(1);

        for row in &mut self.cells {
            row.resize(new_cols, Cell::default());
        }

        if new_rows < self.rows {
            // Push overflowing top rows into scrollback.
            let overflow = self.rows - new_rows;
            for _ in 0..overflow {
                let scrolled = self.cells.remove(0);
                self.scrollback.push_back(scrolled);
                if self.scrollback.len() > MAX_SCROLLBACK {
                    self.scrollback.pop_front();
                }
            }
        } else {
            for _ in self.rows..new_rows {
                self.cells.push(Self::blank_row(new_cols));
            }
        }

        self.cols = new_cols;
        self.rows = new_rows;
        self.cursor_row = self.cursor_row.min(new_rows - 1);
        self.cursor_col = self.cursor_col.min(new_cols - 1);
    }

    // -- host text injection ------------------------------------------------

    /// Append a host-generated line of plain text (e.g. the "process
    /// exited" notice) on a fresh row, leaving the cursor at the start of
    /// the following line.
    pub fn feed_line(&mut self, text: &str) {
        if self.cursor_col != 0 {
            self.carriage_return();
            self.newline();
        }
        for c in text.chars() {
            self.put_char(c);
        }
        self.carriage_return();
        self.newline();
    }

    // -- inspection ---------------------------------------------------------

    /// Text content of one visible row, trailing blanks trimmed.
    pub fn row_text(&self, row: usize) -> String {
        let mut text: String = self.cells[row]
            .iter()
            .filter(|cell| cell.width != 0)
            .map(|cell| cell.c)
            .collect();
        while text.ends_with(' ') {
            text.pop();
        }
        text
    }

    /// All visible rows joined with newlines, trailing blank rows trimmed.
    pub fn visible_text(&self) -> String {
        let mut lines: Vec<String> = (0..self.rows).map(|r| self.row_text(r)).collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_and_read_back() {
        let mut grid = Grid::new(10, 3);
        for c in "hello".chars() {
            grid.put_char(c);
        }
        assert_eq!(grid.row_text(0), "hello");
        assert_eq!(grid.cursor(), (0, 5));
    }

    #[test]
    fn wraps_at_right_margin() {
        let mut grid = Grid::new(4, 3);
        for c in "abcdef".chars() {
            grid.put_char(c);
        }
        assert_eq!(grid.row_text(0), "abcd");
        assert_eq!(grid.row_text(1), "ef");
    }

    #[test]
    fn newline_on_last_row_scrolls_into_scrollback() {
        let mut grid = Grid::new(5, 2);
        grid.feed_line("one");
        grid.feed_line("two");
        grid.feed_line("three");
        assert!(grid.scrollback_len() > 0);
        assert!(grid.visible_text().contains("three"));
    }

    #[test]
    fn carriage_return_and_overwrite() {
        let mut grid = Grid::new(10, 2);
        for c in "abc".chars() {
            grid.put_char(c);
        }
        grid.carriage_return();
        grid.put_char('X');
        assert_eq!(grid.row_text(0), "Xbc");
    }

    #[test]
    fn wide_char_occupies_two_cells() {
        let mut grid = Grid::new(10, 2);
        grid.put_char('界');
        assert_eq!(grid.cursor(), (0, 2));
        assert_eq!(grid.row_text(0), "界");
    }

    #[test]
    fn erase_in_line_from_cursor() {
        let mut grid = Grid::new(10, 2);
        for c in "abcdef".chars() {
            grid.put_char(c);
        }
        grid.move_cursor(0, 3);
        grid.erase_in_line(0);
        assert_eq!(grid.row_text(0), "abc");
    }

    #[test]
    fn erase_display_clears_everything() {
        let mut grid = Grid::new(10, 3);
        grid.feed_line("one");
        grid.feed_line("two");
        grid.erase_in_display(2);
        assert_eq!(grid.visible_text(), "");
    }

    #[test]
    fn resize_preserves_content_and_clamps_cursor() {
        let mut grid = Grid::new(10, 4);
        for c in "hello".chars() {
            grid.put_char(c);
        }
        grid.resize(8, 2);
        assert_eq!(grid.cols, 8);
        assert_eq!(grid.rows, 2);
        let (row, col) = grid.cursor();
        assert!(row < 2 && col < 8);
    }

    #[test]
    fn resize_never_drops_below_one_by_one() {
        let mut grid = Grid::new(10, 4);
        grid.resize(0, 0);
        assert_eq!(grid.cols, 1);
        assert_eq!(grid.rows, 1);
    }

    #[test]
    fn feed_line_starts_on_fresh_row() {
        let mut grid = Grid::new(40, 5);
        for c in "prompt$".chars() {
            grid.put_char(c);
        }
        grid.feed_line("[process exited with code 0]");
        let text = grid.visible_text();
        assert!(text.contains("prompt$"));
        assert!(text.contains("[process exited with code 0]"));
        assert!(!text.contains("prompt$[process"));
    }

    #[test]
    fn tab_advances_to_next_stop() {
        let mut grid = Grid::new(20, 2);
        grid.put_char('a');
        grid.tab();
        assert_eq!(grid.cursor(), (0, 8));
    }
}
