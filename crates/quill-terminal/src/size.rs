//! Container fitting: translate a tab container's pixel size into a
//! terminal geometry, clamped so a PTY is never created at 0x0.

/// Cell metrics used to fit an emulator into its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    /// Width of a single cell in pixels.
    pub cell_width: f32,
    /// Height of a single cell in pixels.
    pub cell_height: f32,
    /// Horizontal padding in pixels.
    pub padding_x: f32,
    /// Vertical padding in pixels.
    pub padding_y: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_width: 10.0,
            cell_height: 20.0,
            padding_x: 0.0,
            padding_y: 0.0,
        }
    }
}

impl CellMetrics {
    /// Compute how many columns and rows fit into the given pixel area.
    /// Always at least 1x1.
    pub fn fit(&self, width: f32, height: f32) -> (u16, u16) {
        let usable_width = (width - self.padding_x * 2.0).max(0.0);
        let usable_height = (height - self.padding_y * 2.0).max(0.0);
        let cols = (usable_width / self.cell_width).floor() as u16;
        let rows = (usable_height / self.cell_height).floor() as u16;
        (cols.max(1), rows.max(1))
    }
}
