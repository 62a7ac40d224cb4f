/// Terminal presenter for the rasterizer's color buffer
///
/// Each terminal cell shows two vertically stacked pixels: the upper one as
/// the foreground of `▀`, the lower one as the background.
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use trirast_core::{rgb8, FrameBuffer};

const UPPER_HALF_BLOCK: char = '▀';

/// A sampled terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub top: [u8; 3],
    pub bottom: [u8; 3],
}

/// Nearest-neighbour downsampler from the color buffer to a cell grid
pub struct HalfBlockPresenter {
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl HalfBlockPresenter {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![Cell { top: [0; 3], bottom: [0; 3] }; columns * rows],
        }
    }

    pub fn resize(&mut self, columns: usize, rows: usize) {
        *self = Self::new(columns, rows);
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<Cell> {
        if column < self.columns && row < self.rows {
            Some(self.cells[row * self.columns + column])
        } else {
            None
        }
    }

    /// Fit the frame into the grid, keeping its aspect ratio. Cells outside
    /// the fitted area stay black.
    pub fn sample(&mut self, frame: &FrameBuffer) {
        let (fw, fh) = (frame.width() as f32, frame.height() as f32);
        let (gw, gh) = (self.columns as f32, (self.rows * 2) as f32);
        let scale = (gw / fw).min(gh / fh);
        let (used_w, used_h) = (fw * scale, fh * scale);
        let offset_x = ((gw - used_w) / 2.0).floor();
        let offset_y = ((gh - used_h) / 2.0).floor();

        let pixel_at = |gx: usize, gy: usize| -> [u8; 3] {
            let u = (gx as f32 + 0.5 - offset_x) / scale;
            let v = (gy as f32 + 0.5 - offset_y) / scale;
            if u < 0.0 || v < 0.0 || u >= fw || v >= fh {
                return [0; 3];
            }
            frame
                .get(u as u32, v as u32)
                .map(|color| rgb8(&color))
                .unwrap_or([0; 3])
        };

        for row in 0..self.rows {
            for column in 0..self.columns {
                self.cells[row * self.columns + column] = Cell {
                    top: pixel_at(column, row * 2),
                    bottom: pixel_at(column, row * 2 + 1),
                };
            }
        }
    }

    /// Queue the grid starting at terminal row `top`.
    pub fn draw<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        for row in 0..self.rows {
            writer.queue(cursor::MoveTo(0, top + row as u16))?;
            for column in 0..self.columns {
                let cell = self.cells[row * self.columns + column];
                writer.queue(SetForegroundColor(rgb(cell.top)))?;
                writer.queue(SetBackgroundColor(rgb(cell.bottom)))?;
                writer.queue(Print(UPPER_HALF_BLOCK))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use trirast_core::{Buffers, GeometryStore, Primitive, Rasterizer, RasterizerConfig};

    /// 4×4 frame whose left half is red and right half is black.
    fn half_red() -> Rasterizer {
        let mut config = RasterizerConfig::with_size(4, 4);
        config.fallback_color = Vector3::new(255.0, 0.0, 0.0);
        let mut r = Rasterizer::new(config).unwrap();
        let mut store = GeometryStore::new();
        let positions = store.register_positions(&[
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ]);
        let indices = store.register_indices(&[[0, 1, 2], [0, 2, 3]]);
        r.clear(Buffers::COLOR | Buffers::DEPTH);
        r.draw(&store, positions, indices, None, Primitive::Triangle).unwrap();
        r
    }

    #[test]
    fn test_exact_fit_samples_every_pixel() {
        let r = half_red();
        let mut presenter = HalfBlockPresenter::new(4, 2);
        presenter.sample(r.frame_buffer());

        let red = [255, 0, 0];
        assert_eq!(presenter.cell(0, 0), Some(Cell { top: red, bottom: red }));
        assert_eq!(presenter.cell(1, 1), Some(Cell { top: red, bottom: red }));
        assert_eq!(presenter.cell(3, 0), Some(Cell { top: [0; 3], bottom: [0; 3] }));
        assert_eq!(presenter.cell(4, 0), None);
    }

    #[test]
    fn test_wide_grid_is_letterboxed() {
        let r = half_red();
        // 8 columns × 4 pixel rows: the square frame fills the middle 4 columns
        let mut presenter = HalfBlockPresenter::new(8, 2);
        presenter.sample(r.frame_buffer());

        assert_eq!(presenter.cell(0, 0).map(|c| c.top), Some([0; 3]));
        assert_eq!(presenter.cell(2, 0).map(|c| c.top), Some([255, 0, 0]));
        assert_eq!(presenter.cell(7, 1).map(|c| c.bottom), Some([0; 3]));
    }

    #[test]
    fn test_cells_round_and_clamp_like_png_output() {
        let mut config = RasterizerConfig::with_size(2, 2);
        config.background = Vector3::new(254.6, 300.0, -2.0);
        let mut r = Rasterizer::new(config).unwrap();
        r.clear(Buffers::COLOR);

        let mut presenter = HalfBlockPresenter::new(2, 1);
        presenter.sample(r.frame_buffer());
        let expected = [255, 255, 0];
        assert_eq!(presenter.cell(1, 0), Some(Cell { top: expected, bottom: expected }));
        assert_eq!(&r.frame_buffer().to_rgb8()[..3], &expected);
    }

    #[test]
    fn test_draw_emits_one_block_per_cell() {
        let r = half_red();
        let mut presenter = HalfBlockPresenter::new(4, 2);
        presenter.sample(r.frame_buffer());

        let mut out = Vec::new();
        presenter.draw(&mut out, 1).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(UPPER_HALF_BLOCK).count(), 8);
        assert!(text.contains("38;2;255;0;0"));
    }
}
