// ABOUTME: Draws the partition layout onto a grid of terminal cells.
// ABOUTME: Leaves become truecolor blocks labelled with their id.

use std::io::{self, Write};

use tiler_core::Color;
use tiler_layout::{PartitionId, PartitionTree, Rect};

/// Leaf ownership of every cell on the drawing surface
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Option<PartitionId>>,
    labels: Vec<Option<char>>,
}

impl Canvas {
    pub fn paint(tree: &PartitionTree, width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        let mut canvas = Self {
            width,
            height,
            cells: vec![None; len],
            labels: vec![None; len],
        };

        let rects = tree.rects();
        for leaf in tree.leaves() {
            let Some(rect) = rects.get(&leaf) else {
                continue;
            };
            let (x0, y0, x1, y1) = canvas.cell_span(rect);
            for row in y0..y1 {
                for col in x0..x1 {
                    canvas.cells[row * width as usize + col] = Some(leaf);
                }
            }
            // label on the top row, truncated to the box
            for (i, ch) in leaf.to_string().chars().enumerate() {
                let col = x0 + i;
                if col >= x1 || y0 >= y1 {
                    break;
                }
                canvas.labels[y0 * width as usize + col] = Some(ch);
            }
        }
        canvas
    }

    pub fn at(&self, col: u16, row: u16) -> Option<PartitionId> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells[row as usize * self.width as usize + col as usize]
    }

    /// Normalized coordinates of the center of a cell
    pub fn cell_center(&self, col: u16, row: u16) -> (f32, f32) {
        (
            (col as f32 + 0.5) / self.width.max(1) as f32,
            (row as f32 + 0.5) / self.height.max(1) as f32,
        )
    }

    pub fn write_ansi(&self, tree: &PartitionTree, out: &mut impl Write) -> io::Result<()> {
        for row in 0..self.height {
            for col in 0..self.width {
                let idx = row as usize * self.width as usize + col as usize;
                let fill = self.cells[idx]
                    .and_then(|id| tree.get(id))
                    .map(|p| p.color.to_rgb())
                    .unwrap_or_default();
                let ink = if fill.luminance() > 0.5 {
                    Color::BLACK
                } else {
                    Color::WHITE
                };
                let [br, bg, bb] = fill.to_rgb8();
                let [fr, fg, fb] = ink.to_rgb8();
                write!(
                    out,
                    "\x1b[48;2;{br};{bg};{bb}m\x1b[38;2;{fr};{fg};{fb}m{}",
                    self.labels[idx].unwrap_or(' ')
                )?;
            }
            writeln!(out, "\x1b[0m")?;
        }
        Ok(())
    }

    /// Colorless rendering: each leaf is drawn with a letter in leaf order
    pub fn write_plain(&self, tree: &PartitionTree, out: &mut impl Write) -> io::Result<()> {
        let leaves = tree.leaves();
        for row in 0..self.height {
            let line: String = (0..self.width)
                .map(|col| {
                    let idx = row as usize * self.width as usize + col as usize;
                    match self.cells[idx] {
                        Some(id) => {
                            let n = leaves.iter().position(|l| *l == id).unwrap_or(0);
                            (b'a' + (n % 26) as u8) as char
                        }
                        None => '.',
                    }
                })
                .collect();
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    /// Cell range covered by a normalized rect, as (x0, y0, x1, y1) exclusive
    fn cell_span(&self, rect: &Rect) -> (usize, usize, usize, usize) {
        let w = self.width as f32;
        let h = self.height as f32;
        let snap = |v: f32, max: f32| (v * max).round().clamp(0.0, max) as usize;
        (
            snap(rect.x, w),
            snap(rect.y, h),
            snap(rect.x + rect.width, w),
            snap(rect.y + rect.height, h),
        )
    }
}
