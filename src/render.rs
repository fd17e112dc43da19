//! Render Module — Double-buffered cell grid with diffing.
//!
//! Responsibilities:
//! - `Canvas`: the drawing surface views paint into (top-left view coordinates)
//! - `CellCanvas`: a clipped window onto a cell `Buffer`, with half-block
//!   rounded corners
//! - Render every hosted view into the front buffer at its layout frame
//! - Diff front vs back buffer to produce a minimal CellUpdate list
//! - Send diff to TerminalBackend, swap buffers

use crate::error::Result;
use crate::focuser::TextFocuser;
use crate::screen::Screen;
use crate::text_utils::char_width;
use crate::types::{Buffer, Cell, CellAttrs, CellUpdate, Color, Corners, Point, Rect, Size};

/// Slack used when snapping fractional geometry to cells.
const SNAP: f32 = 1e-3;

/// Left half of a rounded shape: the fill occupies the right half of the cell.
const LEFT_CORNER: char = '▐';
/// Right half of a rounded shape: the fill occupies the left half of the cell.
const RIGHT_CORNER: char = '▌';

// ============================================================================
// Canvas
// ============================================================================

/// Drawing surface for one view. Coordinates are in cells, origin at the
/// view's top-left corner; anything outside the view is clipped.
pub trait Canvas {
    fn size(&self) -> Size;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill `rect`, rounding the listed corners when `radius > 0`.
    fn fill_rounded_rect(&mut self, rect: Rect, corners: Corners, radius: f32, color: Color);

    /// Draw one glyph with its top-left corner at `origin`. The cell keeps
    /// whatever background was painted underneath.
    fn draw_glyph(&mut self, origin: Point, ch: char, fg: Color, attrs: CellAttrs);
}

// ============================================================================
// Clip Rectangle
// ============================================================================

/// Axis-aligned clip rectangle in absolute screen coordinates.
#[derive(Debug, Clone, Copy)]
struct ClipRect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl ClipRect {
    /// Full-screen clip rect (no clipping).
    fn full(width: u16, height: u16) -> Self {
        Self {
            x: 0,
            y: 0,
            w: width as i32,
            h: height as i32,
        }
    }

    /// Intersect with another clip rect, producing the tighter bound.
    fn intersect(self, other: ClipRect) -> ClipRect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.w).min(other.x + other.w);
        let y2 = (self.y + self.h).min(other.y + other.h);
        ClipRect {
            x: x1,
            y: y1,
            w: (x2 - x1).max(0),
            h: (y2 - y1).max(0),
        }
    }

    fn contains(self, sx: i32, sy: i32) -> bool {
        sx >= self.x && sx < self.x + self.w && sy >= self.y && sy < self.y + self.h
    }
}

/// Cell range `[start, end)` covered by the interval `[min, max)`.
fn cell_span(min: f32, max: f32) -> (i32, i32) {
    ((min + SNAP).floor() as i32, (max - SNAP).ceil() as i32)
}

fn is_corner_glyph(ch: char) -> bool {
    ch == LEFT_CORNER || ch == RIGHT_CORNER
}

// ============================================================================
// CellCanvas
// ============================================================================

/// A view-sized window onto a cell buffer.
pub struct CellCanvas<'a> {
    buffer: &'a mut Buffer,
    origin_x: i32,
    origin_y: i32,
    width: u16,
    height: u16,
    clip: ClipRect,
}

impl<'a> CellCanvas<'a> {
    /// Window of `width`×`height` cells whose top-left sits at
    /// (`x`, `y`) in the buffer.
    pub fn new(buffer: &'a mut Buffer, x: i32, y: i32, width: u16, height: u16) -> Self {
        let clip = ClipRect {
            x,
            y,
            w: width as i32,
            h: height as i32,
        }
        .intersect(ClipRect::full(buffer.width, buffer.height));
        Self {
            buffer,
            origin_x: x,
            origin_y: y,
            width,
            height,
            clip,
        }
    }

    /// Rewrite the cell at view-relative (`col`, `row`), respecting the clip.
    fn update(&mut self, col: i32, row: i32, f: impl FnOnce(&Cell) -> Cell) {
        let sx = self.origin_x + col;
        let sy = self.origin_y + row;
        if !self.clip.contains(sx, sy) || sx < 0 || sy < 0 {
            return;
        }
        if let Some(cell) = self.buffer.get_mut(sx as u16, sy as u16) {
            *cell = f(cell);
        }
    }
}

impl Canvas for CellCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_rounded_rect(rect, Corners::empty(), 0.0, color);
    }

    fn fill_rounded_rect(&mut self, rect: Rect, corners: Corners, radius: f32, color: Color) {
        let (x0, x1) = cell_span(rect.min_x(), rect.max_x());
        let (y0, y1) = cell_span(rect.min_y(), rect.max_y());
        let round = radius > 0.0;

        for row in y0..y1 {
            let top = row == y0;
            let bottom = row == y1 - 1;
            for col in x0..x1 {
                let left = round
                    && col == x0
                    && ((top && corners.contains(Corners::TOP_LEFT))
                        || (bottom && corners.contains(Corners::BOTTOM_LEFT)));
                let right = round
                    && col == x1 - 1
                    && ((top && corners.contains(Corners::TOP_RIGHT))
                        || (bottom && corners.contains(Corners::BOTTOM_RIGHT)));

                let corner = match (left, right) {
                    (true, false) => Some(LEFT_CORNER),
                    (false, true) => Some(RIGHT_CORNER),
                    // One cell wide and rounded on both sides: keep it solid.
                    _ => None,
                };

                self.update(col, row, |cell| match corner {
                    Some(ch) => Cell {
                        ch,
                        fg: color,
                        bg: cell.bg,
                        attrs: CellAttrs::empty(),
                    },
                    None => Cell {
                        ch: ' ',
                        fg: Color::DEFAULT,
                        bg: color,
                        attrs: CellAttrs::empty(),
                    },
                });
            }
        }
    }

    fn draw_glyph(&mut self, origin: Point, ch: char, fg: Color, attrs: CellAttrs) {
        let col = (origin.x + SNAP).floor() as i32;
        let row = (origin.y + SNAP).floor() as i32;
        let mut drawn_bg = None;
        self.update(col, row, |cell| {
            // A glyph over a rounded corner takes the corner's fill.
            let bg = if is_corner_glyph(cell.ch) { cell.fg } else { cell.bg };
            drawn_bg = Some(bg);
            Cell { ch, fg, bg, attrs }
        });

        // The right half of a wide glyph must not be repainted as a blank.
        if let Some(bg) = drawn_bg.filter(|_| char_width(ch) > 1.0) {
            self.update(col + 1, row, |_| Cell {
                ch: Cell::CONTINUATION,
                fg,
                bg,
                attrs,
            });
        }
    }
}

// ============================================================================
// Offscreen Rendering
// ============================================================================

/// Draw a single view into a fresh buffer of the given size.
pub fn render_view(view: &mut TextFocuser, width: u16, height: u16) -> Buffer {
    let mut buffer = Buffer::new(width, height);
    {
        let mut canvas = CellCanvas::new(&mut buffer, 0, 0, width, height);
        view.draw(&mut canvas);
    }
    buffer
}

// ============================================================================
// Render Pipeline
// ============================================================================

/// Execute the full render pipeline:
/// 1. Compute layout (via Layout Module)
/// 2. Clear front buffer
/// 3. Draw every view, in registration order, into its frame
/// 4. Diff front vs back
/// 5. Send diff to backend
/// 6. Swap buffers
///
/// Returns the number of changed cells.
pub(crate) fn render(screen: &mut Screen) -> Result<usize> {
    let start = std::time::Instant::now();

    // 1. Compute layout
    crate::layout::compute_layout(screen)?;

    // Resize buffers if terminal size changed
    let (w, h) = screen.backend.size();
    if screen.front_buffer.width != w || screen.front_buffer.height != h {
        screen.front_buffer.resize(w, h);
        screen.back_buffer.resize(w, h);
    }

    // 2. Clear front buffer
    screen.front_buffer.clear();

    // 3. Draw views
    let order = screen.order.clone();
    for id in order {
        let Some(frame) = crate::layout::view_frame(screen, id) else {
            continue;
        };
        let Screen {
            views,
            front_buffer,
            ..
        } = screen;
        let Some(hosted) = views.get_mut(&id) else {
            continue;
        };
        let mut canvas = CellCanvas::new(
            front_buffer,
            frame.origin.x.round() as i32,
            frame.origin.y.round() as i32,
            frame.size.width.round().max(0.0) as u16,
            frame.size.height.round().max(0.0) as u16,
        );
        hosted.focuser.draw(&mut canvas);
    }

    // 4. Diff
    let diff = diff_buffers(&screen.front_buffer, &screen.back_buffer);
    screen.perf_diff_cells = diff.len() as u32;

    // 5. Send to backend
    screen.backend.write_diff(&diff)?;
    screen.backend.flush()?;

    // 6. Swap buffers
    std::mem::swap(&mut screen.front_buffer, &mut screen.back_buffer);

    screen.perf_render_us = start.elapsed().as_micros() as u64;
    tracing::debug!(
        target: "text_focuser.render",
        render_us = screen.perf_render_us,
        cells = screen.perf_diff_cells,
        "render"
    );

    Ok(diff.len())
}

/// Every cell of `front` that differs from `back`. A size mismatch marks the
/// whole front buffer as changed.
pub(crate) fn diff_buffers(front: &Buffer, back: &Buffer) -> Vec<CellUpdate> {
    let mut updates = Vec::new();
    let same_size = front.width == back.width && front.height == back.height;

    for y in 0..front.height {
        for x in 0..front.width {
            let Some(cell) = front.get(x, y) else {
                continue;
            };
            let changed = !same_size || back.get(x, y) != Some(cell);
            if changed {
                updates.push(CellUpdate {
                    x,
                    y,
                    cell: cell.clone(),
                });
            }
        }
    }

    updates
}

// ============================================================================
// Tests
// ============================================================================
