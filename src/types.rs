//! Shared types, enums, and constants.
//!
//! All types that cross module boundaries (geometry, colors, ranges, cells)
//! live here.

use bitflags::bitflags;

// ============================================================================
// View Handles
// ============================================================================

/// Handle of a view hosted by a [`Screen`](crate::Screen).
///
/// Handle(0) is the invalid sentinel and is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u32);

impl ViewId {
    pub const INVALID: ViewId = ViewId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

// ============================================================================
// Color Encoding (u32)
// ============================================================================
//
// Bits 31-24: Mode tag
//   0x00 = Default (terminal default / clear)
//   0x01 = RGB truecolor (bits 23-0 = 0xRRGGBB)
//   0x02 = Indexed (bits 7-0 = palette index 0-255)

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    pub const DEFAULT: Color = Color(0x0000_0000);
    /// Transparent background; same encoding as the terminal default.
    pub const CLEAR: Color = Color::DEFAULT;

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0x0100_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn indexed(index: u8) -> Self {
        Color(0x0200_0000 | index as u32)
    }

    pub fn tag(self) -> u8 {
        ((self.0 >> 24) & 0xFF) as u8
    }

    pub fn is_default(self) -> bool {
        self.tag() == 0x00
    }

    pub fn to_crossterm(self) -> Option<crossterm::style::Color> {
        match self.tag() {
            0x00 => None, // Default — no override
            0x01 => {
                let r = ((self.0 >> 16) & 0xFF) as u8;
                let g = ((self.0 >> 8) & 0xFF) as u8;
                let b = (self.0 & 0xFF) as u8;
                Some(crossterm::style::Color::Rgb { r, g, b })
            }
            0x02 => Some(crossterm::style::Color::AnsiValue((self.0 & 0xFF) as u8)),
            _ => None, // Invalid tag — treat as Default
        }
    }

    /// Parse `#RRGGBB` (or `RRGGBB`). Returns `None` for anything else.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Color(0x0100_0000 | value))
    }
}

// ============================================================================
// Geometry (cell units, f32)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    pub fn min_x(&self) -> f32 {
        self.origin.x
    }

    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Shrink by the given insets. Width/height never go negative.
    pub fn inset_by(&self, insets: EdgeInsets) -> Rect {
        Rect::new(
            self.origin.x + insets.left,
            self.origin.y + insets.top,
            (self.size.width - insets.left - insets.right).max(0.0),
            (self.size.height - insets.top - insets.bottom).max(0.0),
        )
    }

    /// Mirror the rect vertically inside a container of the given height,
    /// converting between lower-left and top-left origins.
    pub fn flipped(&self, container_height: f32) -> Rect {
        Rect::new(
            self.origin.x,
            container_height - self.origin.y - self.size.height,
            self.size.width,
            self.size.height,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

// ============================================================================
// Character Ranges
// ============================================================================

/// A range of characters (Unicode scalar values), as location + length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharRange {
    pub location: usize,
    pub length: usize,
}

impl CharRange {
    pub const fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// One past the last index. Saturates instead of overflowing, so a
    /// range starting near `usize::MAX` simply lies outside any text.
    pub fn end(&self) -> usize {
        self.location.saturating_add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index >= self.location && index < self.end()
    }

    /// Overlap of two ranges. Disjoint ranges give an empty range located at
    /// the later start.
    pub fn intersection(&self, other: CharRange) -> CharRange {
        let start = self.location.max(other.location);
        let end = self.end().min(other.end());
        CharRange {
            location: start,
            length: end.saturating_sub(start),
        }
    }
}

impl From<std::ops::Range<usize>> for CharRange {
    fn from(r: std::ops::Range<usize>) -> Self {
        CharRange::new(r.start, r.end.saturating_sub(r.start))
    }
}

// ============================================================================
// Corner Rounding (bitflags)
// ============================================================================

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Corners: u8 {
        const TOP_LEFT     = 0b0001;
        const TOP_RIGHT    = 0b0010;
        const BOTTOM_LEFT  = 0b0100;
        const BOTTOM_RIGHT = 0b1000;

        const LEFT  = Self::TOP_LEFT.bits() | Self::BOTTOM_LEFT.bits();
        const RIGHT = Self::TOP_RIGHT.bits() | Self::BOTTOM_RIGHT.bits();
        const ALL   = Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

// ============================================================================
// Cell Attributes (bitflags)
// ============================================================================

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellAttrs: u8 {
        const BOLD          = 0b0000_0001;
        const ITALIC        = 0b0000_0010;
        const UNDERLINE     = 0b0000_0100;
        const STRIKETHROUGH = 0b0000_1000;
    }
}

// ============================================================================
// Key Code Constants
// ============================================================================

pub mod key {
    pub const BACKSPACE: u32 = 0x0100;
    pub const ENTER: u32 = 0x0101;
    pub const LEFT: u32 = 0x0102;
    pub const RIGHT: u32 = 0x0103;
    pub const UP: u32 = 0x0104;
    pub const DOWN: u32 = 0x0105;
    pub const HOME: u32 = 0x0106;
    pub const END: u32 = 0x0107;
    pub const TAB: u32 = 0x010A;
    pub const BACK_TAB: u32 = 0x010B;
    pub const ESCAPE: u32 = 0x010E;
}

pub mod modifier {
    pub const SHIFT: u32 = 0x01;
    pub const CTRL: u32 = 0x02;
    pub const ALT: u32 = 0x04;
}

// ============================================================================
// Cell & Buffer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
}

impl Cell {
    /// Marks the right half of a double-width glyph drawn in the cell to its
    /// left. Terminals draw that half themselves, so it is never printed.
    pub const CONTINUATION: char = '\0';

    pub fn is_continuation(&self) -> bool {
        self.ch == Self::CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::DEFAULT,
            bg: Color::DEFAULT,
            attrs: CellAttrs::empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Buffer {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = (width as usize) * (height as usize);
        self.cells.resize(size, Cell::default());
        self.clear();
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[(y as usize) * (self.width as usize) + (x as usize)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            Some(&mut self.cells[(y as usize) * (self.width as usize) + (x as usize)])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(slot) = self.get_mut(x, y) {
            *slot = cell;
        }
    }

    /// The characters of one row, for assertions and debugging.
    /// Continuation cells are skipped.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }
}

// ============================================================================
// Cell Update (for TerminalBackend trait)
// ============================================================================

#[derive(Debug, Clone)]
pub struct CellUpdate {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

// ============================================================================
// Terminal Input Event
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TerminalInputEvent {
    Key {
        code: u32,
        modifiers: u32,
        character: char,
    },
    Mouse {
        x: u16,
        y: u16,
        button: u8,
        modifiers: u32,
    },
    Resize {
        width: u16,
        height: u16,
    },
}
