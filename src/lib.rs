//! Text Focuser — focus-aware text views for terminal UIs driven by a
//! remote or keyboard.
//!
//! A [`TextFocuser`] displays styled text. While it holds focus it swaps to
//! its focused background, recolors registered spans and paints a highlight
//! behind each one: one rectangle per line fragment, padded by the focus
//! offset, with rounded corners only at the true start and end of the span.
//!
//! Module map:
//! - `types`, `error`: shared geometry, colors, cells and the error type
//! - `text`, `text_layout`: styled text and line/run layout on the cell grid
//! - `span`, `highlight`: span registry and highlight geometry
//! - `focus`, `focuser`: focus transitions and the view itself
//! - `render`, `terminal`: canvases, diffing and terminal backends
//! - `screen`, `layout`, `event`: the host that stacks views, owns focus
//!   and turns input into focus moves and taps
//! - `config`: JSON screen descriptions
//! - `logging`: tracing subscriber setup for binaries

pub mod config;
pub mod error;
pub mod event;
pub mod focus;
pub mod focuser;
pub mod highlight;
mod layout;
pub mod logging;
pub mod render;
pub mod screen;
pub mod span;
pub mod terminal;
pub mod text;
pub mod text_layout;
mod text_utils;
pub mod types;

pub use config::{ColorSpec, FocuserConfig, ScreenConfig, SpanConfig};
pub use error::{FocuserError, Result};
pub use event::ScreenEvent;
pub use focus::{FocusState, FocusUpdate};
pub use focuser::{TextFocuser, TextFocuserListener};
pub use highlight::{compute_highlights, corners_for, highlights_with, Highlight};
pub use render::{render_view, Canvas, CellCanvas};
pub use screen::Screen;
pub use span::{FocusableSpan, SpanRegistry, SpanSource, SpanStyle};
pub use terminal::{CrosstermBackend, HeadlessBackend, TerminalBackend};
pub use text::{RunStyle, StyledText};
pub use text_layout::{layout_frame, FontMetrics, TextFrame};
pub use types::{CharRange, Color, Corners, EdgeInsets, Point, Rect, Size, ViewId};
