//! Layout Module — Flexbox constraint resolution via Taffy.
//!
//! Responsibilities:
//! - Stack hosted views in a single column under the screen root
//! - View size and gap mutations (read-modify-write on the Taffy style)
//! - Compute layout from root against the terminal size
//! - Provide hit-test geometry for mouse events

use taffy::prelude::*;
use taffy::style_helpers::{auto, length, percent};

use crate::error::{FocuserError, Result};
use crate::screen::Screen;
use crate::types::{Rect, ViewId};

/// Height of a view whose height is left unset.
const DEFAULT_VIEW_HEIGHT: f32 = 1.0;

pub(crate) fn root_style(gap: f32) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: FlexDirection::Column,
        align_items: Some(AlignItems::Stretch),
        size: Size {
            width: percent(1.0),
            height: percent(1.0),
        },
        gap: Size {
            width: length(0.0),
            height: length(gap),
        },
        ..Default::default()
    }
}

pub(crate) fn view_style(width: Option<f32>, height: Option<f32>) -> Style {
    Style {
        flex_shrink: 0.0,
        size: Size {
            width: match width {
                Some(w) => length(w),
                None => auto(),
            },
            height: length(height.unwrap_or(DEFAULT_VIEW_HEIGHT)),
        },
        ..Default::default()
    }
}

/// Set a view's size. Uses read-modify-write to preserve other properties.
pub(crate) fn set_view_size(
    screen: &mut Screen,
    id: ViewId,
    width: Option<f32>,
    height: Option<f32>,
) -> Result<()> {
    let taffy_node = screen
        .views
        .get(&id)
        .ok_or(FocuserError::InvalidView(id))?
        .taffy_node;

    let mut style = screen.tree.style(taffy_node)?.clone();
    let sized = view_style(width, height);
    style.size = sized.size;
    screen.tree.set_style(taffy_node, style)?;

    screen.layout_dirty = true;
    if let Some(hosted) = screen.views.get_mut(&id) {
        hosted.focuser.set_needs_display();
    }
    Ok(())
}

/// Set the row gap between stacked views.
pub(crate) fn set_gap(screen: &mut Screen, gap: f32) -> Result<()> {
    let mut style = screen.tree.style(screen.root)?.clone();
    style.gap = Size {
        width: length(0.0),
        height: length(gap),
    };
    screen.tree.set_style(screen.root, style)?;
    screen.layout_dirty = true;
    Ok(())
}

/// Compute layout from root with the terminal size as available space.
pub(crate) fn compute_layout(screen: &mut Screen) -> Result<()> {
    let (w, h) = screen.backend.size();
    let start = std::time::Instant::now();

    screen.tree.compute_layout(
        screen.root,
        Size {
            width: AvailableSpace::Definite(w as f32),
            height: AvailableSpace::Definite(h as f32),
        },
    )?;

    screen.layout_dirty = false;
    screen.perf_layout_us = start.elapsed().as_micros() as u64;
    tracing::trace!(target: "text_focuser.layout", layout_us = screen.perf_layout_us, "compute_layout");

    Ok(())
}

/// Absolute frame of a view. Views are direct children of the root, which
/// sits at the screen origin.
pub(crate) fn view_frame(screen: &Screen, id: ViewId) -> Option<Rect> {
    let hosted = screen.views.get(&id)?;
    let layout = screen.tree.layout(hosted.taffy_node).ok()?;
    Some(Rect::new(
        layout.location.x,
        layout.location.y,
        layout.size.width,
        layout.size.height,
    ))
}

/// Hit-test: the topmost view containing the given cell. Later views are
/// checked first to match paint order.
pub(crate) fn hit_test(screen: &Screen, x: u16, y: u16) -> Option<ViewId> {
    let (x, y) = (x as f32, y as f32);
    screen.order.iter().rev().copied().find(|&id| {
        view_frame(screen, id).is_some_and(|f| {
            x >= f.min_x() && y >= f.min_y() && x < f.max_x() && y < f.max_y()
        })
    })
}
