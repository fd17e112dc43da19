//! Event Module — Input capture, classification, focus engine.
//!
//! Responsibilities:
//! - Read terminal input via TerminalBackend
//! - Classify TerminalInputEvent → ScreenEvent
//! - Buffer events for the poll-drain model
//! - Focus engine: registration-order traversal with wrap-around, delivery
//!   of focus updates to the views involved
//! - Select presses and clicks become taps on the target view

use crate::error::Result;
use crate::focus::FocusUpdate;
use crate::screen::Screen;
use crate::types::{key, TerminalInputEvent, ViewId};

/// Events surfaced to the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    FocusChange {
        from: Option<ViewId>,
        to: Option<ViewId>,
    },
    /// A select press (Enter, Space or click) reached this view.
    Tapped(ViewId),
    /// A key with no built-in meaning. `target` is the focused view.
    Key {
        target: Option<ViewId>,
        code: u32,
        modifiers: u32,
        character: char,
    },
    Resize {
        width: u16,
        height: u16,
    },
}

/// Read terminal input, classify events, store in buffer.
/// Returns the number of events queued.
pub(crate) fn read_input(screen: &mut Screen, timeout_ms: u32) -> Result<usize> {
    let raw_events = screen.backend.read_events(timeout_ms);
    let before = screen.event_buffer.len();

    for raw in raw_events {
        match raw {
            TerminalInputEvent::Key {
                code,
                modifiers,
                character,
            } => match code {
                key::TAB | key::DOWN | key::RIGHT => focus_next(screen),
                key::BACK_TAB | key::UP | key::LEFT => focus_prev(screen),
                key::ENTER => {
                    tap_focused(screen);
                }
                _ if character == ' ' => {
                    tap_focused(screen);
                }
                _ => {
                    screen.event_buffer.push_back(ScreenEvent::Key {
                        target: screen.focused,
                        code,
                        modifiers,
                        character,
                    });
                }
            },
            TerminalInputEvent::Mouse { x, y, button, .. } => {
                if button != 0 {
                    continue;
                }
                let Some(target) = crate::layout::hit_test(screen, x, y) else {
                    continue;
                };
                if !is_focusable(screen, target) {
                    continue;
                }
                set_focus(screen, Some(target));
                tap_focused(screen);
            }
            TerminalInputEvent::Resize { width, height } => {
                screen.layout_dirty = true;
                for hosted in screen.views.values_mut() {
                    hosted.focuser.set_needs_display();
                }
                screen
                    .event_buffer
                    .push_back(ScreenEvent::Resize { width, height });
            }
        }
    }

    Ok(screen.event_buffer.len() - before)
}

/// Drain one event from the buffer. Returns None if empty.
pub(crate) fn next_event(screen: &mut Screen) -> Option<ScreenEvent> {
    screen.event_buffer.pop_front()
}

fn is_focusable(screen: &Screen, id: ViewId) -> bool {
    screen
        .views
        .get(&id)
        .is_some_and(|h| h.focuser.is_focusable())
}

/// Move focus and notify the views on both sides of the change.
/// No-op when `target` is already focused.
pub(crate) fn set_focus(screen: &mut Screen, target: Option<ViewId>) {
    let previous = screen.focused;
    if previous == target {
        return;
    }
    screen.focused = target;

    let update = FocusUpdate::new(previous, target);
    for id in [previous, target].into_iter().flatten() {
        if let Some(hosted) = screen.views.get_mut(&id) {
            hosted.focuser.did_update_focus(update);
        }
    }

    tracing::debug!(
        target: "text_focuser.focus",
        from = ?previous,
        to = ?target,
        "focus change"
    );
    screen.event_buffer.push_back(ScreenEvent::FocusChange {
        from: previous,
        to: target,
    });
}

/// Advance focus to the next focusable view (registration order).
pub(crate) fn focus_next(screen: &mut Screen) {
    let order = collect_focusable_order(screen);
    if order.is_empty() {
        return;
    }

    let next_idx = screen
        .focused
        .and_then(|f| order.iter().position(|&h| h == f))
        .map(|i| i + 1)
        .unwrap_or(0);

    set_focus(screen, Some(order[next_idx % order.len()]));
}

/// Move focus to the previous focusable view.
pub(crate) fn focus_prev(screen: &mut Screen) {
    let order = collect_focusable_order(screen);
    if order.is_empty() {
        return;
    }

    let current_idx = screen
        .focused
        .and_then(|f| order.iter().position(|&h| h == f))
        .unwrap_or(0);

    let new_idx = if current_idx == 0 {
        order.len() - 1
    } else {
        current_idx - 1
    };

    set_focus(screen, Some(order[new_idx]));
}

/// Tap the focused view, if any. Returns whether a view was tapped.
pub(crate) fn tap_focused(screen: &mut Screen) -> bool {
    let Some(id) = screen.focused else {
        return false;
    };
    let Some(hosted) = screen.views.get_mut(&id) else {
        return false;
    };
    hosted.focuser.tap();
    screen.event_buffer.push_back(ScreenEvent::Tapped(id));
    true
}

fn collect_focusable_order(screen: &Screen) -> Vec<ViewId> {
    screen
        .order
        .iter()
        .copied()
        .filter(|&id| is_focusable(screen, id))
        .collect()
}
