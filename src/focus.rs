//! Focus Module — two-state focus transitions driven by the host.
//!
//! The focus engine (the [`Screen`](crate::Screen), or any other host) owns
//! which view is focused. Views only observe updates carrying the previous and
//! next focus targets.

use crate::types::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    Focused,
    #[default]
    Unfocused,
}

impl FocusState {
    pub fn is_focused(self) -> bool {
        self == FocusState::Focused
    }
}

/// A focus change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusUpdate {
    pub previous: Option<ViewId>,
    pub next: Option<ViewId>,
}

impl FocusUpdate {
    pub fn new(previous: Option<ViewId>, next: Option<ViewId>) -> Self {
        Self { previous, next }
    }

    /// State `view` should be in after this update, given its current state.
    /// Updates that involve neither side leave the state unchanged.
    pub fn transition(&self, view: ViewId, current: FocusState) -> FocusState {
        if self.next == Some(view) {
            FocusState::Focused
        } else if self.previous == Some(view) {
            FocusState::Unfocused
        } else {
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_into_and_out_of_focus() {
        let me = ViewId(1);
        let other = ViewId(2);

        let gain = FocusUpdate::new(Some(other), Some(me));
        assert_eq!(gain.transition(me, FocusState::Unfocused), FocusState::Focused);

        let lose = FocusUpdate::new(Some(me), Some(other));
        assert_eq!(lose.transition(me, FocusState::Focused), FocusState::Unfocused);

        let lose_to_nothing = FocusUpdate::new(Some(me), None);
        assert_eq!(
            lose_to_nothing.transition(me, FocusState::Focused),
            FocusState::Unfocused
        );
    }

    #[test]
    fn test_unrelated_update_keeps_state() {
        let me = ViewId(1);
        let update = FocusUpdate::new(Some(ViewId(2)), Some(ViewId(3)));
        assert_eq!(update.transition(me, FocusState::Focused), FocusState::Focused);
        assert_eq!(update.transition(me, FocusState::Unfocused), FocusState::Unfocused);
    }

    #[test]
    fn test_refocus_same_view_stays_focused() {
        let me = ViewId(4);
        let update = FocusUpdate::new(Some(me), Some(me));
        assert_eq!(update.transition(me, FocusState::Focused), FocusState::Focused);
    }
}
