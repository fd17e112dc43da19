//! Screen — owns hosted views, focus, the event queue and the terminal.
//!
//! Responsibilities:
//! - View registry: handle allocation (Handle(0) is never issued),
//!   insertion and removal, registration order
//! - Layout tree: one Taffy leaf per view under a column root
//! - Focus engine: the single source of truth for which view is focused
//! - Double buffers and the terminal backend used by the render pipeline

use std::collections::{HashMap, VecDeque};

use taffy::prelude::*;

use crate::error::{FocuserError, Result};
use crate::event::ScreenEvent;
use crate::focuser::TextFocuser;
use crate::terminal::TerminalBackend;
use crate::types::{Buffer, Rect, ViewId};

pub(crate) struct HostedView {
    pub(crate) focuser: TextFocuser,
    pub(crate) taffy_node: NodeId,
}

pub struct Screen {
    // Views
    pub(crate) tree: TaffyTree<()>,
    pub(crate) root: NodeId,
    pub(crate) views: HashMap<ViewId, HostedView>,
    pub(crate) order: Vec<ViewId>,
    pub(crate) next_handle: u32,

    // Focus & input
    pub(crate) focused: Option<ViewId>,
    pub(crate) event_buffer: VecDeque<ScreenEvent>,

    // Render
    pub(crate) front_buffer: Buffer,
    pub(crate) back_buffer: Buffer,
    pub(crate) backend: Box<dyn TerminalBackend>,
    pub(crate) layout_dirty: bool,

    // Diagnostics
    pub(crate) perf_layout_us: u64,
    pub(crate) perf_render_us: u64,
    pub(crate) perf_diff_cells: u32,
}

impl Screen {
    pub fn new(backend: Box<dyn TerminalBackend>) -> Result<Self> {
        let (w, h) = backend.size();
        let mut tree = TaffyTree::new();
        let root = tree.new_leaf(crate::layout::root_style(0.0))?;
        Ok(Self {
            tree,
            root,
            views: HashMap::new(),
            order: Vec::new(),
            next_handle: 1, // Handle(0) is permanently invalid

            focused: None,
            event_buffer: VecDeque::new(),

            front_buffer: Buffer::new(w, h),
            back_buffer: Buffer::new(w, h),
            backend,
            layout_dirty: true,

            perf_layout_us: 0,
            perf_render_us: 0,
            perf_diff_cells: 0,
        })
    }

    pub fn init(&mut self) -> Result<()> {
        self.backend.init()
    }

    pub fn shutdown(&mut self) -> Result<()> {
        self.backend.shutdown()
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Host a view. Its size defaults to the width of the screen and the
    /// height of one line; see [`Screen::set_view_size`].
    pub fn add_view(&mut self, mut focuser: TextFocuser) -> Result<ViewId> {
        let id = ViewId(self.next_handle);
        self.next_handle += 1;
        focuser.set_id(id);

        let taffy_node = self.tree.new_leaf(crate::layout::view_style(None, None))?;
        self.tree.add_child(self.root, taffy_node)?;

        self.views.insert(id, HostedView { focuser, taffy_node });
        self.order.push(id);
        self.layout_dirty = true;
        tracing::debug!(target: "text_focuser.screen", view = %id, "add_view");
        Ok(id)
    }

    /// Remove a view and hand it back. Removing the focused view clears
    /// focus.
    pub fn remove_view(&mut self, id: ViewId) -> Result<TextFocuser> {
        let hosted = self.views.remove(&id).ok_or(FocuserError::InvalidView(id))?;
        self.order.retain(|&v| v != id);
        self.tree.remove(hosted.taffy_node)?;
        self.layout_dirty = true;

        if self.focused == Some(id) {
            self.focused = None;
            self.event_buffer.push_back(ScreenEvent::FocusChange {
                from: Some(id),
                to: None,
            });
        }
        tracing::debug!(target: "text_focuser.screen", view = %id, "remove_view");
        Ok(hosted.focuser)
    }

    pub fn view(&self, id: ViewId) -> Option<&TextFocuser> {
        self.views.get(&id).map(|h| &h.focuser)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut TextFocuser> {
        self.views.get_mut(&id).map(|h| &mut h.focuser)
    }

    /// View handles in registration order (also the focus order).
    pub fn views(&self) -> &[ViewId] {
        &self.order
    }

    pub(crate) fn validate_view(&self, id: ViewId) -> Result<()> {
        if !id.is_valid() || !self.views.contains_key(&id) {
            return Err(FocuserError::InvalidView(id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Fix a view's size in cells. `None` stretches the width across the
    /// screen or sizes the height to one line.
    pub fn set_view_size(&mut self, id: ViewId, width: Option<f32>, height: Option<f32>) -> Result<()> {
        crate::layout::set_view_size(self, id, width, height)
    }

    /// Vertical gap between views, in rows.
    pub fn set_gap(&mut self, gap: f32) -> Result<()> {
        crate::layout::set_gap(self, gap)
    }

    pub fn compute_layout(&mut self) -> Result<()> {
        crate::layout::compute_layout(self)
    }

    /// Screen-space frame of a view from the last layout pass.
    pub fn view_frame(&self, id: ViewId) -> Option<Rect> {
        crate::layout::view_frame(self, id)
    }

    pub fn size(&self) -> (u16, u16) {
        self.backend.size()
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    pub fn focused(&self) -> Option<ViewId> {
        self.focused
    }

    /// Move focus to `target` (or clear it). Both views involved receive the
    /// update and a [`ScreenEvent::FocusChange`] is queued.
    pub fn set_focus(&mut self, target: Option<ViewId>) -> Result<()> {
        if let Some(id) = target {
            self.validate_view(id)?;
        }
        crate::event::set_focus(self, target);
        Ok(())
    }

    pub fn focus_next(&mut self) {
        crate::event::focus_next(self);
    }

    pub fn focus_prev(&mut self) {
        crate::event::focus_prev(self);
    }

    /// Deliver a select press to the focused view.
    pub fn tap(&mut self) -> bool {
        crate::event::tap_focused(self)
    }

    // ------------------------------------------------------------------
    // Input & events
    // ------------------------------------------------------------------

    /// Read terminal input, translate it, and queue events. Returns the number
    /// of events queued.
    pub fn read_input(&mut self, timeout_ms: u32) -> Result<usize> {
        crate::event::read_input(self, timeout_ms)
    }

    pub fn next_event(&mut self) -> Option<ScreenEvent> {
        crate::event::next_event(self)
    }

    // ------------------------------------------------------------------
    // Render
    // ------------------------------------------------------------------

    /// True when any view or the layout changed since the last render.
    pub fn needs_render(&self) -> bool {
        self.layout_dirty || self.views.values().any(|h| h.focuser.needs_display())
    }

    /// Render all views and flush the changed cells. Returns the number of
    /// cells written.
    pub fn render(&mut self) -> Result<usize> {
        crate::render::render(self)
    }

    /// Render only if something changed. Repeated invalidations between
    /// frames coalesce into one pass.
    pub fn render_if_needed(&mut self) -> Result<Option<usize>> {
        if self.needs_render() {
            self.render().map(Some)
        } else {
            Ok(None)
        }
    }

    /// The frame most recently sent to the terminal.
    pub fn last_frame(&self) -> &Buffer {
        &self.back_buffer
    }

    pub fn perf_render_us(&self) -> u64 {
        self.perf_render_us
    }

    pub fn perf_layout_us(&self) -> u64 {
        self.perf_layout_us
    }

    pub fn perf_diff_cells(&self) -> u32 {
        self.perf_diff_cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SpanStyle;
    use crate::terminal::MockBackend;
    use crate::types::Color;

    fn test_screen() -> Screen {
        Screen::new(Box::new(MockBackend::new(40, 10))).unwrap()
    }

    fn labelled(text: &str) -> TextFocuser {
        let mut f = TextFocuser::new();
        f.set_text(text);
        f
    }

    #[test]
    fn test_handles_start_at_one_and_keep_order() {
        let mut screen = test_screen();
        let a = screen.add_view(labelled("a")).unwrap();
        let b = screen.add_view(labelled("b")).unwrap();
        assert_eq!(a, ViewId(1));
        assert_eq!(b, ViewId(2));
        assert_eq!(screen.views(), &[a, b]);
        assert_eq!(screen.view(a).unwrap().id(), a);
    }

    #[test]
    fn test_remove_view() {
        let mut screen = test_screen();
        let a = screen.add_view(labelled("a")).unwrap();
        let b = screen.add_view(labelled("b")).unwrap();
        screen.set_focus(Some(a)).unwrap();
        screen.next_event();

        let removed = screen.remove_view(a).unwrap();
        assert_eq!(removed.text().as_str(), "a");
        assert_eq!(screen.views(), &[b]);
        assert_eq!(screen.focused(), None);
        assert_eq!(
            screen.next_event(),
            Some(ScreenEvent::FocusChange {
                from: Some(a),
                to: None
            })
        );
        assert!(matches!(
            screen.remove_view(a),
            Err(FocuserError::InvalidView(id)) if id == a
        ));
    }

    #[test]
    fn test_set_focus_rejects_unknown_view() {
        let mut screen = test_screen();
        assert!(screen.set_focus(Some(ViewId(9))).is_err());
        assert!(screen.set_focus(Some(ViewId::INVALID)).is_err());
        assert!(screen.set_focus(None).is_ok());
    }

    #[test]
    fn test_render_coalesces_and_diffs() {
        let mut screen = test_screen();
        let a = screen.add_view(labelled("hello world")).unwrap();
        screen.view_mut(a).unwrap().add_focusable_text("world", SpanStyle::background(Color::rgb(0, 0, 255)));

        assert!(screen.needs_render());
        let first = screen.render().unwrap();
        assert!(first > 0);
        assert_eq!(screen.last_frame().row_text(0).trim(), "hello world");
        assert!(!screen.needs_render());
        assert_eq!(screen.render_if_needed().unwrap(), None);

        screen.set_focus(Some(a)).unwrap();
        assert!(screen.needs_render());
        let changed = screen.render_if_needed().unwrap().unwrap();
        // Only the highlight cells changed: "world" plus one padding cell each side.
        assert_eq!(changed, 7);
        assert_eq!(screen.render().unwrap(), 0);
    }

    #[test]
    fn test_render_writes_to_backend() {
        let mut screen = test_screen();
        screen.add_view(labelled("hi")).unwrap();
        screen.render().unwrap();
        let mock = screen
            .backend
            .as_any_mut()
            .downcast_mut::<MockBackend>()
            .expect("test screen must use MockBackend");
        assert!(mock.diff_log.iter().any(|u| u.cell.ch == 'h'));
    }
}
