//! Focuser Module — the focus-aware text view.
//!
//! A `TextFocuser` holds styled text and a registry of focusable spans. While
//! focused it swaps to its focused background, recolors span text and paints
//! a highlight behind every span that has a background color. Every property
//! change only marks the view for redraw; the host decides when to paint.

use crate::focus::{FocusState, FocusUpdate};
use crate::highlight::{compute_highlights, Highlight};
use crate::render::Canvas;
use crate::span::{SpanRegistry, SpanStyle};
use crate::text::StyledText;
use crate::text_layout::{layout_frame, FontMetrics, TextFrame};
use crate::types::{CharRange, Color, Corners, EdgeInsets, Point, Rect, Size, ViewId};

/// Receives tap (select press) notifications from a [`TextFocuser`].
pub trait TextFocuserListener {
    fn on_tapped(&mut self, focuser: &TextFocuser) {
        let _ = focuser;
    }
}

impl<F: FnMut(&TextFocuser)> TextFocuserListener for F {
    fn on_tapped(&mut self, focuser: &TextFocuser) {
        self(focuser)
    }
}

pub struct TextFocuser {
    id: ViewId,
    text: StyledText,
    corner_radius: f32,
    focused_background: Color,
    normal_background: Color,
    background: Color,
    focus_offset: Point,
    text_insets: EdgeInsets,
    font_metrics: FontMetrics,
    focusable: bool,
    spans: SpanRegistry,
    focus: FocusState,
    needs_display: bool,
    listener: Option<Box<dyn TextFocuserListener>>,
}

impl std::fmt::Debug for TextFocuser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextFocuser")
            .field("id", &self.id)
            .field("text", &self.text.as_str())
            .field("focus", &self.focus)
            .field("background", &self.background)
            .field("spans", &self.spans.len())
            .field("needs_display", &self.needs_display)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl Default for TextFocuser {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFocuser {
    pub fn new() -> Self {
        Self {
            id: ViewId::INVALID,
            text: StyledText::default(),
            corner_radius: 0.0,
            focused_background: Color::CLEAR,
            normal_background: Color::CLEAR,
            background: Color::CLEAR,
            focus_offset: Point::new(1.0, 0.0),
            text_insets: EdgeInsets::new(0.0, 2.0, 0.0, 2.0),
            font_metrics: FontMetrics::default(),
            focusable: true,
            spans: SpanRegistry::new(),
            focus: FocusState::Unfocused,
            needs_display: true,
            listener: None,
        }
    }

    /// Identity used to match focus updates. Hosts such as
    /// [`Screen`](crate::Screen) assign it on insertion.
    pub fn with_id(mut self, id: ViewId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ViewId) {
        self.id = id;
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    pub fn text(&self) -> &StyledText {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<StyledText>) {
        self.text = text.into();
        self.set_needs_display();
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    /// Rounds the corners of the view's own background.
    pub fn set_corner_radius(&mut self, radius: f32) {
        self.corner_radius = radius;
        self.set_needs_display();
    }

    pub fn focused_background(&self) -> Color {
        self.focused_background
    }

    pub fn set_focused_background(&mut self, color: Color) {
        self.focused_background = color;
        if self.focus.is_focused() {
            self.background = color;
        }
        self.set_needs_display();
    }

    pub fn normal_background(&self) -> Color {
        self.normal_background
    }

    pub fn set_normal_background(&mut self, color: Color) {
        self.normal_background = color;
        if !self.focus.is_focused() {
            self.background = color;
        }
        self.set_needs_display();
    }

    /// Background currently in effect.
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn focus_offset(&self) -> Point {
        self.focus_offset
    }

    pub fn set_focus_offset(&mut self, offset: Point) {
        self.focus_offset = offset;
        self.set_needs_display();
    }

    pub fn text_insets(&self) -> EdgeInsets {
        self.text_insets
    }

    pub fn set_text_insets(&mut self, insets: EdgeInsets) {
        self.text_insets = insets;
        self.set_needs_display();
    }

    pub fn font_metrics(&self) -> FontMetrics {
        self.font_metrics
    }

    pub fn set_font_metrics(&mut self, metrics: FontMetrics) {
        self.font_metrics = metrics;
        self.set_needs_display();
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable;
    }

    pub fn needs_display(&self) -> bool {
        self.needs_display
    }

    pub fn set_needs_display(&mut self) {
        self.needs_display = true;
    }

    // ------------------------------------------------------------------
    // Focusable spans
    // ------------------------------------------------------------------

    /// Highlight the first occurrence of `text` while focused.
    pub fn add_focusable_text(&mut self, text: impl Into<String>, style: SpanStyle) {
        self.spans.add_substring(text, style);
        self.set_needs_display();
    }

    /// Highlight an explicit character range while focused.
    pub fn add_focusable_range(&mut self, range: CharRange, style: SpanStyle) {
        self.spans.add_range(range, style);
        self.set_needs_display();
    }

    pub fn clear_focusable_texts(&mut self) {
        self.spans.clear();
        self.set_needs_display();
    }

    pub fn spans(&self) -> &SpanRegistry {
        &self.spans
    }

    // ------------------------------------------------------------------
    // Listener & input
    // ------------------------------------------------------------------

    pub fn set_listener(&mut self, listener: impl TextFocuserListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Select press while this view is the tap target.
    pub fn tap(&mut self) {
        tracing::debug!(target: "text_focuser.input", view = %self.id, "tap");
        if let Some(mut listener) = self.listener.take() {
            listener.on_tapped(self);
            self.listener = Some(listener);
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    pub fn focus_state(&self) -> FocusState {
        self.focus
    }

    pub fn is_focused(&self) -> bool {
        self.focus.is_focused()
    }

    /// Apply a focus-engine notification.
    pub fn did_update_focus(&mut self, update: FocusUpdate) {
        if update.next == Some(self.id) {
            self.background = self.focused_background;
        } else if update.previous == Some(self.id) {
            self.background = self.normal_background;
        }
        let next = update.transition(self.id, self.focus);
        if next != self.focus {
            tracing::debug!(
                target: "text_focuser.focus",
                view = %self.id,
                from = ?self.focus,
                to = ?next,
                "focus transition"
            );
        }
        self.focus = next;
        self.set_needs_display();
    }

    // ------------------------------------------------------------------
    // Geometry & drawing
    // ------------------------------------------------------------------

    /// The text as drawn: span text colors applied while focused.
    pub fn display_text(&self) -> StyledText {
        if self.focus.is_focused() {
            self.spans.recolor(&self.text)
        } else {
            self.text.clone()
        }
    }

    /// Inset content rectangle, top-left coordinates.
    pub fn content_rect(&self, bounds: Size) -> Rect {
        Rect::from_size(bounds).inset_by(self.text_insets)
    }

    /// Lay the displayed text out into the content rectangle.
    pub fn layout(&self, bounds: Size) -> TextFrame {
        layout_frame(
            &self.display_text(),
            self.content_rect(bounds).size,
            self.font_metrics,
        )
    }

    /// Highlight rectangles for the current state, lower-left coordinates.
    /// Empty unless focused with spans registered.
    pub fn highlights(&self, bounds: Size) -> Vec<Highlight> {
        if !self.focus.is_focused() || self.spans.is_empty() {
            return Vec::new();
        }
        let text = self.display_text();
        let content = self.content_rect(bounds);
        let frame = layout_frame(&text, content.size, self.font_metrics);
        compute_highlights(
            &text,
            &self.spans,
            &frame,
            content.flipped(bounds.height),
            self.focus_offset,
        )
    }

    /// Paint the view: background, highlights, then glyphs on top.
    /// Returns the highlights painted, in paint order.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) -> Vec<Highlight> {
        let bounds = canvas.size();

        if !self.background.is_default() {
            let corners = if self.corner_radius > 0.0 {
                Corners::ALL
            } else {
                Corners::empty()
            };
            canvas.fill_rounded_rect(
                Rect::from_size(bounds),
                corners,
                self.corner_radius,
                self.background,
            );
        }

        let text = self.display_text();
        let content = self.content_rect(bounds);
        let frame = layout_frame(&text, content.size, self.font_metrics);

        let highlights = if self.focus.is_focused() && !self.spans.is_empty() {
            compute_highlights(
                &text,
                &self.spans,
                &frame,
                content.flipped(bounds.height),
                self.focus_offset,
            )
        } else {
            Vec::new()
        };
        for h in &highlights {
            canvas.fill_rounded_rect(
                h.rect.flipped(bounds.height),
                h.corners,
                h.corner_radius,
                h.color,
            );
        }

        let content_bottom = bounds.height - content.max_y();
        for line in &frame.lines {
            let top = bounds.height - (content_bottom + line.origin.y + frame.metrics.ascent);
            for run in &line.runs {
                let mut x = content.origin.x + run.x;
                for glyph in &run.glyphs {
                    if !run.style.bg.is_default() && glyph.advance > 0.0 {
                        canvas.fill_rect(
                            Rect::new(x, top, glyph.advance, frame.metrics.line_height()),
                            run.style.bg,
                        );
                    }
                    if !glyph.ch.is_control() {
                        canvas.draw_glyph(Point::new(x, top), glyph.ch, run.style.fg, run.style.attrs);
                    }
                    x += glyph.advance;
                }
            }
        }

        tracing::trace!(
            target: "text_focuser.render",
            view = %self.id,
            lines = frame.lines.len(),
            highlights = highlights.len(),
            "draw"
        );

        self.needs_display = false;
        highlights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CellCanvas;
    use crate::types::Buffer;
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);
    const GREY: Color = Color::rgb(40, 40, 40);
    const ME: ViewId = ViewId(7);

    fn focuser(text: &str) -> TextFocuser {
        let mut f = TextFocuser::new().with_id(ME);
        f.set_text(text);
        f.set_text_insets(EdgeInsets::ZERO);
        f
    }

    fn focus(f: &mut TextFocuser) {
        f.did_update_focus(FocusUpdate::new(None, Some(ME)));
    }

    fn unfocus(f: &mut TextFocuser) {
        f.did_update_focus(FocusUpdate::new(Some(ME), Some(ViewId(99))));
    }

    fn draw(f: &mut TextFocuser, w: u16, h: u16) -> (Buffer, Vec<Highlight>) {
        let mut buffer = Buffer::new(w, h);
        let hs = {
            let mut canvas = CellCanvas::new(&mut buffer, 0, 0, w, h);
            f.draw(&mut canvas)
        };
        (buffer, hs)
    }

    #[test]
    fn test_focus_swaps_background() {
        let mut f = focuser("hello");
        f.set_focused_background(RED);
        f.set_normal_background(GREY);
        assert_eq!(f.background(), GREY);

        focus(&mut f);
        assert!(f.is_focused());
        assert_eq!(f.background(), RED);

        unfocus(&mut f);
        assert!(!f.is_focused());
        assert_eq!(f.background(), GREY);
    }

    #[test]
    fn test_setting_active_background_applies_immediately() {
        let mut f = focuser("hello");
        focus(&mut f);
        f.set_focused_background(BLUE);
        assert_eq!(f.background(), BLUE);
        f.set_normal_background(GREY);
        assert_eq!(f.background(), BLUE);
    }

    #[test]
    fn test_mutations_mark_dirty() {
        let mut f = focuser("hello");
        draw(&mut f, 10, 1);
        assert!(!f.needs_display());

        f.add_focusable_text("ell", SpanStyle::background(RED));
        assert!(f.needs_display());
        draw(&mut f, 10, 1);

        f.clear_focusable_texts();
        assert!(f.needs_display());
        draw(&mut f, 10, 1);

        f.did_update_focus(FocusUpdate::new(Some(ViewId(1)), Some(ViewId(2))));
        assert!(f.needs_display());
    }

    #[test]
    fn test_corner_radius_rounds_view_background() {
        let mut f = focuser("hi");
        f.set_text_insets(EdgeInsets::new(0.0, 2.0, 0.0, 2.0));
        f.set_normal_background(GREY);
        f.set_corner_radius(1.0);

        let (buffer, _) = draw(&mut f, 6, 1);
        assert_eq!(buffer.row_text(0), "▐ hi ▌");
        let left = buffer.get(0, 0).unwrap();
        let right = buffer.get(5, 0).unwrap();
        assert_eq!((left.fg, left.bg), (GREY, Color::DEFAULT));
        assert_eq!((right.fg, right.bg), (GREY, Color::DEFAULT));
        for x in 1..5 {
            assert_eq!(buffer.get(x, 0).unwrap().bg, GREY, "cell {x}");
        }

        f.set_corner_radius(0.0);
        let (buffer, _) = draw(&mut f, 6, 1);
        assert_eq!(buffer.row_text(0), "  hi  ");
        for x in 0..6 {
            assert_eq!(buffer.get(x, 0).unwrap().bg, GREY, "cell {x}");
        }
    }

    #[test]
    fn test_highlights_only_while_focused() {
        let mut f = focuser("hello world");
        f.add_focusable_text("world", SpanStyle::background(BLUE));
        assert!(f.highlights(Size::new(20.0, 1.0)).is_empty());

        focus(&mut f);
        let hs = f.highlights(Size::new(20.0, 1.0));
        assert_eq!(hs.len(), 1);
        assert_eq!(hs[0].range, CharRange::new(6, 5));

        f.clear_focusable_texts();
        assert!(f.highlights(Size::new(20.0, 1.0)).is_empty());
        let (_, drawn) = draw(&mut f, 20, 1);
        assert!(drawn.is_empty());
    }

    #[test]
    fn test_draw_paints_highlight_under_glyphs() {
        let mut f = focuser("hello world");
        f.set_focus_offset(Point::ZERO);
        f.add_focusable_text("world", SpanStyle::background(BLUE));
        focus(&mut f);

        let (buffer, hs) = draw(&mut f, 20, 1);
        assert_eq!(hs.len(), 1);
        assert_eq!(buffer.row_text(0).trim_end(), "hello world");
        for x in 6..11 {
            assert_eq!(buffer.get(x, 0).unwrap().bg, BLUE, "cell {x}");
        }
        assert_eq!(buffer.get(5, 0).unwrap().bg, Color::DEFAULT);
        assert_eq!(buffer.get(11, 0).unwrap().bg, Color::DEFAULT);
    }

    #[test]
    fn test_wide_glyph_inside_highlight_keeps_right_half() {
        let mut f = focuser("a你b");
        f.set_focus_offset(Point::ZERO);
        f.add_focusable_text("你", SpanStyle::background(BLUE));
        focus(&mut f);

        let (buffer, hs) = draw(&mut f, 6, 1);
        assert_eq!(hs.len(), 1);
        assert_eq!(hs[0].rect.size.width, 2.0);
        assert_eq!(buffer.get(1, 0).unwrap().ch, '你');
        let half = buffer.get(2, 0).unwrap();
        assert!(half.is_continuation());
        assert_eq!(half.bg, BLUE);
        assert_eq!(buffer.get(3, 0).unwrap().ch, 'b');
        assert_eq!(buffer.row_text(0), "a你b  ");
    }

    #[test]
    fn test_unfocus_removes_highlight_keeps_text() {
        let mut f = focuser("hello world");
        f.set_focus_offset(Point::ZERO);
        f.add_focusable_text("world", SpanStyle::background(BLUE).with_text_color(RED));
        focus(&mut f);
        let (focused, _) = draw(&mut f, 20, 1);
        assert_eq!(focused.get(6, 0).unwrap().fg, RED);

        unfocus(&mut f);
        let (buffer, hs) = draw(&mut f, 20, 1);
        assert!(hs.is_empty());
        assert_eq!(buffer.row_text(0).trim_end(), "hello world");
        assert_eq!(buffer.get(6, 0).unwrap().bg, Color::DEFAULT);
        assert_eq!(buffer.get(6, 0).unwrap().fg, Color::DEFAULT);
        assert_eq!(f.text().as_str(), "hello world");
    }

    #[test]
    fn test_text_insets_shift_glyphs_and_highlights_together() {
        let mut f = focuser("abc");
        f.set_text_insets(EdgeInsets::new(1.0, 2.0, 0.0, 0.0));
        f.set_focus_offset(Point::ZERO);
        f.add_focusable_range(CharRange::new(1, 1), SpanStyle::background(BLUE));
        focus(&mut f);

        let (buffer, _) = draw(&mut f, 10, 3);
        assert_eq!(buffer.get(2, 1).unwrap().ch, 'a');
        assert_eq!(buffer.get(3, 1).unwrap().ch, 'b');
        assert_eq!(buffer.get(3, 1).unwrap().bg, BLUE);
        assert_eq!(buffer.get(2, 1).unwrap().bg, Color::DEFAULT);
        assert_eq!(buffer.get(3, 0).unwrap().bg, Color::DEFAULT);
    }

    #[test]
    fn test_tap_notifies_listener() {
        let taps = Rc::new(StdCell::new(0));
        let seen = Rc::clone(&taps);
        let mut f = focuser("tap me");
        f.set_listener(move |v: &TextFocuser| {
            assert_eq!(v.id(), ME);
            seen.set(seen.get() + 1);
        });
        f.tap();
        f.tap();
        assert_eq!(taps.get(), 2);

        f.clear_listener();
        f.tap();
        assert_eq!(taps.get(), 2);
    }

    #[test]
    fn test_default_listener_is_noop() {
        struct Silent;
        impl TextFocuserListener for Silent {}
        let mut f = focuser("x");
        f.set_listener(Silent);
        f.tap();
    }
}
