//! Highlight Module — maps span character ranges onto highlight rectangles.
//!
//! For every line of a laid-out frame, every run of the line and every
//! registered span (in that order), the run's range is intersected with the
//! span's resolved range. Each non-empty intersection of a span that has a
//! background color becomes one [`Highlight`]: the measured typographic bounds
//! of the intersection, padded by the focus offset, with corners rounded only
//! where the intersection touches the true start or end of the span. A span
//! wrapped across lines therefore renders as one continuous-looking shape.
//!
//! Rectangles are in lower-left origin coordinates of the view; flip them with
//! [`Rect::flipped`] before painting top-down.

use crate::span::SpanRegistry;
use crate::text::StyledText;
use crate::text_layout::TextFrame;
use crate::types::{CharRange, Color, Corners, Point, Rect};

/// One rectangle to paint behind the glyphs of a span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    /// Index of the span in registration order.
    pub span_index: usize,
    /// Characters covered by this rectangle.
    pub range: CharRange,
    pub rect: Rect,
    pub corners: Corners,
    pub corner_radius: f32,
    pub color: Color,
}

/// Which corners to round for an intersection of a span.
///
/// Leading corners round when the intersection starts where the span starts,
/// trailing corners when it ends where the span ends.
pub fn corners_for(intersection: CharRange, span: CharRange) -> Corners {
    let leading = intersection.location == span.location;
    let trailing = intersection.end() == span.end();
    match (leading, trailing) {
        (true, true) => Corners::ALL,
        (true, false) => Corners::LEFT,
        (false, true) => Corners::RIGHT,
        (false, false) => Corners::empty(),
    }
}

/// Invokes `f` with every highlight rectangle, in paint order.
///
/// `content` is the inset content rectangle in lower-left coordinates (its
/// origin is the bottom-left corner the frame was laid out at). Spans are
/// resolved against `text` on every call.
pub fn highlights_with(
    text: &StyledText,
    spans: &SpanRegistry,
    frame: &TextFrame,
    content: Rect,
    focus_offset: Point,
    mut f: impl FnMut(Highlight),
) {
    let resolved: Vec<_> = spans
        .resolved(text)
        .filter_map(|(index, span, range)| {
            let color = span.style.background?;
            Some((index, range?, color, span.style.corner_radius))
        })
        .collect();
    if resolved.is_empty() {
        return;
    }

    for line in &frame.lines {
        for run in &line.runs {
            for &(span_index, span_range, color, corner_radius) in &resolved {
                let intersection = span_range.intersection(run.range);
                if intersection.is_empty() {
                    continue;
                }

                let bounds = run.typographic_bounds(CharRange::new(
                    intersection.location - run.range.location,
                    intersection.length,
                ));
                let x_offset = line.offset_for_index(intersection.location);

                let rect = Rect::new(
                    line.origin.x + x_offset + content.origin.x - focus_offset.x,
                    line.origin.y - bounds.descent + content.origin.y - focus_offset.y,
                    bounds.width + focus_offset.x * 2.0,
                    bounds.ascent + bounds.descent + focus_offset.y * 2.0,
                );

                f(Highlight {
                    span_index,
                    range: intersection,
                    rect,
                    corners: corners_for(intersection, span_range),
                    corner_radius,
                    color,
                });
            }
        }
    }
}

/// Collects [`highlights_with`] into a vector.
pub fn compute_highlights(
    text: &StyledText,
    spans: &SpanRegistry,
    frame: &TextFrame,
    content: Rect,
    focus_offset: Point,
) -> Vec<Highlight> {
    let mut out = Vec::new();
    highlights_with(text, spans, frame, content, focus_offset, |h| out.push(h));
    out
}
