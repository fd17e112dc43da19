//! Span Module — focusable span registry.
//!
//! Spans are identified by literal substring or by explicit character range.
//! Nothing is validated when a span is added; resolution against the current
//! text happens on every draw, so a span that stops matching simply paints
//! nothing.

use crate::text::StyledText;
use crate::types::{CharRange, Color};

/// How a span locates its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanSource {
    /// First occurrence of a literal substring.
    Substring(String),
    /// Explicit character range.
    Range(CharRange),
}

/// Visual treatment of a span while its view is focused.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpanStyle {
    pub text_color: Option<Color>,
    pub background: Option<Color>,
    pub corner_radius: f32,
}

impl SpanStyle {
    pub fn background(color: Color) -> Self {
        Self {
            background: Some(color),
            ..Self::default()
        }
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusableSpan {
    pub source: SpanSource,
    pub style: SpanStyle,
}

impl FocusableSpan {
    /// Resolve against the current text. `None` when the substring is absent
    /// or the range falls outside the text.
    pub fn resolve(&self, text: &StyledText) -> Option<CharRange> {
        match &self.source {
            SpanSource::Substring(needle) => text.find(needle),
            SpanSource::Range(range) => {
                if range.end() <= text.len_chars() {
                    Some(*range)
                } else {
                    None
                }
            }
        }
    }
}

/// Ordered list of spans. Registration order is paint order.
#[derive(Debug, Clone, Default)]
pub struct SpanRegistry {
    spans: Vec<FocusableSpan>,
}

impl SpanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_substring(&mut self, text: impl Into<String>, style: SpanStyle) {
        self.spans.push(FocusableSpan {
            source: SpanSource::Substring(text.into()),
            style,
        });
    }

    pub fn add_range(&mut self, range: CharRange, style: SpanStyle) {
        self.spans.push(FocusableSpan {
            source: SpanSource::Range(range),
            style,
        });
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Every span with its range resolved against `text`, in registration
    /// order. Recomputed on each call.
    pub fn resolved<'a>(
        &'a self,
        text: &'a StyledText,
    ) -> impl Iterator<Item = (usize, &'a FocusableSpan, Option<CharRange>)> + 'a {
        self.spans
            .iter()
            .enumerate()
            .map(move |(i, span)| (i, span, span.resolve(text)))
    }

    /// `text` with every resolved span's text color applied, in registration
    /// order.
    pub fn recolor(&self, text: &StyledText) -> StyledText {
        let mut out = text.clone();
        for (_, span, range) in self.resolved(text) {
            if let (Some(color), Some(range)) = (span.style.text_color, range) {
                out.set_foreground(range, color);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_substring_first_occurrence() {
        let text = StyledText::plain("ONLY THIS PORTION OF THIS STRING");
        let span = FocusableSpan {
            source: SpanSource::Substring("THIS".into()),
            style: SpanStyle::default(),
        };
        assert_eq!(span.resolve(&text), Some(CharRange::new(5, 4)));
    }

    #[test]
    fn test_resolve_missing_and_out_of_bounds() {
        let text = StyledText::plain("short");
        let missing = FocusableSpan {
            source: SpanSource::Substring("long".into()),
            style: SpanStyle::default(),
        };
        let oob = FocusableSpan {
            source: SpanSource::Range(CharRange::new(3, 5)),
            style: SpanStyle::default(),
        };
        let exact = FocusableSpan {
            source: SpanSource::Range(CharRange::new(0, 5)),
            style: SpanStyle::default(),
        };
        assert_eq!(missing.resolve(&text), None);
        assert_eq!(oob.resolve(&text), None);
        assert_eq!(exact.resolve(&text), Some(CharRange::new(0, 5)));
    }

    #[test]
    fn test_range_past_usize_max_is_unresolved() {
        let text = StyledText::plain("short");
        let mut registry = SpanRegistry::new();
        registry.add_range(
            CharRange::new(usize::MAX, 2),
            SpanStyle::background(Color::rgb(0, 0, 255)).with_text_color(Color::rgb(255, 0, 0)),
        );
        let resolved: Vec<_> = registry.resolved(&text).map(|(_, _, r)| r).collect();
        assert_eq!(resolved, vec![None]);
        assert_eq!(registry.recolor(&text), text);
    }

    #[test]
    fn test_resolution_follows_text_changes() {
        let mut registry = SpanRegistry::new();
        registry.add_substring("world", SpanStyle::default());

        let before = StyledText::plain("hello world");
        let after = StyledText::plain("goodbye");
        let r1: Vec<_> = registry.resolved(&before).map(|(_, _, r)| r).collect();
        let r2: Vec<_> = registry.resolved(&after).map(|(_, _, r)| r).collect();
        assert_eq!(r1, vec![Some(CharRange::new(6, 5))]);
        assert_eq!(r2, vec![None]);
    }

    #[test]
    fn test_recolor_applies_in_registration_order() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let mut registry = SpanRegistry::new();
        registry.add_range(CharRange::new(0, 4), SpanStyle::default().with_text_color(red));
        registry.add_range(CharRange::new(2, 4), SpanStyle::default().with_text_color(blue));
        registry.add_substring("nowhere", SpanStyle::default().with_text_color(red));

        let text = registry.recolor(&StyledText::plain("abcdefgh"));
        assert_eq!(text.style_at(1).unwrap().fg, red);
        assert_eq!(text.style_at(2).unwrap().fg, blue);
        assert_eq!(text.style_at(5).unwrap().fg, blue);
        assert_eq!(text.style_at(6).unwrap().fg, Color::DEFAULT);
    }

    #[test]
    fn test_clear() {
        let mut registry = SpanRegistry::new();
        registry.add_substring("a", SpanStyle::background(Color::rgb(0, 0, 255)));
        registry.add_range(CharRange::new(0, 1), SpanStyle::default());
        assert_eq!(registry.len(), 2);
        registry.clear();
        assert!(registry.is_empty());
    }
}
