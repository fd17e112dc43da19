//! Text Layout Module — lays styled text out into lines and runs on the cell grid.
//!
//! Responsibilities:
//! - Hard breaks at `\n`, word wrap at Unicode word boundaries, character
//!   fallback for words wider than the frame
//! - Lines positioned with lower-left origin coordinates inside the frame
//! - Runs: maximal per-line ranges sharing one style
//! - Measurement primitives used by highlight geometry:
//!   [`Run::typographic_bounds`] and [`Line::offset_for_index`]

use crate::text::{RunStyle, StyledText};
use crate::text_utils::{char_width, word_segments};
use crate::types::{CharRange, Point, Size};

/// Slack for float comparisons against the frame edges.
const EPSILON: f32 = 1e-3;

/// Vertical font metrics, in cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            ascent: 1.0,
            descent: 0.0,
        }
    }
}

impl FontMetrics {
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Ascent, descent and advance width of a measured range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TypographicBounds {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub advance: f32,
}

/// A maximal contiguous range of one line sharing a style.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub range: CharRange,
    pub style: RunStyle,
    /// Horizontal offset of the run's first glyph from the line origin.
    pub x: f32,
    pub glyphs: Vec<Glyph>,
    metrics: FontMetrics,
}

impl Run {
    pub fn width(&self) -> f32 {
        self.glyphs.iter().map(|g| g.advance).sum()
    }

    /// Bounds of a sub-range given relative to the run start. The portion
    /// outside the run contributes nothing.
    pub fn typographic_bounds(&self, sub: CharRange) -> TypographicBounds {
        let start = sub.location.min(self.glyphs.len());
        let end = sub.end().min(self.glyphs.len());
        TypographicBounds {
            width: self.glyphs[start..end].iter().map(|g| g.advance).sum(),
            ascent: self.metrics.ascent,
            descent: self.metrics.descent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Baseline origin, lower-left coordinates relative to the frame.
    pub origin: Point,
    pub range: CharRange,
    pub runs: Vec<Run>,
}

impl Line {
    pub fn width(&self) -> f32 {
        self.runs.iter().map(Run::width).sum()
    }

    /// Distance from the line origin to the leading edge of the glyph at
    /// `index` (absolute character index). Indices outside the line clamp to
    /// its start or end.
    pub fn offset_for_index(&self, index: usize) -> f32 {
        let mut offset = 0.0;
        for run in &self.runs {
            if index <= run.range.location {
                break;
            }
            let take = (index - run.range.location).min(run.glyphs.len());
            offset = run.x + run.glyphs[..take].iter().map(|g| g.advance).sum::<f32>();
        }
        offset
    }
}

/// The result of laying text out into a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame {
    pub size: Size,
    pub metrics: FontMetrics,
    pub lines: Vec<Line>,
}

impl TextFrame {
    /// Character range actually visible in the frame.
    pub fn visible_range(&self) -> CharRange {
        match (self.lines.first(), self.lines.last()) {
            (Some(first), Some(last)) => CharRange::from(first.range.location..last.range.end()),
            _ => CharRange::default(),
        }
    }
}

/// Lay `text` out into a frame of the given size.
///
/// Lines that would start below the bottom of the frame are dropped.
pub fn layout_frame(text: &StyledText, frame: Size, metrics: FontMetrics) -> TextFrame {
    let chars: Vec<char> = text.as_str().chars().collect();
    let mut line_ranges: Vec<CharRange> = Vec::new();

    let mut paragraph_start = 0;
    while paragraph_start < chars.len() {
        let newline = chars[paragraph_start..]
            .iter()
            .position(|&c| c == '\n')
            .map(|p| paragraph_start + p);
        let paragraph_end = newline.unwrap_or(chars.len());

        let mut ranges = break_paragraph(text, &chars, paragraph_start, paragraph_end, frame.width);
        if newline.is_some() {
            // The newline belongs to the paragraph's last line.
            match ranges.last_mut() {
                Some(last) => last.length += 1,
                None => ranges.push(CharRange::new(paragraph_end, 1)),
            }
        }
        line_ranges.extend(ranges);
        paragraph_start = paragraph_end + 1;
    }

    let line_height = metrics.line_height();
    let mut lines = Vec::with_capacity(line_ranges.len());
    for (i, range) in line_ranges.into_iter().enumerate() {
        let top = frame.height - i as f32 * line_height;
        if top - line_height < -EPSILON {
            break;
        }
        lines.push(Line {
            origin: Point::new(0.0, top - metrics.ascent),
            range,
            runs: build_runs(text, &chars, range, metrics),
        });
    }

    tracing::trace!(
        target: "text_focuser.layout",
        lines = lines.len(),
        width = frame.width,
        height = frame.height,
        "layout_frame"
    );

    TextFrame {
        size: frame,
        metrics,
        lines,
    }
}

fn advance_of(ch: char) -> f32 {
    if ch == '\n' {
        0.0
    } else {
        char_width(ch)
    }
}

/// Greedy word wrap of `chars[start..end]` (no newlines inside).
fn break_paragraph(
    text: &StyledText,
    chars: &[char],
    start: usize,
    end: usize,
    max_width: f32,
) -> Vec<CharRange> {
    let mut ranges = Vec::new();
    if start == end {
        return ranges;
    }

    let paragraph = text.slice(CharRange::from(start..end));
    let mut line_start = start;
    let mut line_end = start;
    let mut x = 0.0f32;

    for (offset, len) in word_segments(paragraph) {
        let seg_start = start + offset;
        let seg_end = seg_start + len;
        let seg = &chars[seg_start..seg_end];
        let seg_width: f32 = seg.iter().map(|&c| advance_of(c)).sum();

        if seg.iter().all(|c| c.is_whitespace()) {
            // Trailing whitespace never forces a break.
            line_end = seg_end;
            x += seg_width;
            continue;
        }

        if line_end > line_start && x + seg_width > max_width + EPSILON {
            ranges.push(CharRange::from(line_start..line_end));
            line_start = seg_start;
            x = 0.0;
        }

        if seg_width > max_width + EPSILON {
            for (i, &c) in seg.iter().enumerate() {
                let w = advance_of(c);
                if line_end > line_start && x + w > max_width + EPSILON {
                    ranges.push(CharRange::from(line_start..seg_start + i));
                    line_start = seg_start + i;
                    x = 0.0;
                }
                line_end = seg_start + i + 1;
                x += w;
            }
        } else {
            line_end = seg_end;
            x += seg_width;
        }
    }

    if line_end > line_start {
        ranges.push(CharRange::from(line_start..line_end));
    }
    ranges
}

fn build_runs(text: &StyledText, chars: &[char], line: CharRange, metrics: FontMetrics) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut x = 0.0;
    for style_run in text.runs() {
        let range = style_run.range.intersection(line);
        if range.is_empty() {
            continue;
        }
        let glyphs: Vec<Glyph> = chars[range.location..range.end()]
            .iter()
            .map(|&ch| Glyph {
                ch,
                advance: advance_of(ch),
            })
            .collect();
        let width: f32 = glyphs.iter().map(|g| g.advance).sum();
        runs.push(Run {
            range,
            style: style_run.style,
            x,
            glyphs,
            metrics,
        });
        x += width;
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn lines_of(frame: &TextFrame, text: &StyledText) -> Vec<String> {
        frame
            .lines
            .iter()
            .map(|l| text.slice(l.range).to_string())
            .collect()
    }

    #[test]
    fn test_single_line_fits() {
        let text = StyledText::plain("hello world");
        let frame = layout_frame(&text, Size::new(20.0, 3.0), FontMetrics::default());
        assert_eq!(frame.lines.len(), 1);
        assert_eq!(frame.lines[0].range, CharRange::new(0, 11));
        assert_eq!(frame.lines[0].width(), 11.0);
        // Top line: baseline one ascent below the top edge.
        assert_eq!(frame.lines[0].origin, Point::new(0.0, 2.0));
    }

    #[test]
    fn test_word_wrap_keeps_trailing_space_on_line() {
        let text = StyledText::plain("THIS IS A STRING");
        let frame = layout_frame(&text, Size::new(9.0, 5.0), FontMetrics::default());
        assert_eq!(lines_of(&frame, &text), vec!["THIS IS A ", "STRING"]);
        assert_eq!(frame.lines[1].origin, Point::new(0.0, 3.0));
    }

    #[test]
    fn test_long_word_breaks_by_character() {
        let text = StyledText::plain("abcdefgh xy");
        let frame = layout_frame(&text, Size::new(3.0, 10.0), FontMetrics::default());
        assert_eq!(lines_of(&frame, &text), vec!["abc", "def", "gh ", "xy"]);
    }

    #[test]
    fn test_hard_breaks_own_newline() {
        let text = StyledText::plain("ab\n\ncd\n");
        let frame = layout_frame(&text, Size::new(10.0, 10.0), FontMetrics::default());
        assert_eq!(lines_of(&frame, &text), vec!["ab\n", "\n", "cd\n"]);
        assert_eq!(frame.lines[1].width(), 0.0);
    }

    #[test]
    fn test_lines_below_frame_are_dropped() {
        let text = StyledText::plain("one two three four");
        let frame = layout_frame(&text, Size::new(5.0, 2.0), FontMetrics::default());
        assert_eq!(frame.lines.len(), 2);
        assert_eq!(frame.visible_range(), CharRange::new(0, 8));

        let none = layout_frame(&text, Size::new(5.0, 0.0), FontMetrics::default());
        assert!(none.lines.is_empty());
    }

    #[test]
    fn test_runs_split_at_style_boundaries() {
        let red = RunStyle::fg(Color::rgb(255, 0, 0));
        let text = StyledText::plain("ab").with("cd", red).with("ef", RunStyle::default());
        let frame = layout_frame(&text, Size::new(20.0, 1.0), FontMetrics::default());
        let runs = &frame.lines[0].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].range, CharRange::new(2, 2));
        assert_eq!(runs[1].x, 2.0);
        assert_eq!(runs[1].style, red);
        assert_eq!(runs[2].x, 4.0);
    }

    #[test]
    fn test_measurement_primitives() {
        let text = StyledText::plain("a你b");
        let metrics = FontMetrics {
            ascent: 0.75,
            descent: 0.25,
        };
        let frame = layout_frame(&text, Size::new(10.0, 1.0), metrics);
        let line = &frame.lines[0];
        assert_eq!(line.offset_for_index(0), 0.0);
        assert_eq!(line.offset_for_index(1), 1.0);
        assert_eq!(line.offset_for_index(2), 3.0);
        assert_eq!(line.offset_for_index(99), 4.0);

        let bounds = line.runs[0].typographic_bounds(CharRange::new(1, 2));
        assert_eq!(bounds.width, 3.0);
        assert_eq!(bounds.ascent, 0.75);
        assert_eq!(bounds.descent, 0.25);
        assert_eq!(line.origin.y, 0.25);
    }

    #[test]
    fn test_offset_for_index_on_wrapped_line() {
        let text = StyledText::plain("aaa bbb");
        let frame = layout_frame(&text, Size::new(4.0, 2.0), FontMetrics::default());
        let second = &frame.lines[1];
        assert_eq!(second.range, CharRange::new(4, 3));
        assert_eq!(second.offset_for_index(5), 1.0);
        assert_eq!(second.offset_for_index(0), 0.0);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        let frame = layout_frame(&StyledText::default(), Size::new(4.0, 2.0), FontMetrics::default());
        assert!(frame.lines.is_empty());
        assert_eq!(frame.visible_range(), CharRange::default());
    }
}
