//! Text Module — Styled text content.
//!
//! Responsibilities:
//! - `StyledText`: a string plus contiguous style runs covering it
//! - Substring lookup in character coordinates (first occurrence)
//! - Foreground overrides over a character range (used for span text colors)
//! - Markdown → styled text (via pulldown-cmark)

use crate::text_utils::{char_count, char_to_byte_idx};
use crate::types::{CellAttrs, CharRange, Color};

/// Per-run style attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStyle {
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
}

impl RunStyle {
    pub fn fg(fg: Color) -> Self {
        Self {
            fg,
            ..Self::default()
        }
    }

    pub fn with_attrs(mut self, attrs: CellAttrs) -> Self {
        self.attrs = attrs;
        self
    }
}

/// A maximal character range sharing one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRun {
    pub range: CharRange,
    pub style: RunStyle,
}

/// Displayed text plus per-run style attributes.
///
/// Runs are contiguous, non-empty and cover the whole text; adjacent runs
/// never share a style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledText {
    text: String,
    char_len: usize,
    runs: Vec<StyleRun>,
}

impl StyledText {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        let mut styled = Self::default();
        styled.push(&text.into(), style);
        styled
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::default())
    }

    /// Append text with the given style.
    pub fn push(&mut self, text: &str, style: RunStyle) {
        let len = char_count(text);
        if len == 0 {
            return;
        }
        self.text.push_str(text);
        match self.runs.last_mut() {
            Some(last) if last.style == style => last.range.length += len,
            _ => self.runs.push(StyleRun {
                range: CharRange::new(self.char_len, len),
                style,
            }),
        }
        self.char_len += len;
    }

    pub fn with(mut self, text: &str, style: RunStyle) -> Self {
        self.push(text, style);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    pub fn runs(&self) -> &[StyleRun] {
        &self.runs
    }

    pub fn full_range(&self) -> CharRange {
        CharRange::new(0, self.char_len)
    }

    /// Style in effect at a character index.
    pub fn style_at(&self, index: usize) -> Option<RunStyle> {
        self.runs
            .iter()
            .find(|run| run.range.contains_index(index))
            .map(|run| run.style)
    }

    /// Substring covered by a character range, clamped to the text.
    pub fn slice(&self, range: CharRange) -> &str {
        let start = char_to_byte_idx(&self.text, range.location.min(self.char_len));
        let end = char_to_byte_idx(&self.text, range.end().min(self.char_len));
        &self.text[start..end]
    }

    /// Character range of the first occurrence of `needle`.
    /// An empty needle is never found.
    pub fn find(&self, needle: &str) -> Option<CharRange> {
        if needle.is_empty() {
            return None;
        }
        let byte_idx = self.text.find(needle)?;
        let location = char_count(&self.text[..byte_idx]);
        Some(CharRange::new(location, char_count(needle)))
    }

    /// Override the foreground color over `range`, splitting runs at its
    /// boundaries. Parts of the range outside the text are ignored.
    pub fn set_foreground(&mut self, range: CharRange, fg: Color) {
        let range = range.intersection(self.full_range());
        if range.is_empty() {
            return;
        }

        let mut runs: Vec<StyleRun> = Vec::with_capacity(self.runs.len() + 2);
        for run in &self.runs {
            let overlap = run.range.intersection(range);
            if overlap.is_empty() {
                push_merged(&mut runs, *run);
                continue;
            }
            if overlap.location > run.range.location {
                push_merged(
                    &mut runs,
                    StyleRun {
                        range: CharRange::new(
                            run.range.location,
                            overlap.location - run.range.location,
                        ),
                        style: run.style,
                    },
                );
            }
            push_merged(
                &mut runs,
                StyleRun {
                    range: overlap,
                    style: RunStyle { fg, ..run.style },
                },
            );
            if overlap.end() < run.range.end() {
                push_merged(
                    &mut runs,
                    StyleRun {
                        range: CharRange::new(overlap.end(), run.range.end() - overlap.end()),
                        style: run.style,
                    },
                );
            }
        }
        self.runs = runs;
    }

    /// Parse Markdown into styled text.
    ///
    /// Supported structures: headings (coloured, bold), bold, italic,
    /// strikethrough, inline code, code blocks, links (underlined), list
    /// items, paragraphs and line breaks.
    pub fn from_markdown(content: &str) -> Self {
        use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

        let parser = Parser::new_ext(content, Options::ENABLE_STRIKETHROUGH);
        let mut out = StyledText::default();

        let mut bold = false;
        let mut italic = false;
        let mut strikethrough = false;
        let mut in_link = false;
        let mut in_code_block = false;
        let mut heading_level: u8 = 0;
        let mut list_depth: usize = 0;
        let mut pending_break = false;

        let heading_fg = |level: u8| match level {
            1 => Color::rgb(0x58, 0xa6, 0xff),
            2 => Color::rgb(0x3f, 0xb9, 0x50),
            _ => Color::rgb(0xd2, 0x99, 0x22),
        };

        for event in parser {
            match event {
                Event::Start(tag) => match tag {
                    Tag::Heading { level, .. } => {
                        heading_level = match level {
                            HeadingLevel::H1 => 1,
                            HeadingLevel::H2 => 2,
                            _ => 3,
                        };
                        bold = true;
                    }
                    Tag::Strong => bold = true,
                    Tag::Emphasis => italic = true,
                    Tag::Strikethrough => strikethrough = true,
                    Tag::CodeBlock(_) => in_code_block = true,
                    Tag::Link { .. } => in_link = true,
                    Tag::List(_) => list_depth += 1,
                    Tag::Item => {
                        if pending_break {
                            out.push("\n", RunStyle::default());
                            pending_break = false;
                        }
                        let indent = "  ".repeat(list_depth.saturating_sub(1));
                        out.push(&format!("{indent}• "), RunStyle::default());
                    }
                    _ => {}
                },
                Event::End(tag_end) => match tag_end {
                    TagEnd::Heading(_) => {
                        heading_level = 0;
                        bold = false;
                        pending_break = true;
                    }
                    TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock => {
                        in_code_block = false;
                        pending_break = true;
                    }
                    TagEnd::Strong => bold = false,
                    TagEnd::Emphasis => italic = false,
                    TagEnd::Strikethrough => strikethrough = false,
                    TagEnd::Link => in_link = false,
                    TagEnd::List(_) => list_depth = list_depth.saturating_sub(1),
                    _ => {}
                },
                Event::Text(text) => {
                    if pending_break {
                        out.push("\n", RunStyle::default());
                        pending_break = false;
                    }
                    let mut attrs = CellAttrs::empty();
                    if bold {
                        attrs |= CellAttrs::BOLD;
                    }
                    if italic {
                        attrs |= CellAttrs::ITALIC;
                    }
                    if strikethrough {
                        attrs |= CellAttrs::STRIKETHROUGH;
                    }
                    if in_link {
                        attrs |= CellAttrs::UNDERLINE;
                    }
                    let fg = if in_link {
                        Color::rgb(0x58, 0xa6, 0xff)
                    } else if in_code_block {
                        Color::rgb(0xaa, 0xaa, 0xaa)
                    } else if heading_level > 0 {
                        heading_fg(heading_level)
                    } else {
                        Color::DEFAULT
                    };
                    let text: &str = &text;
                    let text = if in_code_block {
                        text.trim_end_matches('\n')
                    } else {
                        text
                    };
                    out.push(text, RunStyle { fg, bg: Color::DEFAULT, attrs });
                }
                Event::Code(code) => {
                    if pending_break {
                        out.push("\n", RunStyle::default());
                        pending_break = false;
                    }
                    out.push(
                        &code,
                        RunStyle::fg(Color::rgb(0xaa, 0xaa, 0xaa)).with_attrs(CellAttrs::BOLD),
                    );
                }
                Event::SoftBreak => out.push(" ", RunStyle::default()),
                Event::HardBreak => out.push("\n", RunStyle::default()),
                _ => {}
            }
        }

        out
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        StyledText::plain(text)
    }
}

impl From<String> for StyledText {
    fn from(text: String) -> Self {
        StyledText::plain(text)
    }
}

fn push_merged(runs: &mut Vec<StyleRun>, run: StyleRun) {
    if run.range.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.style == run.style && last.range.end() == run.range.location => {
            last.range.length += run.range.length;
        }
        _ => runs.push(run),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_merges_equal_styles() {
        let text = StyledText::plain("ab")
            .with("cd", RunStyle::default())
            .with("ef", RunStyle::fg(Color::rgb(1, 2, 3)));
        assert_eq!(text.len_chars(), 6);
        assert_eq!(text.runs().len(), 2);
        assert_eq!(text.runs()[0].range, CharRange::new(0, 4));
        assert_eq!(text.runs()[1].range, CharRange::new(4, 2));
    }

    #[test]
    fn test_find_first_occurrence_in_chars() {
        let text = StyledText::plain("été THIS and THIS");
        assert_eq!(text.find("THIS"), Some(CharRange::new(4, 4)));
        assert_eq!(text.find("missing"), None);
        assert_eq!(text.find(""), None);
    }

    #[test]
    fn test_slice_clamps() {
        let text = StyledText::plain("héllo");
        assert_eq!(text.slice(CharRange::new(1, 3)), "éll");
        assert_eq!(text.slice(CharRange::new(3, 10)), "lo");
    }

    #[test]
    fn test_set_foreground_splits_runs() {
        let red = Color::rgb(255, 0, 0);
        let mut text = StyledText::plain("0123456789");
        text.set_foreground(CharRange::new(3, 4), red);

        let runs = text.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].range, CharRange::new(0, 3));
        assert_eq!(runs[1].range, CharRange::new(3, 4));
        assert_eq!(runs[1].style.fg, red);
        assert_eq!(runs[2].range, CharRange::new(7, 3));
        assert_eq!(text.style_at(5).unwrap().fg, red);
        assert_eq!(text.style_at(7).unwrap().fg, Color::DEFAULT);
    }

    #[test]
    fn test_set_foreground_out_of_bounds_is_clamped() {
        let red = Color::rgb(255, 0, 0);
        let mut text = StyledText::plain("abc");
        text.set_foreground(CharRange::new(2, 50), red);
        assert_eq!(text.runs().len(), 2);
        assert_eq!(text.runs()[1].range, CharRange::new(2, 1));

        let before = text.clone();
        text.set_foreground(CharRange::new(10, 2), red);
        assert_eq!(text, before);
    }

    #[test]
    fn test_from_markdown_bold() {
        let text = StyledText::from_markdown("**bold** text");
        assert_eq!(text.as_str(), "bold text");
        assert!(text.style_at(0).unwrap().attrs.contains(CellAttrs::BOLD));
        assert!(!text.style_at(5).unwrap().attrs.contains(CellAttrs::BOLD));
    }

    #[test]
    fn test_from_markdown_paragraphs_break() {
        let text = StyledText::from_markdown("one\n\ntwo");
        assert_eq!(text.as_str(), "one\ntwo");
    }
}
