//! Config Module — declarative screens loaded from JSON.
//!
//! A [`ScreenConfig`] lists views top to bottom; each [`FocuserConfig`]
//! carries the text, colors, geometry and focusable spans of one view.
//! Colors are `"#RRGGBB"` strings or palette indices.

use std::path::Path;

use serde::Deserialize;

use crate::error::{FocuserError, Result};
use crate::focuser::TextFocuser;
use crate::screen::Screen;
use crate::span::SpanStyle;
use crate::text::StyledText;
use crate::types::{CharRange, Color, EdgeInsets, Point, ViewId};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Hex(String),
    Indexed(u8),
}

impl ColorSpec {
    pub fn to_color(&self) -> Result<Color> {
        match self {
            ColorSpec::Hex(s) => Color::from_hex(s).ok_or_else(|| FocuserError::InvalidColor(s.clone())),
            ColorSpec::Indexed(i) => Ok(Color::indexed(*i)),
        }
    }
}

fn resolve(color: &Option<ColorSpec>) -> Result<Option<Color>> {
    color.as_ref().map(ColorSpec::to_color).transpose()
}

/// One focusable span. Exactly one of `text` or `range` must be set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpanConfig {
    pub text: Option<String>,
    /// `[location, length]` in characters.
    pub range: Option<[usize; 2]>,
    pub background: Option<ColorSpec>,
    pub text_color: Option<ColorSpec>,
    pub corner_radius: f32,
}

impl SpanConfig {
    fn style(&self) -> Result<SpanStyle> {
        Ok(SpanStyle {
            text_color: resolve(&self.text_color)?,
            background: resolve(&self.background)?,
            corner_radius: self.corner_radius,
        })
    }

    fn apply(&self, focuser: &mut TextFocuser) -> Result<()> {
        let style = self.style()?;
        match (&self.text, self.range) {
            (Some(text), None) => focuser.add_focusable_text(text.clone(), style),
            (None, Some([location, length])) => {
                focuser.add_focusable_range(CharRange::new(location, length), style)
            }
            (Some(_), Some(_)) => {
                return Err(FocuserError::InvalidSpan(
                    "span sets both `text` and `range`".into(),
                ))
            }
            (None, None) => {
                return Err(FocuserError::InvalidSpan(
                    "span needs `text` or `range`".into(),
                ))
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FocuserConfig {
    pub text: String,
    /// Parse `text` as CommonMark.
    pub markdown: bool,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub focusable: bool,
    pub text_color: Option<ColorSpec>,
    pub focused_background: Option<ColorSpec>,
    pub normal_background: Option<ColorSpec>,
    pub corner_radius: f32,
    /// `[x, y]` padding around each highlight.
    pub focus_offset: Option<[f32; 2]>,
    /// `[top, left, bottom, right]`.
    pub text_insets: Option<[f32; 4]>,
    pub spans: Vec<SpanConfig>,
}

impl Default for FocuserConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            markdown: false,
            width: None,
            height: None,
            focusable: true,
            text_color: None,
            focused_background: None,
            normal_background: None,
            corner_radius: 0.0,
            focus_offset: None,
            text_insets: None,
            spans: Vec::new(),
        }
    }
}

impl FocuserConfig {
    pub fn build(&self) -> Result<TextFocuser> {
        let mut focuser = TextFocuser::new();

        let mut text = if self.markdown {
            StyledText::from_markdown(&self.text)
        } else {
            StyledText::plain(self.text.as_str())
        };
        if let Some(fg) = resolve(&self.text_color)? {
            // Markdown styling keeps its attributes; only the color changes.
            let full = text.full_range();
            text.set_foreground(full, fg);
        }
        focuser.set_text(text);

        if let Some(color) = resolve(&self.focused_background)? {
            focuser.set_focused_background(color);
        }
        if let Some(color) = resolve(&self.normal_background)? {
            focuser.set_normal_background(color);
        }
        focuser.set_corner_radius(self.corner_radius);
        if let Some([x, y]) = self.focus_offset {
            focuser.set_focus_offset(Point::new(x, y));
        }
        if let Some([top, left, bottom, right]) = self.text_insets {
            focuser.set_text_insets(EdgeInsets::new(top, left, bottom, right));
        }
        focuser.set_focusable(self.focusable);

        for span in &self.spans {
            span.apply(&mut focuser)?;
        }
        Ok(focuser)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
    /// Rows between stacked views.
    pub gap: f32,
    pub views: Vec<FocuserConfig>,
}

impl ScreenConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::info!(
            target: "text_focuser.config",
            path = %path.display(),
            views = config.views.len(),
            "loaded screen config"
        );
        Ok(config)
    }

    /// Build every view and add it to `screen`, top to bottom.
    pub fn populate(&self, screen: &mut Screen) -> Result<Vec<ViewId>> {
        screen.set_gap(self.gap)?;
        let mut ids = Vec::with_capacity(self.views.len());
        for view in &self.views {
            let id = screen.add_view(view.build()?)?;
            screen.set_view_size(id, view.width, view.height)?;
            ids.push(id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusUpdate;
    use crate::terminal::MockBackend;
    use crate::types::Size;

    const SAMPLE: &str = r##"{
        "gap": 1,
        "views": [
            {
                "text": "THIS IS A STRING WHICH WILL BE HIGHLIGHTED",
                "width": 24,
                "height": 3,
                "focused_background": "#00C800",
                "normal_background": 236,
                "corner_radius": 1,
                "spans": [
                    { "range": [0, 42], "background": "#FF0000", "text_color": "#FFFFFF", "corner_radius": 1 }
                ]
            },
            {
                "text": "ONLY THIS PORTION OF THIS STRING",
                "spans": [ { "text": "THIS PORTION", "background": "#0000FF" } ]
            }
        ]
    }"##;

    #[test]
    fn test_parse_and_build() {
        let config = ScreenConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.views.len(), 2);
        assert_eq!(config.gap, 1.0);

        let first = config.views[0].build().unwrap();
        assert_eq!(first.focused_background(), Color::rgb(0, 200, 0));
        assert_eq!(first.normal_background(), Color::indexed(236));
        assert_eq!(first.background(), Color::indexed(236));
        assert_eq!(first.corner_radius(), 1.0);
        assert_eq!(first.spans().len(), 1);
        assert!(first.is_focusable());

        let second = config.views[1].build().unwrap();
        assert_eq!(second.focus_offset(), Point::new(1.0, 0.0));
    }

    #[test]
    fn test_populate_screen() {
        let config = ScreenConfig::from_json(SAMPLE).unwrap();
        let mut screen = Screen::new(Box::new(MockBackend::new(40, 10))).unwrap();
        let ids = config.populate(&mut screen).unwrap();
        assert_eq!(ids.len(), 2);
        screen.compute_layout().unwrap();
        let frame = screen.view_frame(ids[1]).unwrap();
        assert_eq!(frame.origin.y, 4.0);
        assert_eq!(frame.size.width, 40.0);
    }

    #[test]
    fn test_built_view_highlights_when_focused() {
        let config = ScreenConfig::from_json(SAMPLE).unwrap();
        let mut view = config.views[1].build().unwrap().with_id(ViewId(3));
        view.did_update_focus(FocusUpdate::new(None, Some(ViewId(3))));
        let hs = view.highlights(Size::new(40.0, 1.0));
        assert_eq!(hs.len(), 1);
        assert_eq!(hs[0].range, CharRange::new(5, 12));
    }

    #[test]
    fn test_span_range_beyond_text_draws_without_highlight() {
        let json = r##"{
            "text": "ONLY THIS PORTION",
            "focused_background": "#00C800",
            "spans": [
                { "range": [18446744073709551615, 1], "background": "#0000FF", "text_color": "#FF0000" }
            ]
        }"##;
        let config: FocuserConfig = serde_json::from_str(json).unwrap();
        let mut view = config.build().unwrap().with_id(ViewId(4));
        view.did_update_focus(FocusUpdate::new(None, Some(ViewId(4))));

        assert!(view.highlights(Size::new(24.0, 1.0)).is_empty());
        let buf = crate::render::render_view(&mut view, 24, 1);
        assert_eq!(buf.row_text(0), "  ONLY THIS PORTION     ");
        assert_eq!(buf.get(2, 0).unwrap().fg, Color::DEFAULT);
    }

    #[test]
    fn test_invalid_color() {
        let json = r##"{ "views": [ { "text": "x", "focused_background": "#12" } ] }"##;
        let config = ScreenConfig::from_json(json).unwrap();
        assert!(matches!(
            config.views[0].build(),
            Err(FocuserError::InvalidColor(s)) if s == "#12"
        ));
    }

    #[test]
    fn test_span_needs_exactly_one_source() {
        let both = r#"{ "text": "abc", "spans": [ { "text": "a", "range": [0, 1] } ] }"#;
        let neither = r#"{ "text": "abc", "spans": [ { "background": 1 } ] }"#;
        for json in [both, neither] {
            let config: FocuserConfig = serde_json::from_str(json).unwrap();
            assert!(matches!(config.build(), Err(FocuserError::InvalidSpan(_))));
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ScreenConfig::from_json(r#"{ "views": [], "colour": 1 }"#).unwrap_err();
        assert!(matches!(err, FocuserError::Config(_)));
    }

    #[test]
    fn test_markdown_text_with_color() {
        let json = r##"{ "text": "**bold** text", "markdown": true, "text_color": "#FFFFFF" }"##;
        let config: FocuserConfig = serde_json::from_str(json).unwrap();
        let view = config.build().unwrap();
        assert_eq!(view.text().as_str(), "bold text");
        let style = view.text().style_at(0).unwrap();
        assert_eq!(style.fg, Color::rgb(255, 255, 255));
        assert!(style.attrs.contains(crate::types::CellAttrs::BOLD));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ScreenConfig::load("/nonexistent/focuser.json").unwrap_err();
        assert!(matches!(err, FocuserError::Io(_)));
    }
}
