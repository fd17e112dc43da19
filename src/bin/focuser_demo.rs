//! Two focusable texts and a status line.
//!
//! Tab, BackTab and the arrow keys move focus; Enter or Space taps the focused
//! text; `q` or Esc quits. Pass a JSON screen config path to show other views.
//! Logs go to `focuser_demo.log` in the temp directory (filter with
//! `RUST_LOG`).

use text_focuser::logging::init_file_logging;
use text_focuser::types::key;
use text_focuser::{
    CrosstermBackend, Result, Screen, ScreenConfig, ScreenEvent, TextFocuser, ViewId,
};

const DEMO_SCREEN: &str = r##"{
    "gap": 1,
    "views": [
        {
            "text": "THIS IS A STRING WHICH WILL BE ENTIRELY HIGHLIGHTED WHEN FOCUSED",
            "width": 40,
            "height": 3,
            "text_color": "#FFFFFF",
            "focused_background": "#FF0000"
        },
        {
            "text": "ONLY THIS PORTION OF THIS STRING WILL BE HIGHLIGHTED WHEN FOCUSED",
            "width": 40,
            "height": 3,
            "text_color": "#FFFFFF",
            "spans": [
                { "text": "THIS PORTION", "background": "#0000FF", "corner_radius": 1 }
            ]
        }
    ]
}"##;

const HINT: &str = "Tab/arrows: move focus  Enter/Space: tap  q: quit";

fn main() -> Result<()> {
    let _log_guard = init_file_logging(&std::env::temp_dir(), "focuser_demo.log");

    let config = match std::env::args().nth(1) {
        Some(path) => ScreenConfig::load(path)?,
        None => ScreenConfig::from_json(DEMO_SCREEN)?,
    };

    let mut screen = Screen::new(Box::new(CrosstermBackend::new()))?;
    let views = config.populate(&mut screen)?;

    let mut status = TextFocuser::new();
    status.set_text(HINT);
    status.set_focusable(false);
    let status_id = screen.add_view(status)?;

    screen.focus_next();
    screen.init()?;
    let result = run(&mut screen, &views, status_id);
    let restored = screen.shutdown();
    if let Err(e) = &result {
        tracing::error!(target: "text_focuser.demo", error = %e, "demo failed");
    }
    result.and(restored)
}

fn tapped_label(views: &[ViewId], id: ViewId) -> Option<String> {
    match views.iter().position(|&v| v == id)? {
        0 => Some("THE FIRST TEXT WAS TAPPED".to_string()),
        1 => Some("THE SECOND TEXT WAS TAPPED".to_string()),
        n => Some(format!("TEXT {} WAS TAPPED", n + 1)),
    }
}

fn run(screen: &mut Screen, views: &[ViewId], status_id: ViewId) -> Result<()> {
    loop {
        screen.render_if_needed()?;
        screen.read_input(50)?;

        while let Some(event) = screen.next_event() {
            match event {
                ScreenEvent::Tapped(id) => {
                    if let (Some(label), Some(status)) =
                        (tapped_label(views, id), screen.view_mut(status_id))
                    {
                        tracing::info!(target: "text_focuser.demo", view = %id, "tapped");
                        status.set_text(label);
                    }
                }
                ScreenEvent::Key { code: key::ESCAPE, .. }
                | ScreenEvent::Key { character: 'q', .. } => return Ok(()),
                _ => {}
            }
        }
    }
}
