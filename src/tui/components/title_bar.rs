//! # TitleBar Component
//!
//! Top status line: who is logged in, the latest status message and a
//! loading marker while an inventory fetch is outstanding.
//!
//! Stateless; all data arrives as props:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(app.gamertag(), &app.status_message, app.is_loading);
//! title_bar.render(frame, area);
//! ```
//!
//! Formatting priority, most specific first:
//!
//! 1. `"Armory (Chief) | Loading inventory... | ⟳"`
//! 2. `"Armory (Chief) | Equipped Mark VII"`
//! 3. `"Armory"` when logged out with no status

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar<'a> {
    pub gamertag: Option<&'a str>,
    pub status_message: &'a str,
    pub is_loading: bool,
}

impl<'a> TitleBar<'a> {
    pub fn new(gamertag: Option<&'a str>, status_message: &'a str, is_loading: bool) -> Self {
        Self {
            gamertag,
            status_message,
            is_loading,
        }
    }

    fn text(&self) -> String {
        let mut text = match self.gamertag {
            Some(tag) => format!("Armory ({tag})"),
            None => String::from("Armory"),
        };
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(self.status_message);
        }
        if self.is_loading {
            text.push_str(" | ⟳");
        }
        text
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(self.text(), Style::default().fg(Color::Cyan)));
        frame.render_widget(line, area);
    }
}
