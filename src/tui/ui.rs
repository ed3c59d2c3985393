use crate::core::state::{App, Screen};
use crate::tui::component::Component;
use crate::tui::components::{ItemDetail, ItemList, SlotList, TitleBar, row_entries};
use crate::tui::{Focus, TuiState};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

const HELP: &str = " ↑↓ Move  ←→ Column  Enter Equip  r Reload  q Quit ";
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(1)]);
    let [title_area, main_area, help_area] = layout.areas(frame.area());

    TitleBar::new(app.gamertag(), &app.status_message, app.is_loading).render(frame, title_area);

    match &app.screen {
        Screen::Loading => {
            let spinner = SPINNER[spinner_frame % SPINNER.len()];
            draw_message(frame, main_area, &format!("{spinner} Loading inventory..."), Color::Cyan);
        }
        Screen::LoggedOut => draw_message(
            frame,
            main_area,
            "Not logged in. Run `armory login <gamertag> <xuid> <spartan-key>`.",
            Color::Yellow,
        ),
        Screen::Unavailable(error) => draw_error_view(frame, main_area, error),
        Screen::Armory => draw_armory(frame, main_area, app, tui),
    }

    frame.render_widget(
        Line::from(HELP).style(Style::default().fg(Color::DarkGray)),
        help_area,
    );
}

fn draw_message(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let [_, center, _] = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, center);
}

fn draw_error_view(frame: &mut Frame, area: Rect, error_msg: &str) {
    let error_paragraph = Paragraph::new(format!("{error_msg}\n\nPress r to retry."))
        .block(Block::bordered().title("ERROR"))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(error_paragraph, area);
}

fn draw_armory(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    let Some(armory) = &app.armory else {
        return;
    };
    let [slot_area, item_area, detail_area] = Layout::horizontal([
        Constraint::Length(28),
        Constraint::Min(20),
        Constraint::Length(40),
    ])
    .areas(area);

    let slot = tui.slots.selected_slot();

    SlotList::new(&mut tui.slots, Some(&armory.equipped), tui.focus == Focus::Slots)
        .render(frame, slot_area);

    ItemList::new(
        &mut tui.items,
        armory,
        slot,
        tui.focus == Focus::Items,
        app.in_flight.is_pending(slot),
    )
    .render(frame, item_area);

    let entries = row_entries(armory, slot);
    let entry = entries.get(tui.items.selected);
    ItemDetail {
        item: entry.and_then(|e| e.preview()),
        images: &app.image_cache,
        heading: entry.map(|e| e.label()),
    }
    .render(frame, detail_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{loaded_app, test_app};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(app: &App, tui: &mut TuiState) -> String {
        let backend = TestBackend::new(110, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_loading_screen() {
        let app = test_app();
        let text = screen_text(&app, &mut TuiState::new());
        assert!(text.contains("Loading inventory"));
    }

    #[test]
    fn test_armory_screen_shows_all_columns() {
        let app = loaded_app();
        let text = screen_text(&app, &mut TuiState::new());
        assert!(text.contains("Slots"));
        assert!(text.contains("Core"));
        assert!(text.contains("Details"));
        assert!(text.contains("● C1"));
    }
}
