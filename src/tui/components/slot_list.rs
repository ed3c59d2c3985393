//! # Slot List Component
//!
//! Left column: one line per slot kind with the item currently equipped
//! there. Follows the persistent state + transient wrapper pattern:
//! `SlotListState` lives in `TuiState`, `SlotList` is built each frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::core::item::CurrentlyEquipped;
use crate::core::slot::SlotKind;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub struct SlotListState {
    pub selected: usize,
    pub list_state: ListState,
}

impl Default for SlotListState {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotListState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            selected: 0,
            list_state,
        }
    }

    pub fn selected_slot(&self) -> SlotKind {
        SlotKind::all()
            .nth(self.selected)
            .unwrap_or(SlotKind::ArmorCore)
    }
}

pub enum SlotListEvent {
    /// The highlighted slot moved.
    Changed(SlotKind),
}

impl EventHandler for SlotListState {
    type Event = SlotListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<SlotListEvent> {
        let last = SlotKind::all().count().saturating_sub(1);
        let next = match event {
            TuiEvent::CursorUp => self.selected.saturating_sub(1),
            TuiEvent::CursorDown => (self.selected + 1).min(last),
            _ => return None,
        };
        if next == self.selected {
            return None;
        }
        self.selected = next;
        self.list_state.select(Some(next));
        Some(SlotListEvent::Changed(self.selected_slot()))
    }
}

pub struct SlotList<'a> {
    state: &'a mut SlotListState,
    equipped: Option<&'a CurrentlyEquipped>,
    focused: bool,
}

impl<'a> SlotList<'a> {
    pub fn new(
        state: &'a mut SlotListState,
        equipped: Option<&'a CurrentlyEquipped>,
        focused: bool,
    ) -> Self {
        Self {
            state,
            equipped,
            focused,
        }
    }
}

impl Component for SlotList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = SlotKind::all()
            .enumerate()
            .map(|(i, kind)| {
                let equipped_name = self
                    .equipped
                    .and_then(|e| e.get(kind))
                    .map(|item| item.display_name())
                    .unwrap_or("-");
                let style = if i == self.state.selected && self.focused {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else if i == self.state.selected {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(vec![
                    Line::from(Span::styled(kind.label(), style)),
                    Line::from(Span::styled(
                        format!("  {equipped_name}"),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let border = if self.focused { Color::Cyan } else { Color::DarkGray };
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Slots "),
        );
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
