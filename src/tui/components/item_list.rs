//! # Item List Component
//!
//! Middle column: the catalog row of the selected slot, filtered to what
//! fits the equipped core. The kit slot also lists the user's custom kits
//! after the catalog kits. The highlighted entry carries a `●` marker.
//!
//! `ItemListState` lives in `TuiState`; `ItemList` borrows it per frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::core::action::Action;
use crate::core::inventory::KitEntry;
use crate::core::item::{CustomKit, EquippableItem};
use crate::core::slot::SlotKind;
use crate::core::state::ArmoryState;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// One selectable line of the item column.
#[derive(Debug, Clone, Copy)]
pub enum RowEntry<'a> {
    Item(&'a EquippableItem),
    Kit(usize, &'a CustomKit),
}

impl<'a> RowEntry<'a> {
    pub fn label(&self) -> &'a str {
        match *self {
            RowEntry::Item(item) => item.display_name(),
            RowEntry::Kit(_, kit) => &kit.name,
        }
    }

    /// The item shown in the detail pane: the catalog entry itself, or for
    /// a custom kit the item whose image represents the kit.
    pub fn preview(&self) -> Option<&'a EquippableItem> {
        match *self {
            RowEntry::Item(item) => Some(item),
            RowEntry::Kit(_, kit) => kit
                .image_slot()
                .and_then(|slot| kit.loadout.get(slot))
                .or_else(|| kit.loadout.core()),
        }
    }

    pub fn is_highlighted(&self, armory: &ArmoryState) -> bool {
        match self {
            RowEntry::Item(item) => armory.highlights.is_highlighted(item),
            RowEntry::Kit(_, kit) => kit.loadout.iter().all(|(kind, item)| {
                armory.highlights.get(kind) == Some(item.id.as_str())
            }),
        }
    }

    /// The action that equips this entry.
    pub fn equip_action(&self) -> Action {
        match self {
            RowEntry::Item(item) => Action::Equip((*item).clone()),
            RowEntry::Kit(index, _) => Action::EquipKit(*index),
        }
    }
}

/// Entries listed for `slot`. Core-bound rows are filtered to the equipped core.
pub fn row_entries(armory: &ArmoryState, slot: SlotKind) -> Vec<RowEntry<'_>> {
    if slot == SlotKind::ArmorKit {
        return armory
            .inventory
            .kit_row()
            .map(|entry| match entry {
                KitEntry::Catalog(item) => RowEntry::Item(item),
                KitEntry::Custom(index, kit) => RowEntry::Kit(index, kit),
            })
            .collect();
    }
    match armory.equipped.core() {
        Some(core) => armory
            .inventory
            .compatible_row(slot, core)
            .into_iter()
            .map(RowEntry::Item)
            .collect(),
        None => armory.inventory.row(slot).iter().map(RowEntry::Item).collect(),
    }
}

#[derive(Default)]
pub struct ItemListState {
    pub selected: usize,
    pub len: usize,
    pub list_state: ListState,
}

impl ItemListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the top; used when the slot changes.
    pub fn reset(&mut self) {
        self.selected = 0;
        self.list_state.select(Some(0));
    }

    /// Records the current row length and keeps the selection inside it.
    pub fn sync_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }
}

pub enum ItemListEvent {
    Moved(usize),
    Activate(usize),
}

impl EventHandler for ItemListState {
    type Event = ItemListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ItemListEvent> {
        if self.len == 0 {
            return None;
        }
        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                self.list_state.select(Some(self.selected));
                Some(ItemListEvent::Moved(self.selected))
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(self.len - 1);
                self.list_state.select(Some(self.selected));
                Some(ItemListEvent::Moved(self.selected))
            }
            TuiEvent::Submit => Some(ItemListEvent::Activate(self.selected)),
            _ => None,
        }
    }
}

pub struct ItemList<'a> {
    state: &'a mut ItemListState,
    armory: &'a ArmoryState,
    slot: SlotKind,
    focused: bool,
    /// The slot has an equip request outstanding.
    pending: bool,
}

impl<'a> ItemList<'a> {
    pub fn new(
        state: &'a mut ItemListState,
        armory: &'a ArmoryState,
        slot: SlotKind,
        focused: bool,
        pending: bool,
    ) -> Self {
        Self {
            state,
            armory,
            slot,
            focused,
            pending,
        }
    }
}

impl Component for ItemList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let entries = row_entries(self.armory, self.slot);
        self.state.sync_len(entries.len());

        let title = if self.pending {
            format!(" {} (equipping...) ", self.slot.label())
        } else {
            format!(" {} ", self.slot.label())
        };
        let border = if self.focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title);

        if entries.is_empty() {
            let empty = Paragraph::new("Nothing in this slot for the equipped core")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let highlighted = entry.is_highlighted(self.armory);
                let marker = if highlighted { "● " } else { "  " };
                let style = if i == self.state.selected && self.focused {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else if highlighted {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let mut spans = vec![Span::styled(marker, style), Span::styled(entry.label(), style)];
                if let RowEntry::Kit(..) = entry {
                    spans.push(Span::styled(" [custom]", Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
