//! # Highlight State
//!
//! Which entry in each catalog row renders as selected. Keys follow the
//! `<slottype>Id` convention (`armorhelmetId`), values are item ids.
//!
//! Writes are unconditional overwrites. All writes happen on the event loop
//! thread, so there is no locking.

use std::collections::BTreeMap;

use super::item::{CurrentlyEquipped, EquippableItem};
use super::slot::SlotKind;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightState {
    entries: BTreeMap<String, String>,
}

impl HighlightState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one entry per catalog row from the row's `isHighlighted` flag.
    /// Rows without a flagged entry leave their slot unset.
    pub fn seed<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (SlotKind, &'a [EquippableItem])>,
    {
        let mut state = Self::new();
        for (kind, row) in rows {
            if let Some(flagged) = row.iter().find(|item| item.is_highlighted) {
                state.set(kind, &flagged.id);
            }
        }
        state
    }

    pub fn get(&self, kind: SlotKind) -> Option<&str> {
        self.entries.get(&kind.highlight_key()).map(String::as_str)
    }

    pub fn set(&mut self, kind: SlotKind, item_id: &str) {
        self.entries.insert(kind.highlight_key(), item_id.to_string());
    }

    pub fn is_highlighted(&self, item: &EquippableItem) -> bool {
        self.get(item.kind) == Some(item.id.as_str())
    }

    /// Raw `<slottype>Id -> item id` view.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

/// Returns the slots whose highlight diverges from the equipped item.
pub fn check_consistency(
    equipped: &CurrentlyEquipped,
    highlights: &HighlightState,
) -> Result<(), Vec<SlotKind>> {
    let diverging: Vec<SlotKind> = equipped
        .iter()
        .filter(|(kind, item)| highlights.get(*kind) != Some(item.id.as_str()))
        .map(|(kind, _)| kind)
        .collect();

    if diverging.is_empty() {
        Ok(())
    } else {
        Err(diverging)
    }
}
