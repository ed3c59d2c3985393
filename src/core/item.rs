//! # Armory Items
//!
//! Catalog entries, the equipped loadout and user-authored custom kits,
//! in the JSON shapes the backend speaks.
//!
//! Backend payloads are treated leniently: an entry that fails to parse is
//! logged and skipped instead of failing the whole response, and fields we
//! don't model are kept in `extra` so they survive a round trip back to the
//! backend.

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::slot::{CoreCompat, SLOTS, SlotKind};

/// One entry of a catalog row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EquippableItem {
    pub id: String,
    #[serde(rename = "Type")]
    pub kind: SlotKind,
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "CorePath", default, skip_serializing_if = "Option::is_none")]
    pub core_path: Option<String>,
    #[serde(rename = "ImagePath", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(rename = "Rarity", default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(rename = "BelongsToCore", default, skip_serializing_if = "Option::is_none")]
    pub belongs_to_core: Option<String>,
    #[serde(rename = "IsCrossCore", default)]
    pub is_cross_core: bool,
    #[serde(rename = "isHighlighted", default)]
    pub is_highlighted: bool,
    /// Embedded low-resolution image (base64), shown until a full image loads.
    #[serde(rename = "Image", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Core-only: asks the backend to reply with the core's default theme.
    #[serde(rename = "GetInv", default, skip_serializing_if = "Option::is_none")]
    pub get_inv: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EquippableItem {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Whether this item may be equipped alongside `core`.
    pub fn fits_core(&self, core: &EquippableItem) -> bool {
        match self.kind.spec().compat {
            CoreCompat::Core | CoreCompat::Global => true,
            CoreCompat::CoreBound => {
                self.is_cross_core || self.belongs_to_core.as_deref() == Some(core.id.as_str())
            }
        }
    }
}

/// The equipped loadout: at most one item per slot.
///
/// Serialized as an object keyed by `CurrentlyEquipped*` names, with unset
/// slots written as `null`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct CurrentlyEquipped {
    slots: BTreeMap<SlotKind, EquippableItem>,
}

impl CurrentlyEquipped {
    pub fn get(&self, kind: SlotKind) -> Option<&EquippableItem> {
        self.slots.get(&kind)
    }

    pub fn core(&self) -> Option<&EquippableItem> {
        self.get(SlotKind::ArmorCore)
    }

    /// Places `item` into the slot named by its `Type`, replacing any occupant.
    pub fn set(&mut self, item: EquippableItem) {
        self.slots.insert(item.kind, item);
    }

    /// Occupied slots in table order (core first).
    pub fn iter(&self) -> impl Iterator<Item = (SlotKind, &EquippableItem)> {
        self.slots.iter().map(|(kind, item)| (*kind, item))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Keeps only the slots for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(SlotKind) -> bool) {
        self.slots.retain(|kind, _| keep(*kind));
    }
}

impl From<Map<String, Value>> for CurrentlyEquipped {
    fn from(map: Map<String, Value>) -> Self {
        let mut slots = BTreeMap::new();
        for (key, value) in map {
            let Some(kind) = SlotKind::from_equipped_key(&key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            match serde_json::from_value::<EquippableItem>(value) {
                Ok(item) if item.kind == kind => {
                    slots.insert(kind, item);
                }
                Ok(item) => {
                    warn!("{} holds an item of type {}, ignoring", key, item.kind);
                }
                Err(e) => warn!("Skipping unparseable {}: {}", key, e),
            }
        }
        Self { slots }
    }
}

impl From<CurrentlyEquipped> for Map<String, Value> {
    fn from(equipped: CurrentlyEquipped) -> Self {
        let mut slots = equipped.slots;
        SLOTS
            .iter()
            .map(|spec| {
                let value = slots
                    .remove(&spec.kind)
                    .and_then(|item| serde_json::to_value(item).ok())
                    .unwrap_or(Value::Null);
                (spec.equipped_key.to_string(), value)
            })
            .collect()
    }
}

/// A user-authored saved loadout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CustomKit {
    pub name: String,
    #[serde(rename = "Image", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Slot type whose item image represents the kit.
    #[serde(rename = "ImageType", default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(flatten)]
    pub loadout: CurrentlyEquipped,
}

impl CustomKit {
    pub fn image_slot(&self) -> Option<SlotKind> {
        let wanted = self.image_type.as_deref()?;
        SlotKind::all().find(|kind| kind.type_name() == wanted)
    }
}

/// Deserializes a JSON array, dropping (and logging) entries that don't parse.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping unparseable entry: {}", e);
                None
            }
        })
        .collect())
}
