//! Wire types for the armory backend.
//!
//! Request bodies borrow from client state; response bodies are parsed
//! leniently so one malformed catalog entry doesn't sink a whole fetch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::item::{CurrentlyEquipped, CustomKit, EquippableItem, lenient_vec};
use crate::core::session::GamerInfo;
use crate::core::slot::{SLOTS, SlotKind};

/// Body of `POST /armorcore`.
#[derive(Serialize, Debug)]
pub struct ArmorCoreRequest<'a> {
    #[serde(rename = "GamerInfo")]
    pub gamer_info: &'a GamerInfo,
    #[serde(rename = "CurrentlyEquipped")]
    pub currently_equipped: &'a CurrentlyEquipped,
}

/// Reply of `POST /armorcore`. `Themes` is only present for core changes.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ArmorCoreResponse {
    #[serde(rename = "Themes", default, deserialize_with = "lenient_vec")]
    pub themes: Vec<Theme>,
}

/// A core's default theme: `HelmetPath`, `VisorPath`, `GlovePath`, `CoatingPath`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Theme {
    fields: Map<String, Value>,
}

impl Theme {
    /// The non-empty path stored under `key`, if any.
    pub fn path(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
    }

    #[cfg(test)]
    pub fn from_paths(paths: &[(&str, &str)]) -> Self {
        Self {
            fields: paths
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        }
    }
}

/// Reply of `POST /spartan`.
///
/// Catalog rows (`ArmoryRow`, `ArmoryRowHelmets`, ...) are collected by
/// `into_rows` using the slot table's row keys.
#[derive(Deserialize, Debug, Default)]
pub struct SpartanResponse {
    #[serde(rename = "CurrentlyEquipped", default)]
    pub currently_equipped: Option<CurrentlyEquipped>,
    #[serde(rename = "GamerInfo", default)]
    pub gamer_info: Option<GamerInfo>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl SpartanResponse {
    pub fn into_parts(
        mut self,
    ) -> (
        BTreeMap<SlotKind, Vec<EquippableItem>>,
        CurrentlyEquipped,
        Option<GamerInfo>,
    ) {
        let mut rows = BTreeMap::new();
        for spec in SLOTS {
            let Some(raw) = self.rest.remove(spec.row_key) else {
                continue;
            };
            match lenient_vec::<_, EquippableItem>(raw) {
                Ok(row) => {
                    rows.insert(spec.kind, row);
                }
                Err(e) => log::warn!("Skipping catalog row {}: {}", spec.row_key, e),
            }
        }
        (
            rows,
            self.currently_equipped.unwrap_or_default(),
            self.gamer_info,
        )
    }
}

/// One element of the `POST /getCustomKit` reply array.
#[derive(Deserialize, Debug, Default)]
pub struct KitBatch {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub loadouts: Vec<CustomKit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gamer_info, item};
    use serde_json::json;

    #[test]
    fn test_spartan_response_rows_by_slot() {
        let body = json!({
            "PlayerInventory": [{ "Credits": 10 }],
            "CurrentlyEquipped": {
                "CurrentlyEquippedCore": { "id": "C1", "Type": "ArmorCore" }
            },
            "ArmoryRow": [{ "id": "C1", "Type": "ArmorCore", "isHighlighted": true }],
            "ArmoryRowHelmets": [
                { "id": "H1", "Type": "ArmorHelmet" },
                { "broken": true }
            ],
            "ArmoryRowVisors": "not an array",
            "GamerInfo": { "gamertag": "Chief", "xuid": "1", "SpartanKey": "k" }
        });
        let response: SpartanResponse = serde_json::from_value(body).unwrap();
        let (rows, equipped, info) = response.into_parts();

        assert_eq!(rows[&SlotKind::ArmorCore].len(), 1);
        assert_eq!(rows[&SlotKind::ArmorHelmet].len(), 1);
        assert!(!rows.contains_key(&SlotKind::ArmorVisor));
        assert_eq!(equipped.core().unwrap().id, "C1");
        assert_eq!(info.unwrap().spartan_key, "k");
    }

    #[test]
    fn test_armorcore_request_shape() {
        let info = gamer_info("k");
        let mut equipped = CurrentlyEquipped::default();
        equipped.set(item("C1", SlotKind::ArmorCore));
        let body = serde_json::to_value(ArmorCoreRequest {
            gamer_info: &info,
            currently_equipped: &equipped,
        })
        .unwrap();
        assert_eq!(body["GamerInfo"]["SpartanKey"], json!("k"));
        assert_eq!(
            body["CurrentlyEquipped"]["CurrentlyEquippedCore"]["id"],
            json!("C1")
        );
    }

    #[test]
    fn test_theme_paths() {
        let response: ArmorCoreResponse = serde_json::from_value(json!({
            "Themes": [{ "HelmetPath": "X", "VisorPath": "", "GlovePath": null }]
        }))
        .unwrap();
        let theme = &response.themes[0];
        assert_eq!(theme.path("HelmetPath"), Some("X"));
        assert_eq!(theme.path("VisorPath"), None);
        assert_eq!(theme.path("GlovePath"), None);
        assert_eq!(theme.path("CoatingPath"), None);
    }

    #[test]
    fn test_kit_batch_parses_loadouts() {
        let batches: Vec<KitBatch> = serde_json::from_value(json!([{
            "loadouts": [
                { "name": "A", "CurrentlyEquippedCore": { "id": "C1", "Type": "ArmorCore" } },
                { "no_name": true }
            ]
        }]))
        .unwrap();
        assert_eq!(batches[0].loadouts.len(), 1);
        assert_eq!(batches[0].loadouts[0].name, "A");
    }
}
