//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::api::backend::{ApiError, ArmoryBackend};
use crate::api::images::ImageLoader;
use crate::api::types::{ArmorCoreResponse, SpartanResponse, Theme};
use crate::core::action::{Action, update};
use crate::core::highlight::HighlightState;
use crate::core::inventory::Inventory;
use crate::core::item::{CurrentlyEquipped, CustomKit, EquippableItem};
use crate::core::session::{GamerInfo, SessionContext};
use crate::core::slot::SlotKind;
use crate::core::state::App;

// ============================================================================
// Items
// ============================================================================

/// A bare catalog entry with no core binding.
pub fn item(id: &str, kind: SlotKind) -> EquippableItem {
    EquippableItem {
        id: id.to_string(),
        kind,
        title: None,
        core_path: None,
        image_path: None,
        rarity: None,
        belongs_to_core: None,
        is_cross_core: false,
        is_highlighted: false,
        image: None,
        get_inv: None,
        extra: Map::new(),
    }
}

pub fn item_with_image(id: &str, kind: SlotKind, image: &str) -> EquippableItem {
    let mut item = item(id, kind);
    item.image = Some(image.to_string());
    item
}

fn bound(id: &str, kind: SlotKind, core: &str, path: &str) -> EquippableItem {
    let mut item = item(id, kind);
    item.belongs_to_core = Some(core.to_string());
    item.core_path = Some(path.to_string());
    item
}

fn flagged(mut item: EquippableItem) -> EquippableItem {
    item.is_highlighted = true;
    item
}

pub fn kit(name: &str, image_type: Option<&str>, items: Vec<EquippableItem>) -> CustomKit {
    let mut loadout = CurrentlyEquipped::default();
    for item in items {
        loadout.set(item);
    }
    CustomKit {
        name: name.to_string(),
        image: None,
        image_type: image_type.map(str::to_string),
        loadout,
    }
}

// ============================================================================
// Inventory fixtures
// ============================================================================

fn sample_rows() -> BTreeMap<SlotKind, Vec<EquippableItem>> {
    let mut h1 = flagged(bound("H1", SlotKind::ArmorHelmet, "C1", "helmets/h1.json"));
    h1.image = Some("aDE=".to_string());

    let mut rows = BTreeMap::new();
    rows.insert(
        SlotKind::ArmorCore,
        vec![
            flagged(bound("C1", SlotKind::ArmorCore, "C1", "cores/c1.json")),
            bound("C2", SlotKind::ArmorCore, "C2", "cores/c2.json"),
        ],
    );
    rows.insert(
        SlotKind::ArmorHelmet,
        vec![
            h1,
            bound("H2", SlotKind::ArmorHelmet, "C1", "helmets/h2.json"),
            bound("H3", SlotKind::ArmorHelmet, "C1", "helmets/h3.json"),
            bound("H9", SlotKind::ArmorHelmet, "C2", "X"),
        ],
    );
    rows.insert(
        SlotKind::ArmorVisor,
        vec![
            flagged(bound("V1", SlotKind::ArmorVisor, "C1", "visors/v1.json")),
            bound("V9", SlotKind::ArmorVisor, "C2", "VX"),
        ],
    );
    rows.insert(
        SlotKind::ArmorGlove,
        vec![
            flagged(bound("G1", SlotKind::ArmorGlove, "C1", "gloves/g1.json")),
            bound("G9", SlotKind::ArmorGlove, "C2", "GX"),
        ],
    );
    rows.insert(
        SlotKind::ArmorCoating,
        vec![flagged(bound(
            "T1",
            SlotKind::ArmorCoating,
            "C1",
            "coatings/t1.json",
        ))],
    );
    rows.insert(SlotKind::ArmorKit, vec![item("K1", SlotKind::ArmorKit)]);
    rows
}

/// Cores C1 (highlighted) and C2, with C1-bound and C2-bound entries.
pub fn sample_inventory() -> Inventory {
    Inventory::new(sample_rows())
}

fn sample_equipped(inventory: &Inventory) -> CurrentlyEquipped {
    let mut equipped = CurrentlyEquipped::default();
    for (kind, id) in [
        (SlotKind::ArmorCore, "C1"),
        (SlotKind::ArmorHelmet, "H1"),
        (SlotKind::ArmorVisor, "V1"),
        (SlotKind::ArmorGlove, "G1"),
        (SlotKind::ArmorCoating, "T1"),
    ] {
        if let Some(found) = inventory.find(kind, id) {
            equipped.set(found.clone());
        }
    }
    equipped
}

/// The sample inventory with C1/H1/V1/G1/T1 equipped and highlighted.
pub fn loaded() -> (Inventory, CurrentlyEquipped, HighlightState) {
    let inventory = sample_inventory();
    let snapshot = sample_equipped(&inventory);
    let (equipped, highlights) = inventory.initial_loadout(snapshot).unwrap();
    (inventory, equipped, highlights)
}

/// An `/armorcore` reply carrying a single default theme.
pub fn core_response(
    helmet: Option<&str>,
    visor: Option<&str>,
    glove: Option<&str>,
    coating: Option<&str>,
) -> ArmorCoreResponse {
    let paths: Vec<(&str, &str)> = [
        ("HelmetPath", helmet),
        ("VisorPath", visor),
        ("GlovePath", glove),
        ("CoatingPath", coating),
    ]
    .into_iter()
    .filter_map(|(key, path)| path.map(|p| (key, p)))
    .collect();

    ArmorCoreResponse {
        themes: vec![Theme::from_paths(&paths)],
    }
}

/// A `/spartan` reply built from the sample rows, with C1 and H1 equipped.
pub fn spartan_body(spartan_key: &str) -> SpartanResponse {
    let rows = sample_rows();
    let mut body = Map::new();
    for (kind, row) in &rows {
        body.insert(kind.spec().row_key.to_string(), json!(row));
    }
    body.insert(
        "CurrentlyEquipped".to_string(),
        json!({
            "CurrentlyEquippedCore": rows[&SlotKind::ArmorCore][0],
            "CurrentlyEquippedHelmet": rows[&SlotKind::ArmorHelmet][0],
        }),
    );
    body.insert("GamerInfo".to_string(), json!(gamer_info(spartan_key)));
    serde_json::from_value(Value::Object(body)).unwrap()
}

// ============================================================================
// Session
// ============================================================================

pub fn gamer_info(spartan_key: &str) -> GamerInfo {
    GamerInfo {
        gamertag: "Chief".to_string(),
        xuid: "2535400000000117".to_string(),
        spartan_key: spartan_key.to_string(),
        clearance: Some("clearance-id".to_string()),
        extra: Map::new(),
    }
}

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A fresh, not-yet-existing session file path.
pub fn temp_session_path(name: &str) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir()
        .join(format!("armory-test-{}-{}-{}", std::process::id(), name, n))
        .join("session.json")
}

// ============================================================================
// Backend stub
// ============================================================================

/// Scripted backend. `/spartan` answers once; later calls fail.
#[derive(Default)]
pub struct StubBackend {
    spartan: Mutex<Option<Result<SpartanResponse, ApiError>>>,
    kits: Vec<CustomKit>,
    logout_calls: AtomicUsize,
    equip_payloads: Mutex<Vec<CurrentlyEquipped>>,
}

impl StubBackend {
    pub fn failing_spartan(error: ApiError) -> Self {
        Self {
            spartan: Mutex::new(Some(Err(error))),
            ..Self::default()
        }
    }

    pub fn with_spartan(response: SpartanResponse) -> Self {
        Self {
            spartan: Mutex::new(Some(Ok(response))),
            ..Self::default()
        }
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn equip_payloads(&self) -> Vec<CurrentlyEquipped> {
        self.equip_payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArmoryBackend for StubBackend {
    async fn fetch_spartan(
        &self,
        _session: &GamerInfo,
        _include_armory: bool,
    ) -> Result<SpartanResponse, ApiError> {
        self.spartan
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ApiError::Network("stub exhausted".into())))
    }

    async fn fetch_custom_kits(&self, _session: &GamerInfo) -> Result<Vec<CustomKit>, ApiError> {
        Ok(self.kits.clone())
    }

    async fn equip(
        &self,
        _session: &GamerInfo,
        equipped: &CurrentlyEquipped,
    ) -> Result<ArmorCoreResponse, ApiError> {
        self.equip_payloads.lock().unwrap().push(equipped.clone());
        Ok(ArmorCoreResponse::default())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// App
// ============================================================================

/// Creates a logged-in test App with a StubBackend and no armory yet.
pub fn test_app() -> App {
    let mut session = SessionContext::open(temp_session_path("app")).unwrap();
    session.replace(gamer_info("test-key")).unwrap();
    App::new(
        Arc::new(StubBackend::default()),
        ImageLoader::new("http://127.0.0.1:9", Duration::from_secs(1)),
        session,
    )
}

/// A test App with the `loaded()` armory applied.
pub fn loaded_app() -> App {
    let mut app = test_app();
    let (inventory, equipped, highlights) = loaded();
    update(
        &mut app,
        Action::InventoryLoaded(Box::new(crate::api::fetcher::LoadedArmory {
            inventory,
            equipped,
            highlights,
            gamer_info: None,
        })),
    );
    app
}
