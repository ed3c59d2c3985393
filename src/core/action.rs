//! # Actions
//!
//! Everything that can happen in the armory becomes an `Action`.
//! User presses Enter on a helmet? That's `Action::Equip(item)`.
//! Backend answers? That's `Action::EquipSucceeded { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O to start. No
//! network calls happen here; the TUI runs the effect and feeds the
//! outcome back in as another action.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::api::fetcher::LoadedArmory;
use crate::api::types::ArmorCoreResponse;
use crate::core::highlight::check_consistency;
use crate::core::item::EquippableItem;
use crate::core::reconcile::{EquipPlan, Ticket, apply_equip, plan_equip, plan_kit_equip};
use crate::core::state::{App, ArmoryState, Screen};

#[derive(Debug)]
pub enum Action {
    /// (Re)load the inventory.
    Reload,
    InventoryLoaded(Box<LoadedArmory>),
    InventoryFailed(String),
    /// The backend rejected the session.
    SessionInvalid,
    /// Equip a catalog entry.
    Equip(EquippableItem),
    /// Equip a custom kit by its index in the kit row.
    EquipKit(usize),
    EquipSucceeded {
        ticket: Ticket,
        plan: EquipPlan,
        response: ArmorCoreResponse,
    },
    EquipFailed {
        ticket: Ticket,
        error: String,
    },
    /// An item came into view; load its full image if not done yet.
    ImageWanted(EquippableItem),
    ImageLoaded {
        item_id: String,
        bytes: Option<Vec<u8>>,
    },
    Quit,
}

/// I/O the event loop must start after an update.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Quit,
    FetchInventory,
    SubmitEquip { ticket: Ticket, plan: EquipPlan },
    FetchImage { item_id: String, path: String },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Reload => {
            if !app.session.is_logged_in() {
                app.screen = Screen::LoggedOut;
                return Effect::None;
            }
            if app.is_loading {
                return Effect::None;
            }
            app.is_loading = true;
            if app.armory.is_none() {
                app.screen = Screen::Loading;
            }
            app.status_message = String::from("Loading inventory...");
            Effect::FetchInventory
        }
        Action::InventoryLoaded(loaded) => {
            let LoadedArmory {
                inventory,
                equipped,
                highlights,
                gamer_info,
            } = *loaded;

            if let Some(info) = gamer_info
                && let Err(e) = app.session.replace(info)
            {
                warn!("Failed to store refreshed session: {}", e);
            }

            // Pending equips stay ticketed and land on the fresh snapshot
            app.is_loading = false;
            app.image_cache.clear();
            app.status_message = format!(
                "Core: {}",
                equipped.core().map(|c| c.display_name()).unwrap_or("?")
            );
            app.armory = Some(ArmoryState {
                inventory,
                equipped,
                highlights,
            });
            app.screen = Screen::Armory;
            Effect::None
        }
        Action::InventoryFailed(error) => {
            warn!("Inventory fetch failed: {}", error);
            app.is_loading = false;
            app.status_message = format!("Inventory unavailable: {error}");
            if app.armory.is_none() {
                app.screen = Screen::Unavailable(error);
            }
            Effect::None
        }
        Action::SessionInvalid => {
            info!("Session invalid, clearing local state");
            app.session.clear();
            app.armory = None;
            app.in_flight.clear();
            app.image_cache.clear();
            app.is_loading = false;
            app.screen = Screen::LoggedOut;
            app.status_message = String::from("Logged out");
            Effect::None
        }
        Action::Equip(item) => {
            let Some(armory) = &app.armory else {
                return Effect::None;
            };
            submit(app, plan_equip(&item, &armory.equipped))
        }
        Action::EquipKit(index) => {
            let Some(armory) = &app.armory else {
                return Effect::None;
            };
            let Some(kit) = armory.inventory.custom_kits().get(index) else {
                warn!("No custom kit at index {}", index);
                return Effect::None;
            };
            submit(app, plan_kit_equip(kit, &armory.equipped))
        }
        Action::EquipSucceeded {
            ticket,
            mut plan,
            response,
        } => {
            let owned = app.in_flight.settle(ticket);
            if owned.is_empty() {
                debug!("Dropping superseded equip of {}", plan.describe());
                return Effect::None;
            }
            plan.retain_slots(&owned);
            let Some(armory) = &mut app.armory else {
                return Effect::None;
            };
            apply_equip(
                &plan,
                &response,
                &armory.inventory,
                &mut armory.equipped,
                &mut armory.highlights,
            );
            if let Err(diverging) = check_consistency(&armory.equipped, &armory.highlights) {
                warn!("Highlights diverge from loadout in {:?}", diverging);
            }
            app.status_message = format!("Equipped {}", plan.describe());
            Effect::None
        }
        Action::EquipFailed { ticket, error } => {
            if app.in_flight.settle(ticket).is_empty() {
                debug!("Ignoring failure of superseded equip: {}", error);
                return Effect::None;
            }
            warn!("Equip failed: {}", error);
            app.status_message = format!("Equip failed: {error}");
            Effect::None
        }
        Action::ImageWanted(item) => {
            if !app.image_cache.claim_fetch(&item) {
                return Effect::None;
            }
            match item.image_path {
                Some(path) => Effect::FetchImage {
                    item_id: item.id,
                    path,
                },
                None => Effect::None,
            }
        }
        Action::ImageLoaded { item_id, bytes } => {
            app.image_cache.store(&item_id, bytes);
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(
    app: &mut App,
    planned: Result<Option<EquipPlan>, crate::core::reconcile::PlanError>,
) -> Effect {
    match planned {
        Ok(Some(plan)) => {
            let ticket = app.in_flight.issue(plan.slot_key(), &plan.claimed_slots());
            app.status_message = format!("Equipping {}...", plan.describe());
            Effect::SubmitEquip { ticket, plan }
        }
        Ok(None) => Effect::None,
        Err(e) => {
            warn!("Equip rejected: {}", e);
            app.status_message = format!("Can't equip: {e}");
            Effect::None
        }
    }
}
