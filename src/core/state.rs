//! # Application State
//!
//! Core business state for the armory screen. No terminal types here;
//! presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ArmoryBackend>   // game-data API
//! ├── images: ImageLoader               // image proxy client
//! ├── session: SessionContext           // persisted gamer identity
//! ├── screen: Screen                    // which view is showing
//! ├── armory: Option<ArmoryState>       // catalog + loadout + highlights
//! ├── in_flight: InFlight               // newest equip ticket per slot
//! ├── image_cache: ImageCache           // fetched full images by item id
//! ├── is_loading: bool                  // inventory fetch outstanding
//! └── status_message: String            // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::api::backend::ArmoryBackend;
use crate::api::images::ImageLoader;
use crate::core::highlight::HighlightState;
use crate::core::images::ImageCache;
use crate::core::inventory::Inventory;
use crate::core::item::CurrentlyEquipped;
use crate::core::reconcile::InFlight;
use crate::core::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Armory,
    /// Session missing or rejected; the user must log in again.
    LoggedOut,
    /// Nothing to show because the first fetch failed.
    Unavailable(String),
}

/// The loaded armory. Rebuilt from scratch on every inventory load.
#[derive(Debug)]
pub struct ArmoryState {
    pub inventory: Inventory,
    pub equipped: CurrentlyEquipped,
    pub highlights: HighlightState,
}

pub struct App {
    pub backend: Arc<dyn ArmoryBackend>,
    pub images: ImageLoader,
    pub session: SessionContext,
    pub screen: Screen,
    pub armory: Option<ArmoryState>,
    pub in_flight: InFlight,
    pub image_cache: ImageCache,
    pub is_loading: bool,
    pub status_message: String,
}

impl App {
    pub fn new(backend: Arc<dyn ArmoryBackend>, images: ImageLoader, session: SessionContext) -> Self {
        let screen = if session.is_logged_in() {
            Screen::Loading
        } else {
            Screen::LoggedOut
        };
        Self {
            backend,
            images,
            session,
            screen,
            armory: None,
            in_flight: InFlight::default(),
            image_cache: ImageCache::new(),
            is_loading: false,
            status_message: String::from("Welcome to the armory"),
        }
    }

    pub fn gamertag(&self) -> Option<&str> {
        self.session.current().ok().map(|info| info.gamertag.as_str())
    }
}
