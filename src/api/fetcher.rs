//! # Inventory Fetcher
//!
//! Assembles everything the armory screen needs in one pass:
//!
//! ```text
//! POST /spartan ──► catalog rows + equipped snapshot + GamerInfo
//!      │ 403 / empty SpartanKey ──► GET /logout ──► LoggedOut
//!      ▼
//! POST /getCustomKit ──► kits (failure = no kits)
//!      ▼
//! merge kits into the kit row, seed highlights ──► Loaded
//! ```
//!
//! The fetcher never writes the session itself. A refreshed `GamerInfo` or a
//! `LoggedOut` outcome is handed back so the owner of the `SessionContext`
//! can persist or clear it.

use std::fmt;

use log::{info, warn};

use super::backend::{ApiError, ArmoryBackend};
use crate::core::highlight::HighlightState;
use crate::core::inventory::{Inventory, InventoryError};
use crate::core::item::CurrentlyEquipped;
use crate::core::session::GamerInfo;

/// A fully assembled armory.
#[derive(Debug)]
pub struct LoadedArmory {
    pub inventory: Inventory,
    pub equipped: CurrentlyEquipped,
    pub highlights: HighlightState,
    /// Refreshed session record, when the backend sent one.
    pub gamer_info: Option<GamerInfo>,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Loaded(Box<LoadedArmory>),
    /// The session is invalid; the caller must clear it.
    LoggedOut,
}

#[derive(Debug)]
pub enum FetchError {
    Api(ApiError),
    Inventory(InventoryError),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Api(e) => write!(f, "{e}"),
            FetchError::Inventory(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<ApiError> for FetchError {
    fn from(e: ApiError) -> Self {
        FetchError::Api(e)
    }
}

impl From<InventoryError> for FetchError {
    fn from(e: InventoryError) -> Self {
        FetchError::Inventory(e)
    }
}

pub async fn fetch_armory(
    backend: &dyn ArmoryBackend,
    session: &GamerInfo,
) -> Result<FetchOutcome, FetchError> {
    let response = match backend.fetch_spartan(session, true).await {
        Ok(response) => response,
        Err(ApiError::Unauthorized) => {
            end_session(backend).await;
            return Ok(FetchOutcome::LoggedOut);
        }
        Err(e) => return Err(e.into()),
    };

    let (rows, equipped, gamer_info) = response.into_parts();

    if let Some(info) = &gamer_info
        && !info.has_credential()
    {
        warn!("Backend returned an empty equip credential for {}", info.gamertag);
        end_session(backend).await;
        return Ok(FetchOutcome::LoggedOut);
    }

    let kit_session = gamer_info.as_ref().unwrap_or(session);
    let kits = match backend.fetch_custom_kits(kit_session).await {
        Ok(kits) => kits,
        Err(e) => {
            warn!("Custom kits unavailable: {}", e);
            Vec::new()
        }
    };

    let inventory = Inventory::new(rows).with_custom_kits(&kits);
    let (equipped, highlights) = inventory.initial_loadout(equipped)?;

    info!(
        "Armory loaded: {} custom kit(s), core {}",
        inventory.custom_kits().len(),
        equipped.core().map(|c| c.id.as_str()).unwrap_or("?")
    );

    Ok(FetchOutcome::Loaded(Box::new(LoadedArmory {
        inventory,
        equipped,
        highlights,
        gamer_info,
    })))
}

/// Fires `GET /logout`; the result doesn't matter.
async fn end_session(backend: &dyn ArmoryBackend) {
    if let Err(e) = backend.logout().await {
        warn!("Logout request failed: {}", e);
    }
}
