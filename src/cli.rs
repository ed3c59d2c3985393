//! # One-shot Commands
//!
//! Non-interactive front ends over the same core the armory screen uses:
//! `inventory`, `equip`, `login` and `logout`. Each handler takes the
//! backend and session explicitly and writes human-readable output to
//! `out`, so tests can drive them with a stub backend and a buffer.

use std::fmt;
use std::io::Write;

use log::{info, warn};

use crate::api::backend::{ApiError, ArmoryBackend};
use crate::api::fetcher::{FetchError, FetchOutcome, LoadedArmory, fetch_armory};
use crate::core::reconcile::{EquipPlan, PlanError, apply_equip, plan_equip, plan_kit_equip};
use crate::core::session::{GamerInfo, SessionContext, SessionError};
use crate::core::slot::SlotKind;

#[derive(Debug)]
pub enum CliError {
    Session(SessionError),
    Api(ApiError),
    Fetch(FetchError),
    Plan(PlanError),
    Output(std::io::Error),
    /// The backend rejected the stored session.
    LoggedOut,
    /// No catalog entry or custom kit matched.
    NotFound(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Session(e) => write!(f, "{e}"),
            CliError::Api(e) => write!(f, "{e}"),
            CliError::Fetch(e) => write!(f, "{e}"),
            CliError::Plan(e) => write!(f, "{e}"),
            CliError::Output(e) => write!(f, "output error: {e}"),
            CliError::LoggedOut => write!(f, "session expired; run `armory login` again"),
            CliError::NotFound(what) => write!(f, "nothing in the armory matches '{what}'"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<ApiError> for CliError {
    fn from(e: ApiError) -> Self {
        CliError::Api(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<PlanError> for CliError {
    fn from(e: PlanError) -> Self {
        CliError::Plan(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Output(e)
    }
}

/// Fetches the armory, persisting a refreshed session or clearing a rejected one.
async fn load(
    backend: &dyn ArmoryBackend,
    session: &mut SessionContext,
) -> Result<LoadedArmory, CliError> {
    let info = session.current()?.clone();
    match fetch_armory(backend, &info).await? {
        FetchOutcome::Loaded(mut armory) => {
            if let Some(refreshed) = armory.gamer_info.take() {
                session.replace(refreshed)?;
            }
            Ok(*armory)
        }
        FetchOutcome::LoggedOut => {
            session.clear();
            Err(CliError::LoggedOut)
        }
    }
}

/// `armory inventory`: the equipped loadout and what else fits each slot.
pub async fn show_inventory(
    backend: &dyn ArmoryBackend,
    session: &mut SessionContext,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let armory = load(backend, session).await?;
    let core = armory.equipped.core();

    for kind in SlotKind::all() {
        let equipped = armory
            .equipped
            .get(kind)
            .map(|item| format!("{} ({})", item.display_name(), item.id))
            .unwrap_or_else(|| String::from("-"));
        let available = match (kind, core) {
            (SlotKind::ArmorKit, _) => armory.inventory.kit_row().count(),
            (_, Some(core)) => armory.inventory.compatible_row(kind, core).len(),
            (_, None) => armory.inventory.row(kind).len(),
        };
        writeln!(out, "{:<16} {:<40} {} available", kind.label(), equipped, available)?;
    }

    let kits = armory.inventory.custom_kits();
    if !kits.is_empty() {
        writeln!(out)?;
        writeln!(out, "Custom kits:")?;
        for kit in kits {
            writeln!(out, "  {} ({} slots)", kit.name, kit.loadout.iter().count())?;
        }
    }
    Ok(())
}

/// `armory equip <target>`: equips a catalog entry by id, or a custom kit by name.
pub async fn equip(
    backend: &dyn ArmoryBackend,
    session: &mut SessionContext,
    target: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut armory = load(backend, session).await?;

    let planned = {
        let catalog_match = armory
            .inventory
            .rows()
            .find_map(|(_, row)| row.iter().find(|item| item.id == target));
        match catalog_match {
            Some(item) => plan_equip(item, &armory.equipped)?,
            None => {
                let kit = armory
                    .inventory
                    .custom_kits()
                    .iter()
                    .find(|kit| kit.name == target)
                    .ok_or_else(|| CliError::NotFound(target.to_string()))?;
                plan_kit_equip(kit, &armory.equipped)?
            }
        }
    };

    let Some(plan) = planned else {
        writeln!(out, "{target} is already equipped")?;
        return Ok(());
    };

    submit(backend, session.current()?, &plan, &mut armory, out).await
}

async fn submit(
    backend: &dyn ArmoryBackend,
    info: &GamerInfo,
    plan: &EquipPlan,
    armory: &mut LoadedArmory,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let response = backend.equip(info, &plan.payload).await?;
    let updates = apply_equip(
        plan,
        &response,
        &armory.inventory,
        &mut armory.equipped,
        &mut armory.highlights,
    );
    for update in &updates {
        writeln!(out, "{:<16} {}", update.slot.label(), update.item_id)?;
    }
    info!("Equipped {} from the command line", plan.describe());
    Ok(())
}

/// `armory login`: stores a session record obtained out of band.
pub fn login(session: &mut SessionContext, info: GamerInfo) -> Result<(), CliError> {
    if !info.has_credential() {
        return Err(CliError::Session(SessionError::Missing));
    }
    let gamertag = info.gamertag.clone();
    session.replace(info)?;
    info!("Logged in as {} ({})", gamertag, session.path().display());
    Ok(())
}

/// `armory logout`: tells the backend, then forgets the local session.
pub async fn logout(backend: &dyn ArmoryBackend, session: &mut SessionContext) {
    if let Err(e) = backend.logout().await {
        warn!("Logout request failed: {}", e);
    }
    session.clear();
}
