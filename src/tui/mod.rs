//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the armory
//! screen, translates keyboard events into core::Action values and runs the
//! `Effect`s the reducer hands back on tokio tasks.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Background Work
//!
//! ```text
//! update() ──► Effect::SubmitEquip ──► tokio::spawn(POST /armorcore)
//!                                              │
//!   rx.try_recv() ◄── mpsc::Sender<Action> ◄───┘  EquipSucceeded / EquipFailed
//! ```
//!
//! Equip tasks are tracked per slot key. A newer submission for the same
//! slot aborts the older task; its ticket is already stale in `InFlight`,
//! so a completion that slips through anyway is dropped by the reducer.
//!
//! ## Redraw Strategy
//!
//! Draws every ~80ms while loading (spinner), otherwise only on events.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, mpsc};

use tokio::task::AbortHandle;

use crate::api::backend::ArmoryBackend;
use crate::api::fetcher::{FetchOutcome, fetch_armory};
use crate::api::http::HttpBackend;
use crate::api::images::ImageLoader;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::reconcile::{EquipPlan, Ticket};
use crate::core::session::SessionContext;
use crate::core::slot::SlotKind;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ItemListEvent, ItemListState, RowEntry, SlotListEvent, SlotListState, row_entries,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which column receives cursor keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Slots,
    Items,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    pub slots: SlotListState,
    pub items: ItemListState,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            focus: Focus::Slots,
            slots: SlotListState::new(),
            items: ItemListState::new(),
        }
    }

    /// The entry under the item cursor, if an armory is loaded.
    fn selected_entry<'a>(&self, app: &'a App) -> Option<RowEntry<'a>> {
        let armory = app.armory.as_ref()?;
        row_entries(armory, self.slots.selected_slot())
            .get(self.items.selected)
            .copied()
    }

    /// Routes a navigation event and returns the action it triggers, if any.
    fn handle_event(&mut self, app: &App, event: &TuiEvent) -> Option<Action> {
        match event {
            TuiEvent::FocusNext => {
                self.focus = Focus::Items;
                None
            }
            TuiEvent::FocusPrev => {
                self.focus = Focus::Slots;
                None
            }
            _ => match self.focus {
                Focus::Slots => {
                    if let TuiEvent::Submit = event {
                        self.focus = Focus::Items;
                        return None;
                    }
                    match self.slots.handle_event(event)? {
                        SlotListEvent::Changed(slot) => {
                            debug!("Slot changed to {}", slot);
                            self.items.reset();
                            None
                        }
                    }
                }
                Focus::Items => {
                    if let Some(armory) = &app.armory {
                        self.items
                            .sync_len(row_entries(armory, self.slots.selected_slot()).len());
                    }
                    match self.items.handle_event(event)? {
                        ItemListEvent::Moved(_) => None,
                        ItemListEvent::Activate(_) => {
                            self.selected_entry(app).map(|entry| entry.equip_action())
                        }
                    }
                }
            },
        }
    }
}

struct Tasks {
    tx: mpsc::Sender<Action>,
    fetch: Option<AbortHandle>,
    equips: HashMap<SlotKind, AbortHandle>,
}

impl Tasks {
    /// Starts the I/O an effect describes. Returns true on `Effect::Quit`.
    fn run(&mut self, app: &App, effect: Effect) -> bool {
        match effect {
            Effect::None => {}
            Effect::Quit => return true,
            Effect::FetchInventory => {
                if let Some(previous) = self.fetch.take() {
                    previous.abort();
                }
                self.fetch = spawn_fetch(app, self.tx.clone());
            }
            Effect::SubmitEquip { ticket, plan } => {
                if let Some(previous) = self.equips.remove(&ticket.slot) {
                    debug!("Aborting superseded equip for {}", ticket.slot);
                    previous.abort();
                }
                if let Some(handle) = spawn_equip(app, ticket, plan, self.tx.clone()) {
                    self.equips.insert(ticket.slot, handle);
                }
            }
            Effect::FetchImage { item_id, path } => spawn_image(app, item_id, path, self.tx.clone()),
        }
        false
    }

    fn abort_all(&mut self) {
        for (_, handle) in self.equips.drain() {
            handle.abort();
        }
        if let Some(handle) = self.fetch.take() {
            handle.abort();
        }
    }
}

/// Dispatches an action and starts its effect. Returns true to quit.
fn dispatch(app: &mut App, tui: &TuiState, tasks: &mut Tasks, action: Action) -> bool {
    let effect = update(app, action);
    if tasks.run(app, effect) {
        return true;
    }
    request_selected_image(app, tui, tasks)
}

/// Asks for the full image of the entry under the cursor.
fn request_selected_image(app: &mut App, tui: &TuiState, tasks: &mut Tasks) -> bool {
    let Some(item) = tui
        .selected_entry(app)
        .and_then(|entry| entry.preview())
        .cloned()
    else {
        return false;
    };
    let effect = update(app, Action::ImageWanted(item));
    tasks.run(app, effect)
}

pub fn run(config: ResolvedConfig, session: SessionContext) -> std::io::Result<()> {
    let backend: Arc<dyn ArmoryBackend> = Arc::new(
        HttpBackend::new(&config.api_base_url, config.timeout).map_err(std::io::Error::other)?,
    );
    let images = ImageLoader::new(&config.proxy_base_url, config.timeout);
    let mut app = App::new(backend, images, session);
    let mut tui = TuiState::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut tasks = Tasks {
        tx,
        fetch: None,
        equips: HashMap::new(),
    };

    let mut terminal = ratatui::init();
    info!("Armory screen started");

    dispatch(&mut app, &tui, &mut tasks, Action::Reload);

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true;

    'main: loop {
        let animating = app.is_loading;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(250)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let action = match event {
                TuiEvent::Resize => continue,
                TuiEvent::Quit | TuiEvent::ForceQuit => Some(Action::Quit),
                TuiEvent::Reload => Some(Action::Reload),
                _ => tui.handle_event(&app, &event),
            };
            let should_quit = match action {
                Some(action) => dispatch(&mut app, &tui, &mut tasks, action),
                None => request_selected_image(&mut app, &tui, &mut tasks),
            };
            if should_quit {
                break 'main;
            }
        }

        // Handle background task results
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action_name(&action));
            if dispatch(&mut app, &tui, &mut tasks, action) {
                break 'main;
            }
        }
    }

    tasks.abort_all();
    ratatui::restore();
    info!("Armory screen closed");
    Ok(())
}

/// Short action label for logs; image payloads are too large to print.
fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Reload => "Reload",
        Action::InventoryLoaded(_) => "InventoryLoaded",
        Action::InventoryFailed(_) => "InventoryFailed",
        Action::SessionInvalid => "SessionInvalid",
        Action::Equip(_) => "Equip",
        Action::EquipKit(_) => "EquipKit",
        Action::EquipSucceeded { .. } => "EquipSucceeded",
        Action::EquipFailed { .. } => "EquipFailed",
        Action::ImageWanted(_) => "ImageWanted",
        Action::ImageLoaded { .. } => "ImageLoaded",
        Action::Quit => "Quit",
    }
}

fn send(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to send background result: receiver dropped");
    }
}

fn spawn_fetch(app: &App, tx: mpsc::Sender<Action>) -> Option<AbortHandle> {
    let session = match app.session.current() {
        Ok(info) => info.clone(),
        Err(e) => {
            warn!("Cannot fetch inventory: {}", e);
            send(&tx, Action::SessionInvalid);
            return None;
        }
    };
    let backend = app.backend.clone();
    info!("Spawning inventory fetch for {}", session.gamertag);

    let handle = tokio::spawn(async move {
        let action = match fetch_armory(backend.as_ref(), &session).await {
            Ok(FetchOutcome::Loaded(armory)) => Action::InventoryLoaded(armory),
            Ok(FetchOutcome::LoggedOut) => Action::SessionInvalid,
            Err(e) => Action::InventoryFailed(e.to_string()),
        };
        send(&tx, action);
    });
    Some(handle.abort_handle())
}

fn spawn_equip(
    app: &App,
    ticket: Ticket,
    plan: EquipPlan,
    tx: mpsc::Sender<Action>,
) -> Option<AbortHandle> {
    let session = match app.session.current() {
        Ok(info) => info.clone(),
        Err(e) => {
            warn!("Cannot equip without a session: {}", e);
            send(
                &tx,
                Action::EquipFailed {
                    ticket,
                    error: e.to_string(),
                },
            );
            return None;
        }
    };
    let backend = app.backend.clone();
    info!("Spawning equip of {} (seq={})", plan.describe(), ticket.seq);

    let handle = tokio::spawn(async move {
        let action = match backend.equip(&session, &plan.payload).await {
            Ok(response) => Action::EquipSucceeded {
                ticket,
                plan,
                response,
            },
            Err(e) => Action::EquipFailed {
                ticket,
                error: e.to_string(),
            },
        };
        send(&tx, action);
    });
    Some(handle.abort_handle())
}

fn spawn_image(app: &App, item_id: String, path: String, tx: mpsc::Sender<Action>) {
    let spartan_key = app
        .session
        .current()
        .map(|info| info.spartan_key.clone())
        .unwrap_or_default();
    let loader = app.images.clone();
    debug!("Spawning image fetch for {} ({})", item_id, path);

    tokio::spawn(async move {
        let bytes = loader.fetch(&path, &spartan_key).await;
        send(&tx, Action::ImageLoaded { item_id, bytes });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::loaded_app;

    #[test]
    fn test_enter_on_slot_moves_focus() {
        let app = loaded_app();
        let mut tui = TuiState::new();
        assert!(tui.handle_event(&app, &TuiEvent::Submit).is_none());
        assert_eq!(tui.focus, Focus::Items);
    }

    #[test]
    fn test_enter_on_item_equips_it() {
        let app = loaded_app();
        let mut tui = TuiState::new();
        tui.handle_event(&app, &TuiEvent::CursorDown);
        assert_eq!(tui.slots.selected_slot(), SlotKind::ArmorHelmet);

        tui.handle_event(&app, &TuiEvent::FocusNext);
        tui.handle_event(&app, &TuiEvent::CursorDown);
        let action = tui.handle_event(&app, &TuiEvent::Submit);
        assert!(matches!(action, Some(Action::Equip(item)) if item.id == "H2"));
    }

    #[test]
    fn test_slot_change_resets_item_cursor() {
        let app = loaded_app();
        let mut tui = TuiState::new();
        tui.focus = Focus::Items;
        tui.handle_event(&app, &TuiEvent::CursorDown);
        assert_eq!(tui.items.selected, 1);

        tui.handle_event(&app, &TuiEvent::FocusPrev);
        tui.handle_event(&app, &TuiEvent::CursorDown);
        assert_eq!(tui.items.selected, 0);
    }
}
