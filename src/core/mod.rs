//! # Core Application Logic
//!
//! The armory's business logic. It knows nothing about any specific UI
//! technology and performs no network I/O.
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!                    │            CORE              │
//!                    │                              │
//!                    │  • slot table + item model   │
//!                    │  • inventory + kit merge     │
//!                    │  • equip planning/applying   │
//!                    │  • highlight state           │
//!                    │  • update() (reducer)        │
//!                    └──────────────┬───────────────┘
//!                                   │
//!            ┌──────────────────────┼──────────────────────┐
//!            ▼                      ▼                      ▼
//!     ┌────────────┐         ┌────────────┐         ┌────────────┐
//!     │    TUI     │         │    CLI     │         │    API     │
//!     │ (ratatui)  │         │ (one-shot) │         │ (reqwest)  │
//!     └────────────┘         └────────────┘         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`slot`]: the static slot table every lookup goes through
//! - [`item`]: catalog entries, equipped loadouts, custom kits
//! - [`inventory`]: catalog rows plus merged custom kits
//! - [`highlight`]: slot → highlighted item id
//! - [`reconcile`]: equip planning, response application, in-flight tickets
//! - [`images`]: fetched full-resolution images by item id
//! - [`session`]: the persisted gamer identity
//! - [`config`]: layered settings
//! - [`state`] / [`action`]: the `App` and its reducer

pub mod action;
pub mod config;
pub mod highlight;
pub mod images;
pub mod inventory;
pub mod item;
pub mod reconcile;
pub mod session;
pub mod slot;
pub mod state;
