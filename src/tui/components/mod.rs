//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: top status line
//! - `ItemDetail`: facts and image status for the entry under the cursor
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it
//! each frame:
//! - `SlotList` / `SlotListState`: the slot column
//! - `ItemList` / `ItemListState`: the catalog row of the selected slot
//!
//! Components receive data as props, never by reaching into `App`:
//!
//! ```rust,ignore
//! ItemList::new(&mut tui.items, armory, slot, focused, pending).render(frame, area);
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod item_detail;
pub mod item_list;
pub mod slot_list;
pub use item_detail::ItemDetail;
pub use item_list::{ItemList, ItemListEvent, ItemListState, RowEntry, row_entries};
pub use slot_list::{SlotList, SlotListEvent, SlotListState};
