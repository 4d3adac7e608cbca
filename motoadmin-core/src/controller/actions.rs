//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Application Commands
//!
//! Defines the `Action` enum, which represents all user inputs and internal
//! events the application responds to: raw terminal events, periodic ticks,
//! and completion messages from in-flight service calls. This provides a
//! single, clear interface for the `Controller` to process.

use crossterm::event::KeyEvent;

use crate::model::actions::{BulkAction, RowAction};
use crate::service::crud::ServiceResult;

/// Represents a high-level action that the application can perform.
#[derive(Debug)]
pub enum Action {
    /// A keyboard event.
    Key(KeyEvent),
    /// A terminal resize event.
    Resize(u16, u16),
    /// An internal tick for debounce polling and notification expiry.
    Tick,
    /// Quit the application.
    Quit,
    /// Re-fetch the raw rows of the active view.
    Refresh,
    /// A list fetch finished. Tagged with the generation it was started in;
    /// stale completions are discarded.
    RowsLoaded {
        generation: u64,
        result: ServiceResult,
    },
    /// A confirmed bulk verb finished.
    BulkDone {
        action: BulkAction,
        result: ServiceResult,
    },
    /// A per-row verb finished.
    RowActionDone {
        action: RowAction,
        result: ServiceResult,
    },
}
