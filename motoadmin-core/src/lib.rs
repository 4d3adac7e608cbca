//! lib.rs — Main Library Entry for the Workshop Admin TUI
//! -----------------------------------------------------
//! Explicitly exposes the service, model, view, and controller modules.
//! Only re-export what you want public in the library crate root.

/// --- Error handling (unified error type for app) ---
pub mod error;

/// --- Configuration: backend URL, debounce, page size, theme ---
pub mod config {
    pub mod config;
}

/// --- Controller/event loop (main async event handling) ---
pub mod controller {
    pub mod actions;
    pub mod event_loop;
}

/// --- State/data models (MVC model) ---
pub mod model {
    pub mod actions;
    pub mod app_state;
    pub mod column;
    pub mod data_manager;
    pub mod row;
    pub mod view_state;
}

/// --- UI rendering: all view logic and components ---
pub mod view {
    pub mod ui;
    pub mod components {
        pub mod bulk_actions_bar;
        pub mod data_table;
        pub mod status_bar;
        pub mod toolbar;
    }
}

/// --- REST service layer (per-entity CRUD over a transport) ---
pub mod service {
    pub mod crud;
    pub mod error;
    pub mod registry;
    pub mod transport;
}

/// --- Utilities ---
pub mod util {
    pub mod debounce;
}

pub mod logging;
pub use logging::Logger;

/// --- Crate-level re-exports for the most important types ---
pub use error::AppError;
pub use model::{app_state::AppState, data_manager::DataManager, row::Row, view_state::ViewState};
pub use service::{crud::CrudService, registry::ServiceRegistry};
