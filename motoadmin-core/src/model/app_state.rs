//! src/model/app_state.rs
//! ============================================================================
//! # AppState: Application State for the Admin Console
//!
//! Unifies the configuration handle, the per-entity service registry, the
//! active data view, and the transient UI concerns (input mode, notification,
//! redraw flag). Mutated only from the single event loop; service results
//! come back through the action channel as messages.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::config::Config;
use crate::controller::actions::Action;
use crate::model::data_manager::DataManager;
use crate::service::registry::ServiceRegistry;

/// Keyboard focus: either browsing the table or typing in the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// Transient status message surfaced by the presentation layer. The service
/// layer never raises these itself.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: Instant,
    pub auto_dismiss_ms: Option<u64>,
}

/// Core application state struct.
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<ServiceRegistry>,
    /// Entity key of the active view (a registry key).
    pub entity: String,
    pub dm: DataManager,
    pub input_mode: InputMode,
    pub notification: Option<Notification>,
    pub action_tx: mpsc::UnboundedSender<Action>,
    pub redraw: bool,
    /// Monotonic fetch generation; completions from older generations are
    /// discarded instead of clobbering newer data.
    pub generation: u64,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        registry: Arc<ServiceRegistry>,
        entity: impl Into<String>,
        dm: DataManager,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            config,
            registry,
            entity: entity.into(),
            dm,
            input_mode: InputMode::Browse,
            notification: None,
            action_tx,
            redraw: true,
            generation: 0,
        }
    }

    /// Show a notification with auto-dismiss.
    pub fn show_notification(
        &mut self,
        message: String,
        level: NotificationLevel,
        auto_dismiss_ms: Option<u64>,
    ) {
        self.notification = Some(Notification {
            message,
            level,
            timestamp: Instant::now(),
            auto_dismiss_ms,
        });
        self.redraw = true;
    }

    pub fn show_info(&mut self, message: String) {
        info!("{message}");
        self.show_notification(message, NotificationLevel::Info, Some(3000));
    }

    pub fn show_success(&mut self, message: String) {
        self.show_notification(message, NotificationLevel::Success, Some(2000));
    }

    pub fn show_warning(&mut self, message: String) {
        self.show_notification(message, NotificationLevel::Warning, Some(5000));
    }

    /// Errors stick until dismissed.
    pub fn show_error(&mut self, message: String) {
        error!("{message}");
        self.show_notification(message, NotificationLevel::Error, None);
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
        self.redraw = true;
    }

    /// Check if the notification should auto-dismiss and do so if needed.
    pub fn update_notification(&mut self) -> bool {
        if let Some(notification) = &self.notification {
            if let Some(auto_dismiss_ms) = notification.auto_dismiss_ms {
                if notification.timestamp.elapsed().as_millis() > u128::from(auto_dismiss_ms) {
                    self.notification = None;
                    self.redraw = true;
                    return true;
                }
            }
        }
        false
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("entity", &self.entity)
            .field("input_mode", &self.input_mode)
            .field("generation", &self.generation)
            .field("redraw", &self.redraw)
            .field("notification", &self.notification)
            .finish()
    }
}
