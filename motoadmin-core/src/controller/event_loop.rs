//! src/controller/event_loop.rs
//! ============================================================================
//! # Controller: Async Event Loop
//!
//! Waits on terminal events and on the action channel, translates keys into
//! state mutations, and spawns service calls whose completions come back as
//! `Action` messages. All state mutation happens here, on the single event
//! loop; spawned tasks only perform network I/O and post their result.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::{Mutex, MutexGuard, mpsc};
use tracing::{info, warn};

use crate::controller::actions::Action;
use crate::model::actions::{BulkAction, RowAction};
use crate::model::app_state::{AppState, InputMode};
use crate::model::row::{RowId, ingest_list};
use crate::service::crud::{CrudService, ServiceResult};
use crate::service::transport::Params;

/// Controller struct: manages app state, event sources, and channels.
pub struct Controller {
    pub app: Arc<Mutex<AppState>>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl Controller {
    pub fn new(app: Arc<Mutex<AppState>>, action_rx: mpsc::UnboundedReceiver<Action>) -> Self {
        Self { app, action_rx }
    }

    /// Waits for the next action: either a translated terminal event or a
    /// message posted by a spawned task. A quiet poll window becomes a Tick
    /// so debounce and notification timers stay live.
    pub async fn next_action(&mut self) -> Option<Action> {
        tokio::select! {
            action = self.action_rx.recv() => action,
            event = Self::next_terminal_event() => Some(match event {
                Some(TermEvent::Key(key)) => Action::Key(key),
                Some(TermEvent::Resize(w, h)) => Action::Resize(w, h),
                _ => Action::Tick,
            }),
        }
    }

    /// Waits asynchronously for the next terminal event. Uses crossterm's
    /// nonblocking poll and integrates with Tokio via spawn_blocking.
    async fn next_terminal_event() -> Option<TermEvent> {
        tokio::task::spawn_blocking(|| {
            if event::poll(std::time::Duration::from_millis(100)).unwrap_or(false) {
                event::read().ok()
            } else {
                None
            }
        })
        .await
        .ok()
        .flatten()
    }

    /// Apply one action to the state.
    pub async fn dispatch_action(&self, action: Action) {
        let mut state: MutexGuard<'_, AppState> = self.app.lock().await;

        match action {
            Action::Key(key) => self.handle_key(&mut state, key),
            Action::Resize(_, _) => state.redraw = true,
            Action::Tick => {
                let now = Instant::now();
                if state.dm.poll_search(now) {
                    state.redraw = true;
                }
                state.update_notification();
            }
            Action::Refresh => self.start_refresh(&mut state),
            Action::RowsLoaded { generation, result } => {
                if generation != state.generation {
                    info!("Discarding stale fetch (generation {generation})");
                    return;
                }
                match result {
                    Ok(reply) => {
                        let page = ingest_list(&reply.data);
                        info!("Loaded {} rows of {}", page.rows.len(), state.entity);
                        state.dm.set_rows(page.rows);
                    }
                    Err(err) => {
                        state.dm.set_error(err.to_string());
                        state.show_error(err.to_string());
                    }
                }
                state.redraw = true;
            }
            Action::BulkDone { action, result } => {
                match result {
                    Ok(_) => {
                        state.show_success(format!("{} completado", action.label()));
                        // refetch with the mutation applied
                        self.start_refresh(&mut state);
                    }
                    Err(err) => state.show_error(err.to_string()),
                }
                state.redraw = true;
            }
            Action::RowActionDone { action, result } => {
                match result {
                    Ok(_) => {
                        state.show_success(format!("{} completado", action.label()));
                        self.start_refresh(&mut state);
                    }
                    Err(err) => state.show_error(err.to_string()),
                }
                state.redraw = true;
            }
            Action::Quit => {}
        }
    }

    // --- Keyboard handling ---

    fn handle_key(&self, state: &mut AppState, key: KeyEvent) {
        state.redraw = true;

        // confirmation prompt grabs the keyboard first
        if state.dm.pending_bulk.is_some() {
            self.handle_confirm_key(state, key);
            return;
        }

        match state.input_mode {
            InputMode::Search => self.handle_search_key(state, key),
            InputMode::Browse => self.handle_browse_key(state, key),
        }
    }

    fn handle_confirm_key(&self, state: &mut AppState, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some((action, ids)) = state.dm.confirm_bulk() {
                    self.spawn_bulk(state, action, ids);
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => state.dm.cancel_bulk(),
            _ => {}
        }
    }

    fn handle_search_key(&self, state: &mut AppState, key: KeyEvent) {
        // control chords are never search input; Ctrl-C still quits here
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                let _ = state.action_tx.send(Action::Quit);
            }
            return;
        }

        let now = Instant::now();
        match key.code {
            KeyCode::Char(ch) => state.dm.search_push(ch, now),
            KeyCode::Backspace => state.dm.search_backspace(now),
            KeyCode::Enter => {
                state.dm.flush_search();
                state.input_mode = InputMode::Browse;
            }
            KeyCode::Esc => {
                state.dm.cancel_search_input();
                state.input_mode = InputMode::Browse;
            }
            _ => {}
        }
    }

    fn handle_browse_key(&self, state: &mut AppState, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            let _ = state.action_tx.send(Action::Quit);
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                let _ = state.action_tx.send(Action::Quit);
            }
            KeyCode::Up | KeyCode::Char('k') => state.dm.move_cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => state.dm.move_cursor_down(),
            KeyCode::Char(' ') => state.dm.toggle_mark_at_cursor(),
            KeyCode::Char('*') => state.dm.select_all_visible(),
            KeyCode::Char('c') => state.dm.clear_selection(),
            KeyCode::Tab => state.dm.cycle_view_mode(),
            KeyCode::Char('/') => {
                if state.dm.config.searchable {
                    state.input_mode = InputMode::Search;
                }
            }
            KeyCode::Char('f') => state.dm.cycle_filter(),
            KeyCode::Char('E') => self.handle_export(state),
            KeyCode::Char('r') => self.start_refresh(state),
            KeyCode::Char(digit @ '1'..='9') => {
                let index: usize = digit as usize - '1' as usize;
                state.dm.request_sort_by_column(index);
            }
            KeyCode::Char(ch) => self.handle_verb_key(state, ch),
            KeyCode::Esc => {
                state.dm.clear_selection();
                state.dismiss_notification();
            }
            _ => {}
        }
    }

    /// Bulk hotkeys (uppercase) and per-row action hotkeys on the cursor row.
    fn handle_verb_key(&self, state: &mut AppState, ch: char) {
        if state.dm.loading {
            return;
        }

        if let Some(bulk) = BulkAction::ALL.into_iter().find(|a| a.hotkey() == ch) {
            state.dm.request_bulk(bulk);
            return;
        }

        let Some(row) = state.dm.row_at_cursor() else {
            return;
        };
        let eligible = state.dm.actions_for(row);
        let Some(action) = eligible.into_iter().find(|a| a.hotkey() == ch) else {
            return;
        };
        let id: RowId = row.id.clone();

        match action {
            // view/edit open forms that live outside this core
            RowAction::View | RowAction::Edit => {
                state.show_info(format!("{} {} #{id}", action.label(), state.entity));
            }
            _ => self.spawn_row_action(state, action, id),
        }
    }

    /// Write the visible rows of the active view to `exports/{entity}.csv`.
    fn handle_export(&self, state: &mut AppState) {
        if !state.dm.config.exportable {
            return;
        }
        let csv: String = state.dm.export_csv();
        let count: usize = state.dm.visible_rows().len();
        let path: PathBuf = PathBuf::from("exports").join(format!("{}.csv", state.entity));

        let written = std::fs::create_dir_all("exports").and_then(|()| std::fs::write(&path, csv));
        match written {
            Ok(()) => {
                state.show_success(format!("{count} registro(s) exportados a {}", path.display()));
            }
            Err(e) => state.show_error(format!("No se pudo exportar: {e}")),
        }
    }

    // --- Service call orchestration ---

    /// Re-fetch the active view's rows. Bumps the generation so completions
    /// of older fetches are discarded on arrival.
    fn start_refresh(&self, state: &mut AppState) {
        let Ok(service) = state.registry.get(&state.entity) else {
            warn!("No service registered for {}", state.entity);
            return;
        };

        state.generation += 1;
        state.dm.set_loading();
        state.redraw = true;

        let generation: u64 = state.generation;
        let params: Params = vec![("page_size".to_string(), state.config.page_size.to_string())];
        let tx = state.action_tx.clone();
        tokio::spawn(async move {
            let result: ServiceResult = service.list(&params).await;
            let _ = tx.send(Action::RowsLoaded { generation, result });
        });
    }

    fn spawn_bulk(&self, state: &mut AppState, action: BulkAction, ids: Vec<RowId>) {
        let Ok(service) = state.registry.get(&state.entity) else {
            return;
        };
        info!("Bulk {} on {} ids", action.key(), ids.len());
        state.dm.set_loading();

        let tx = state.action_tx.clone();
        tokio::spawn(async move {
            let result: ServiceResult = service.bulk(action, &ids).await;
            let _ = tx.send(Action::BulkDone { action, result });
        });
    }

    fn spawn_row_action(&self, state: &mut AppState, action: RowAction, id: RowId) {
        let Ok(service) = state.registry.get(&state.entity) else {
            return;
        };
        info!("{} on #{id}", action.label());
        state.dm.set_loading();

        let tx = state.action_tx.clone();
        tokio::spawn(async move {
            let result: ServiceResult = run_row_action(&service, action, &id).await;
            let _ = tx.send(Action::RowActionDone { action, result });
        });
    }
}

async fn run_row_action(service: &CrudService, action: RowAction, id: &RowId) -> ServiceResult {
    match action {
        RowAction::Delete => service.soft_delete(id).await,
        RowAction::Activate => service.activate(id).await,
        RowAction::Deactivate => service.deactivate(id).await,
        RowAction::Restore => service.restore(id).await,
        RowAction::HardDelete => service.hard_delete(id).await,
        // handled upstream; fetching the record is the closest sensible verb
        RowAction::View | RowAction::Edit => service.get(id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::Config;
    use crate::model::data_manager::{DataManager, DataViewConfig};
    use crate::service::registry::ServiceRegistry;
    use crate::service::transport::{ApiResponse, Transport, TransportError};
    use async_trait::async_trait;
    use reqwest::Method;
    use serde_json::{Value, json};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Answers every request with an empty list and records the query
    /// parameters it was called with.
    #[derive(Default)]
    struct RecordingTransport {
        seen: StdMutex<Vec<Params>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn request(
            &self,
            _method: Method,
            _path: &str,
            params: &Params,
            _body: Option<Value>,
        ) -> Result<ApiResponse, TransportError> {
            self.seen.lock().unwrap().push(params.clone());
            Ok(ApiResponse {
                status: 200,
                data: json!([]),
            })
        }
    }

    fn harness() -> (Controller, Arc<RecordingTransport>) {
        let (tx, rx) = mpsc::unbounded_channel::<Action>();
        let transport = Arc::new(RecordingTransport::default());
        let registry = Arc::new(
            ServiceRegistry::builder()
                .entity("motos", transport.clone())
                .build(),
        );
        let config = Config {
            page_size: 25,
            ..Config::default()
        };
        let dm = DataManager::new(DataViewConfig::new("Motos", "motos", Vec::new()));
        let app = Arc::new(Mutex::new(AppState::new(
            Arc::new(config),
            registry,
            "motos",
            dm,
            tx,
        )));
        (Controller::new(app, rx), transport)
    }

    #[tokio::test]
    async fn test_refresh_sends_page_size_param() {
        let (controller, transport) = harness();
        controller.dispatch_action(Action::Refresh).await;

        for _ in 0..100 {
            if !transport.seen.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0], vec![("page_size".to_string(), "25".to_string())]);
    }

    #[tokio::test]
    async fn test_ctrl_c_in_search_mode_quits_without_typing() {
        let (mut controller, _transport) = harness();
        {
            let mut state = controller.app.lock().await;
            state.input_mode = InputMode::Search;
            state.dm.search_input = "ho".to_string();
        }

        controller
            .dispatch_action(Action::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            )))
            .await;

        assert!(matches!(controller.action_rx.try_recv(), Ok(Action::Quit)));
        let state = controller.app.lock().await;
        assert_eq!(state.dm.search_input, "ho");
    }
}
