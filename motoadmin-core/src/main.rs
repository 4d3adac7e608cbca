//! src/main.rs
//! ============================================================================
//! # Workshop Admin TUI Entry Point
//!
//! Async terminal admin console for the motorcycle-workshop REST backend,
//! built with ratatui and tokio. Wires one CrudService per entity into the
//! registry, builds the motorcycles data view, and runs the event loop.

use std::{
    io::{self, Stdout},
    sync::Arc,
};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend as Backend};
use serde_json::Value;
use tokio::{
    signal,
    sync::{Mutex, MutexGuard, Notify, mpsc},
};
use tracing::{error, info, warn};

use motoadmin_core::{
    Logger,
    config::config::Config,
    controller::{actions::Action, event_loop::Controller},
    model::{
        actions::{ActionsConfig, Permissions, Role},
        app_state::AppState,
        column::{CellKind, Column},
        data_manager::{DataManager, DataViewConfig},
        row::Row,
        view_state::{FilterDef, FilterOption},
    },
    service::{registry::ServiceRegistry, transport::HttpTransport},
    util::debounce::DebounceConfig,
    view::ui::View,
};

type AppTerminal = Terminal<Backend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_handler();

    let app: App = App::new()
        .await
        .context("Failed to initialize application")?;

    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

/// Application runtime configuration and state
struct App {
    terminal: AppTerminal,
    controller: Controller,
    state: Arc<Mutex<AppState>>,
    shutdown: Arc<Notify>,
}

impl App {
    /// Initialize the application with all necessary components
    async fn new() -> Result<Self> {
        Logger::init_tracing();
        info!("Starting workshop admin TUI");

        let terminal: AppTerminal = setup_terminal().context("Failed to initialize terminal")?;

        let config: Arc<Config> = Arc::new(Config::load().await.unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }));

        let registry: Arc<ServiceRegistry> =
            Arc::new(build_registry(&config).context("Failed to build service registry")?);

        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();

        let dm: DataManager = DataManager::new(motorcycles_view(&config));
        let app_state: Arc<Mutex<AppState>> = Arc::new(Mutex::new(AppState::new(
            config,
            registry,
            "motos",
            dm,
            action_tx.clone(),
        )));

        let controller: Controller = Controller::new(app_state.clone(), action_rx);
        let shutdown: Arc<Notify> = Arc::new(Notify::new());

        // initial fetch
        action_tx
            .send(Action::Refresh)
            .context("Failed to queue initial refresh")?;

        info!("Application initialization complete");

        Ok(Self {
            terminal,
            controller,
            state: app_state,
            shutdown,
        })
    }

    /// Run the main application event loop
    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler().await;

        info!("Starting main event loop");

        loop {
            self.render().await?;

            let action: Action = tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("Shutdown signal received");
                    break;
                }

                maybe_action = self.controller.next_action() => {
                    match maybe_action {
                        Some(action) => action,
                        None => {
                            info!("Controller stream ended");
                            break;
                        }
                    }
                }
            };

            if matches!(action, Action::Quit) {
                info!("Quit action received");
                break;
            }

            self.controller.dispatch_action(action).await;
        }

        info!("Main event loop ended");
        Ok(())
    }

    /// Render the UI if a redraw is needed
    async fn render(&mut self) -> Result<()> {
        let mut state: MutexGuard<'_, AppState> = self.state.lock().await;

        if state.redraw {
            self.terminal
                .draw(|frame: &mut Frame<'_>| {
                    View::redraw(frame, &state);
                })
                .context("Failed to draw terminal")?;

            state.redraw = false;
        }

        Ok(())
    }

    /// Setup signal handlers for graceful shutdown
    async fn setup_shutdown_handler(&self) {
        let shutdown: Arc<Notify> = self.shutdown.clone();

        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C signal");
                    shutdown.notify_one();
                }
                Err(e) => {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            error!("Failed to cleanup terminal: {}", e);
        }
    }
}

/// One CrudService per workshop entity over a shared HTTP client.
fn build_registry(config: &Config) -> Result<ServiceRegistry> {
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let base: &str = &config.api_base_url;
    let registry = ServiceRegistry::builder()
        .entity("motos", Arc::new(HttpTransport::new(http.clone(), base, "motos")))
        .entity(
            "mantenimientos",
            Arc::new(HttpTransport::new(http.clone(), base, "mantenimientos")),
        )
        .entity(
            "recordatorios",
            Arc::new(HttpTransport::new(http.clone(), base, "recordatorios")),
        )
        .entity("roles", Arc::new(HttpTransport::new(http, base, "roles")))
        .build();

    Ok(registry)
}

/// Column spec, filters, and action wiring of the motorcycles view.
fn motorcycles_view(config: &Config) -> DataViewConfig {
    fn brand_is(row: &Row, value: &str) -> bool {
        row.field("marca").and_then(Value::as_str) == Some(value)
    }

    let columns: Vec<Column> = vec![
        Column::new("Placa", "placa").searchable(),
        Column::new("Marca", "marca").searchable(),
        Column::new("Modelo", "modelo").searchable(),
        Column::new("Kilometraje", "kilometraje").kind(CellKind::Number),
        Column::new("Último servicio", "ultimo_servicio").kind(CellKind::Date),
        Column::computed("Estado").kind(CellKind::Status),
    ];

    let filters: Vec<FilterDef> = vec![FilterDef {
        key: "marca".to_string(),
        label: "Marca".to_string(),
        options: ["all", "Honda", "Yamaha", "Suzuki", "Kawasaki"]
            .into_iter()
            .map(|v| FilterOption {
                value: v.to_string(),
                label: v.to_string(),
            })
            .collect(),
        apply: Some(brand_is),
    }];

    let mut view = DataViewConfig::new("Motos", "motos", columns);
    view.filters = filters;
    view.search_placeholder = "Buscar por placa, marca o modelo...".to_string();
    view.actions = ActionsConfig::standard();
    // TODO: resolve the role from the authenticated session once login lands
    view.permissions = Permissions::for_role(Role::Recepcionista);
    view.empty_message = "Sin motos para mostrar".to_string();
    view.debounce = DebounceConfig::search_input(config.search_debounce);
    view
}

/// Initialize terminal in raw mode with alternate screen
fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend: Backend<Stdout> = Backend::new(stdout);
    let terminal: Terminal<Backend<Stdout>> =
        Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

/// Restore terminal to normal mode
fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

/// Setup panic handler for graceful terminal restoration
fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
