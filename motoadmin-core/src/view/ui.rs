//! src/view/ui.rs
//! ============================================================================
//! # View: TUI Render Orchestrator
//!
//! Each draw cycle lays out toolbar, data table, bulk bar (only when a
//! selection exists), and status bar, then the confirmation prompt on top
//! when a bulk action is staged.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::model::app_state::AppState;
use crate::view::components::bulk_actions_bar::BulkActionsBar;
use crate::view::components::data_table::DataTable;
use crate::view::components::status_bar::StatusBar;
use crate::view::components::toolbar::Toolbar;

pub struct View;

impl View {
    /// Draws the full UI for one frame; called in `terminal.draw(|frame| ...)`.
    pub fn redraw(frame: &mut Frame<'_>, app: &AppState) {
        let selection_active: bool = !app.dm.state.selection.is_empty();
        let bulk_height: u16 = if selection_active { 1 } else { 0 };

        let chunks: Vec<Rect> = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(2),
                Constraint::Length(bulk_height),
                Constraint::Length(1),
            ])
            .split(frame.area())
            .to_vec();

        Toolbar::render(frame, app, chunks[0]);
        DataTable::render(frame, app, chunks[1]);
        if selection_active {
            BulkActionsBar::render(frame, app, chunks[2]);
        }
        StatusBar::render(frame, app, chunks[3]);

        if app.dm.pending_bulk.is_some() {
            BulkActionsBar::render_confirmation(frame, app, frame.area());
        }
    }
}
