//! src/view/components/bulk_actions_bar.rs
//! ============================================================================
//! # BulkActionsBar: Confirm-Then-Execute Bar for the Selection
//!
//! Shown while the selection is non-empty: the count, the offered bulk verbs
//! with their hotkeys, and — once a verb is staged — a centered confirmation
//! prompt templated with the selection size. Execution and error surfacing
//! belong to the controller; this component only renders the staged state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::model::app_state::AppState;
use crate::model::data_manager::DataManager;

pub struct BulkActionsBar;

impl BulkActionsBar {
    /// Render the one-line bar listing the offered verbs.
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let dm: &DataManager = &app.dm;
        let count: usize = dm.state.selection.len();

        let mut spans: Vec<Span<'_>> = vec![Span::styled(
            format!(" {count} seleccionado(s) "),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )];
        for action in &dm.config.bulk_actions {
            spans.push(Span::styled(
                format!("[{}] {}  ", action.hotkey(), action.label()),
                Style::default().fg(Color::Cyan),
            ));
        }
        spans.push(Span::styled(
            "[Esc] Deseleccionar",
            Style::default().fg(Color::Gray),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Render the confirmation prompt for the staged action, centered.
    pub fn render_confirmation(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let dm: &DataManager = &app.dm;
        let Some(action) = dm.pending_bulk else {
            return;
        };
        let count: usize = dm.state.selection.len();

        let lines = vec![
            Line::from(Span::styled(
                action.confirm_title(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(action.confirm_message(count)),
            Line::from(""),
            Line::from(Span::styled(
                "[y] Confirmar    [n] Cancelar",
                Style::default().fg(Color::Cyan),
            )),
        ];

        let overlay: Rect = Self::centered_rect(50, 30, area);
        frame.render_widget(Clear, overlay);
        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .title("Confirmar acción")
                        .title_alignment(Alignment::Center)
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                ),
            overlay,
        );
    }

    /// Centers a rectangle of the given percent width/height inside area.
    fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical[1]);

        horizontal[1]
    }
}
