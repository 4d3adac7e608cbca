//! src/view/components/status_bar.rs
//! ============================================================================
//! # StatusBar: Persistent Notification/Info Display
//!
//! Bottom line of the UI: the current leveled notification (the presentation
//! adapter for service results) on the left, entity and row counts on the
//! right. Errors stick until dismissed; other levels auto-expire.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::model::app_state::{AppState, NotificationLevel};

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let (msg, style) = match &app.notification {
            Some(n) => {
                let style: Style = match n.level {
                    NotificationLevel::Info => Style::default().fg(Color::Cyan),
                    NotificationLevel::Success => Style::default().fg(Color::Green),
                    NotificationLevel::Warning => Style::default().fg(Color::Yellow),
                    NotificationLevel::Error => Style::default().fg(Color::Red).bold(),
                };
                (n.message.clone(), style)
            }
            None if app.dm.loading => (
                "Cargando...".to_string(),
                Style::default().fg(Color::Yellow),
            ),
            None => ("Listo".to_string(), Style::default().fg(Color::DarkGray)),
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let left = Paragraph::new(Line::from(Span::styled(format!(" {msg} "), style)))
            .alignment(Alignment::Left);

        let right_text: String = format!(
            "{} — {} visibles / {} total ",
            app.entity,
            app.dm.visible_rows().len(),
            app.dm.rows.len()
        );
        let right = Paragraph::new(Line::from(Span::styled(
            right_text,
            Style::default().fg(Color::Magenta),
        )))
        .alignment(Alignment::Right);

        frame.render_widget(left, chunks[0]);
        frame.render_widget(right, chunks[1]);
    }
}
