//! src/view/components/toolbar.rs
//! ============================================================================
//! # Toolbar: Search Box, View-Mode Tabs, and Stats Strip
//!
//! Top strip of a data view: the debounced search input, the view-mode tabs
//! with their bucket counts, and active filter values. Thin: all state lives
//! in the DataManager, this only presents it.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::model::app_state::{AppState, InputMode};
use crate::model::data_manager::DataManager;
use crate::model::row::RowStats;
use crate::model::view_state::ViewMode;

pub struct Toolbar;

impl Toolbar {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let dm: &DataManager = &app.dm;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        Self::render_search(frame, app, chunks[0]);
        Self::render_modes(frame, dm, chunks[1]);
    }

    fn render_search(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let dm: &DataManager = &app.dm;
        if !dm.config.searchable {
            frame.render_widget(Block::default().borders(Borders::ALL), area);
            return;
        }

        let editing: bool = app.input_mode == InputMode::Search;
        let text: &str = if editing || !dm.search_input.is_empty() {
            dm.search_input.as_str()
        } else {
            dm.config.search_placeholder.as_str()
        };
        let style: Style = if editing {
            Style::default().fg(Color::White)
        } else if dm.search_input.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Buscar [/] ")
            .border_style(if editing {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });

        frame.render_widget(
            Paragraph::new(Span::styled(text.to_string(), style)).block(block),
            area,
        );
    }

    /// View-mode tabs with bucket counts, e.g. `Activos (6)`.
    fn render_modes(frame: &mut Frame<'_>, dm: &DataManager, area: Rect) {
        let stats: RowStats = dm.stats();
        let mut spans: Vec<Span<'_>> = Vec::new();

        for mode in &dm.config.view_modes {
            let count: usize = match mode {
                ViewMode::Active => stats.active,
                ViewMode::Inactive => stats.inactive,
                ViewMode::Deleted => stats.deleted,
                ViewMode::All => stats.total,
            };
            let selected: bool = *mode == dm.state.view_mode;
            let style: Style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} ({count}) ", mode.label()), style));
        }

        for chip in Self::filter_chips(dm) {
            spans.push(Span::styled(chip, Style::default().fg(Color::Cyan)));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(
                Block::default().borders(Borders::ALL).title(" Vista [Tab] "),
            ),
            area,
        );
    }

    /// Active filter chips in declaration order. Iterating the state map
    /// directly would jitter the chip order between redraws.
    fn filter_chips(dm: &DataManager) -> Vec<String> {
        dm.config
            .filters
            .iter()
            .filter_map(|def| {
                let value: &String = dm.state.filters.get(&def.key)?;
                if value.is_empty() || value == "all" {
                    return None;
                }
                Some(format!(" {}={value} ", def.label))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::data_manager::{DataManager, DataViewConfig};
    use crate::model::view_state::FilterDef;

    fn def(key: &str, label: &str) -> FilterDef {
        FilterDef {
            key: key.into(),
            label: label.into(),
            options: Vec::new(),
            apply: None,
        }
    }

    #[test]
    fn test_filter_chips_follow_declaration_order() {
        let mut config = DataViewConfig::new("Motos", "motos", Vec::new());
        config.filters = vec![def("marca", "Marca"), def("anio", "Año")];
        let mut dm = DataManager::new(config);

        // set in the reverse of declaration order; chips must not follow it
        dm.set_filter("anio", "2026");
        dm.set_filter("marca", "Honda");
        dm.set_filter("desconocido", "x");

        assert_eq!(
            Toolbar::filter_chips(&dm),
            vec![" Marca=Honda ", " Año=2026 "]
        );
    }

    #[test]
    fn test_inert_filter_values_render_no_chip() {
        let mut config = DataViewConfig::new("Motos", "motos", Vec::new());
        config.filters = vec![def("marca", "Marca"), def("anio", "Año")];
        let mut dm = DataManager::new(config);

        dm.set_filter("marca", "all");
        dm.set_filter("anio", "");
        assert!(Toolbar::filter_chips(&dm).is_empty());
    }
}
