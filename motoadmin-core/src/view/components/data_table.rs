//! src/view/components/data_table.rs
//! ============================================================================
//! # DataTable: Generic Entity Table Component
//!
//! Renders the already-derived rows of a `DataManager`: column-driven cell
//! formatting, selection checkboxes with a tri-state header, sort indicators,
//! the appended Acciones column, a loading skeleton, and empty/error states.
//! The table never re-sorts or re-filters; it displays exactly what the
//! derivation handed it, in that order.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row as TableRow, Table, TableState},
};

use crate::model::app_state::AppState;
use crate::model::data_manager::{DataManager, SelectState};
use crate::model::row::Row;

/// Skeleton rows shown while loading.
const LOADING_ROWS: usize = 5;

pub struct DataTable;

impl DataTable {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let dm: &DataManager = &app.dm;
        let visible: Vec<&Row> = dm.visible_rows();

        let mut widths: Vec<Constraint> = Vec::new();
        let mut header_cells: Vec<Cell<'_>> = Vec::new();

        if dm.config.selectable {
            widths.push(Constraint::Length(3));
            header_cells.push(Cell::from(Self::checkbox(dm.header_select_state())));
        }

        for i in 0..dm.config.columns.len() {
            widths.push(Constraint::Fill(1));
            header_cells.push(Cell::from(Self::header_label(dm, i)));
        }

        if dm.has_actions_column() {
            widths.push(Constraint::Length(14));
            header_cells.push(Cell::from("Acciones"));
        }

        let header: TableRow<'_> = TableRow::new(header_cells).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let keymap: String = [
            "[/] Buscar",
            "[Tab] Vista",
            "[f] Filtro",
            "[Espacio] Marcar",
            "[*] Todos",
            "[E] Exportar",
            "[r] Recargar",
            "[q] Salir",
        ]
        .join("   ");
        let footer: TableRow<'_> = TableRow::new(vec![Cell::from(keymap)]).style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        );

        let total_cols: usize = widths.len().max(1);
        let rows: Vec<TableRow<'_>> = if dm.loading {
            Self::skeleton_rows(total_cols)
        } else if visible.is_empty() {
            vec![Self::placeholder_row(dm)]
        } else {
            visible
                .iter()
                .map(|row| Self::data_row(dm, row))
                .collect()
        };

        let mut table_state: TableState = dm.table_state.clone();
        if dm.loading || visible.is_empty() {
            table_state.select(None);
        } else {
            table_state.select(dm.cursor);
        }

        let title: String = format!(
            " {} — {} de {} ",
            dm.config.title,
            visible.len(),
            dm.rows.len()
        );
        let table: Table<'_> = Table::new(rows, widths)
            .header(header)
            .footer(footer)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .column_spacing(1);

        frame.render_stateful_widget(table, area, &mut table_state);
    }

    /// Header text with sort indicator; a numeric hotkey prefix marks the
    /// sortable columns.
    fn header_label(dm: &DataManager, index: usize) -> String {
        let column = &dm.config.columns[index];
        let mut label: String = if column.sortable && index < 9 {
            format!("{} {}", index + 1, column.header)
        } else {
            column.header.clone()
        };
        if column.sortable
            && column.accessor.is_some()
            && dm.state.sort_field == column.accessor
        {
            label.push(' ');
            label.push(match dm.state.sort_direction {
                crate::model::view_state::SortDirection::Asc => '▲',
                crate::model::view_state::SortDirection::Desc => '▼',
            });
        }
        label
    }

    fn checkbox(state: SelectState) -> &'static str {
        match state {
            SelectState::None => "[ ]",
            SelectState::Partial => "[~]",
            SelectState::All => "[x]",
        }
    }

    fn data_row<'a>(dm: &'a DataManager, row: &'a Row) -> TableRow<'a> {
        let mut cells: Vec<Cell<'a>> = Vec::new();

        if dm.config.selectable {
            let marked: bool = dm.state.selection.contains(&row.id);
            cells.push(Cell::from(if marked { "[x]" } else { "[ ]" }));
        }

        for column in &dm.config.columns {
            cells.push(Cell::from(column.format_cell(row)));
        }

        if dm.has_actions_column() {
            // eligible actions in declaration order, as hotkey hints
            let hints: String = dm
                .actions_for(row)
                .iter()
                .map(|a| format!("[{}]", a.hotkey()))
                .collect();
            cells.push(Cell::from(hints).style(Style::default().fg(Color::Cyan)));
        }

        let style: Style = if row.deleted {
            Style::default().fg(Color::DarkGray)
        } else if !row.activo {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default()
        };

        TableRow::new(cells).style(style)
    }

    /// One row spanning the table with the error (when set) or the
    /// caller-configured empty message.
    fn placeholder_row(dm: &DataManager) -> TableRow<'_> {
        let (message, color) = match dm.error.as_deref() {
            Some(err) => (err, Color::Red),
            None => (dm.config.empty_message.as_str(), Color::Gray),
        };
        TableRow::new(vec![Cell::from(message).style(Style::default().fg(color))])
    }

    fn skeleton_rows<'a>(columns: usize) -> Vec<TableRow<'a>> {
        (0..LOADING_ROWS)
            .map(|_| {
                let cells: Vec<Cell<'_>> =
                    (0..columns).map(|_| Cell::from("░░░░░░")).collect();
                TableRow::new(cells).style(Style::default().fg(Color::DarkGray))
            })
            .collect()
    }
}
