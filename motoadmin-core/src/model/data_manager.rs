//! src/model/data_manager.rs
//! ============================================================================
//! # DataManager: One Configurable Data View
//!
//! Composes the view-state engine, the data table, the bulk-actions bar, and
//! the toolbar into a single drop-in view over one entity. It owns no cache
//! and never re-fetches by itself: the controller owns the raw row array's
//! lifecycle and pushes updated rows in after every mutation; `DataManager`
//! only derives what is visible and translates the action/permission config
//! into concrete per-row wiring.

use std::time::Instant;

use ratatui::widgets::TableState;

use crate::model::actions::{ActionsConfig, BulkAction, Permissions, RowAction, row_actions};
use crate::model::column::Column;
use crate::model::row::{Row, RowId, RowStats};
use crate::model::view_state::{FilterDef, ViewMode, ViewState, derive_visible_rows};
use crate::util::debounce::{DebounceConfig, SearchDebounce};

/// Tri-state of the header selection checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectState {
    None,
    Partial,
    All,
}

/// Static configuration of one data view, declared by the caller and
/// immutable for the lifetime of the manager.
#[derive(Debug, Clone)]
pub struct DataViewConfig {
    pub title: String,
    pub entity: String,
    pub columns: Vec<Column>,
    pub filters: Vec<FilterDef>,
    pub view_modes: Vec<ViewMode>,
    pub default_view_mode: ViewMode,
    pub searchable: bool,
    pub search_placeholder: String,
    pub selectable: bool,
    pub actions: ActionsConfig,
    pub permissions: Permissions,
    /// Allowlist of offered bulk verbs; unknown keys were already dropped
    /// (with a warning) by `BulkAction::from_key` at config time.
    pub bulk_actions: Vec<BulkAction>,
    pub empty_message: String,
    /// Offer the CSV export verb for this view.
    pub exportable: bool,
    pub debounce: DebounceConfig,
}

impl DataViewConfig {
    pub fn new(title: impl Into<String>, entity: impl Into<String>, columns: Vec<Column>) -> Self {
        DataViewConfig {
            title: title.into(),
            entity: entity.into(),
            columns,
            filters: Vec::new(),
            view_modes: ViewMode::ALL_MODES.to_vec(),
            default_view_mode: ViewMode::Active,
            searchable: true,
            search_placeholder: "Buscar...".to_string(),
            selectable: true,
            actions: ActionsConfig::standard(),
            permissions: Permissions::default(),
            bulk_actions: BulkAction::ALL.to_vec(),
            empty_message: "Sin registros para mostrar".to_string(),
            exportable: true,
            debounce: DebounceConfig::default(),
        }
    }
}

/// Orchestrating state for one entity view.
#[derive(Debug)]
pub struct DataManager {
    pub config: DataViewConfig,
    pub state: ViewState,
    /// Raw rows as last pushed by the controller; display order derives from
    /// these without mutation.
    pub rows: Vec<Row>,
    pub loading: bool,
    pub error: Option<String>,
    /// Cursor into the currently visible rows.
    pub cursor: Option<usize>,
    pub table_state: TableState,
    /// Live (not yet applied) search input buffer.
    pub search_input: String,
    debounce: SearchDebounce,
    /// Bulk action awaiting confirmation, if any.
    pub pending_bulk: Option<BulkAction>,
}

impl DataManager {
    pub fn new(config: DataViewConfig) -> Self {
        let state = ViewState::new(config.default_view_mode);
        let debounce = SearchDebounce::new(config.debounce);
        DataManager {
            config,
            state,
            rows: Vec::new(),
            loading: false,
            error: None,
            cursor: Some(0),
            table_state: TableState::default(),
            search_input: String::new(),
            debounce,
            pending_bulk: None,
        }
    }

    // --- Row lifecycle (controller-owned data pushed in) ---

    /// Replace the raw rows after a (re)fetch. Clears loading/error, prunes
    /// the selection down to ids that still exist, and clamps the cursor.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.state
            .selection
            .retain(|id| rows.iter().any(|r| &r.id == id));
        self.rows = rows;
        self.loading = false;
        self.error = None;
        self.clamp_cursor();
    }

    pub fn set_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Record a fetch failure. Stale rows stay visible rather than being
    /// cleared; the table shows the error only when there is nothing to show.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    // --- Derivation ---

    pub fn visible_rows(&self) -> Vec<&Row> {
        derive_visible_rows(&self.rows, &self.state, &self.config.columns, &self.config.filters)
    }

    pub fn stats(&self) -> RowStats {
        RowStats::of(&self.rows)
    }

    /// Whether an "Acciones" column is appended after the declared columns.
    /// The caller's column list is never mutated.
    pub fn has_actions_column(&self) -> bool {
        self.config.actions.any_enabled()
    }

    /// The actions rendered for one row (entity toggles ∧ row eligibility).
    pub fn actions_for(&self, row: &Row) -> Vec<RowAction> {
        row_actions(&self.config.actions, &self.config.permissions, row)
    }

    /// Header checkbox state over the currently visible rows.
    pub fn header_select_state(&self) -> SelectState {
        let visible = self.visible_rows();
        if visible.is_empty() {
            return SelectState::None;
        }
        let selected: usize = visible
            .iter()
            .filter(|row| self.state.selection.contains(&row.id))
            .count();
        if selected == 0 {
            SelectState::None
        } else if selected == visible.len() {
            SelectState::All
        } else {
            SelectState::Partial
        }
    }

    // --- Cursor ---

    pub fn move_cursor_up(&mut self) {
        if !self.visible_rows().is_empty() {
            self.cursor = Some(self.cursor.map_or(0, |c| c.saturating_sub(1)));
        }
    }

    pub fn move_cursor_down(&mut self) {
        let len: usize = self.visible_rows().len();
        if len > 0 {
            self.cursor = Some(self.cursor.map_or(0, |c| (c + 1).min(len - 1)));
        }
    }

    fn clamp_cursor(&mut self) {
        let len: usize = self.visible_rows().len();
        self.cursor = if len == 0 {
            None
        } else {
            Some(self.cursor.unwrap_or(0).min(len - 1))
        };
    }

    /// The row under the cursor, if any.
    pub fn row_at_cursor(&self) -> Option<&Row> {
        let visible = self.visible_rows();
        self.cursor.and_then(|c| visible.get(c).copied())
    }

    // --- Selection ---

    pub fn toggle_mark_at_cursor(&mut self) {
        if !self.config.selectable {
            return;
        }
        if let Some(id) = self.row_at_cursor().map(|row| row.id.clone()) {
            self.state.toggle_selection(&id);
        }
    }

    pub fn select_all_visible(&mut self) {
        if self.config.selectable {
            let ids: Vec<RowId> = self.visible_rows().iter().map(|r| r.id.clone()).collect();
            self.state.selection = ids.into_iter().collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    // --- View mode / sort / filters ---

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.config.view_modes.contains(&mode) {
            self.state.set_view_mode(mode);
            self.clamp_cursor();
        }
    }

    pub fn cycle_view_mode(&mut self) {
        let modes = &self.config.view_modes;
        if modes.is_empty() {
            return;
        }
        let current: usize = modes
            .iter()
            .position(|m| *m == self.state.view_mode)
            .unwrap_or(0);
        let next: ViewMode = modes[(current + 1) % modes.len()];
        self.set_view_mode(next);
    }

    /// Sort by declared column position (1-based hotkey). Non-sortable
    /// columns and columns without an accessor never trigger a sort.
    pub fn request_sort_by_column(&mut self, index: usize) {
        let Some(column) = self.config.columns.get(index) else {
            return;
        };
        if !column.sortable {
            return;
        }
        if let Some(accessor) = column.accessor.clone() {
            self.state.request_sort(&accessor);
        }
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.state.filters.insert(key.into(), value.into());
        self.clamp_cursor();
    }

    /// Advance the first declared filter to its next option, wrapping around.
    /// No-op for views without filters. The toolbar shows the active value.
    pub fn cycle_filter(&mut self) {
        let Some(def) = self.config.filters.first() else {
            return;
        };
        if def.options.is_empty() {
            return;
        }
        let current: &str = self
            .state
            .filters
            .get(&def.key)
            .map(String::as_str)
            .unwrap_or("");
        let next: usize = match def.options.iter().position(|o| o.value == current) {
            Some(i) => (i + 1) % def.options.len(),
            None => 0,
        };
        let key: String = def.key.clone();
        let value: String = def.options[next].value.clone();
        self.set_filter(key, value);
    }

    // --- Search (debounced) ---

    /// Record one keystroke of the search input.
    pub fn search_push(&mut self, ch: char, now: Instant) {
        self.search_input.push(ch);
        self.debounce.submit(self.search_input.clone(), now);
    }

    pub fn search_backspace(&mut self, now: Instant) {
        self.search_input.pop();
        self.debounce.submit(self.search_input.clone(), now);
    }

    /// Apply the settled query if the quiet period elapsed. Returns true when
    /// the visible set changed and a redraw is due.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.debounce.poll(now) {
            Some(query) => {
                self.apply_query(query);
                true
            }
            None => false,
        }
    }

    /// Apply the pending query immediately (Enter).
    pub fn flush_search(&mut self) -> bool {
        match self.debounce.flush() {
            Some(query) => {
                self.apply_query(query);
                true
            }
            None => false,
        }
    }

    /// Drop the live input and any pending query, keeping the applied one.
    pub fn cancel_search_input(&mut self) {
        self.debounce.cancel();
        self.search_input = self.state.search_query.clone();
    }

    fn apply_query(&mut self, query: String) {
        tracing::debug!("search query applied: {query:?}");
        self.state.search_query = query;
        self.clamp_cursor();
    }

    // --- Export ---

    /// The visible rows as CSV in display order, headed by the declared
    /// column headers. Cells render exactly as the table shows them.
    pub fn export_csv(&self) -> String {
        let header: Vec<String> = self
            .config
            .columns
            .iter()
            .map(|c| csv_field(&c.header))
            .collect();
        let mut out: String = header.join(",");
        out.push('\n');

        for row in self.visible_rows() {
            let cells: Vec<String> = self
                .config
                .columns
                .iter()
                .map(|c| csv_field(&c.format_cell(row)))
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }

    // --- Bulk actions (confirm-then-execute) ---

    /// Stage a bulk action for confirmation. Nothing is mutated yet. Ignored
    /// while loading, for verbs outside the allowlist, or with nothing
    /// selected.
    pub fn request_bulk(&mut self, action: BulkAction) {
        if self.loading || self.state.selection.is_empty() {
            return;
        }
        if !self.config.bulk_actions.contains(&action) {
            tracing::warn!("Bulk action {:?} not offered for {}", action, self.config.entity);
            return;
        }
        self.pending_bulk = Some(action);
    }

    /// Confirm the staged action: hands back the verb and the selected ids
    /// exactly once, clears the selection, and closes the prompt. The caller
    /// invokes the service and refetches; surfacing a failure is also the
    /// caller's job — the selection is not restored on failure.
    pub fn confirm_bulk(&mut self) -> Option<(BulkAction, Vec<RowId>)> {
        let action: BulkAction = self.pending_bulk.take()?;
        if self.state.selection.is_empty() {
            return None;
        }
        let mut ids: Vec<RowId> = self.state.selection.drain().collect();
        ids.sort();
        Some((action, ids))
    }

    pub fn cancel_bulk(&mut self) {
        self.pending_bulk = None;
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row::ingest_list;
    use serde_json::json;
    use std::time::Duration;

    fn manager() -> DataManager {
        let columns = vec![
            Column::new("Marca", "marca").searchable(),
            Column::new("Estado", "estado").not_sortable(),
        ];
        let mut dm = DataManager::new(DataViewConfig::new("Motos", "motos", columns));
        dm.set_rows(
            ingest_list(&json!([
                {"id": 7, "marca": "Honda"},
                {"id": 8, "marca": "Yamaha"},
                {"id": 9, "marca": "Suzuki"},
                {"id": 10, "marca": "KTM", "activo": false},
                {"id": 11, "marca": "BMW", "eliminado": true},
            ]))
            .rows,
        );
        dm
    }

    fn id(n: u64) -> RowId {
        RowId::new(n.to_string())
    }

    #[test]
    fn test_bulk_confirm_fires_once_and_resets() {
        let mut dm = manager();
        dm.state.toggle_selection(&id(7));
        dm.state.toggle_selection(&id(9));

        dm.request_bulk(BulkAction::Activate);
        assert_eq!(dm.pending_bulk, Some(BulkAction::Activate));

        let (action, ids) = dm.confirm_bulk().unwrap();
        assert_eq!(action, BulkAction::Activate);
        assert_eq!(ids, vec![RowId::new("7"), RowId::new("9")]);

        // selection cleared, prompt closed, nothing left to fire
        assert!(dm.state.selection.is_empty());
        assert!(dm.pending_bulk.is_none());
        assert!(dm.confirm_bulk().is_none());
    }

    #[test]
    fn test_bulk_request_needs_selection() {
        let mut dm = manager();
        dm.request_bulk(BulkAction::Activate);
        assert!(dm.pending_bulk.is_none());
    }

    #[test]
    fn test_bulk_request_ignored_while_loading() {
        let mut dm = manager();
        dm.state.toggle_selection(&id(7));
        dm.set_loading();
        dm.request_bulk(BulkAction::Activate);
        assert!(dm.pending_bulk.is_none());
    }

    #[test]
    fn test_bulk_outside_allowlist_is_dropped() {
        let mut dm = manager();
        dm.config.bulk_actions = vec![BulkAction::Activate];
        dm.state.toggle_selection(&id(7));
        dm.request_bulk(BulkAction::Restore);
        assert!(dm.pending_bulk.is_none());
    }

    #[test]
    fn test_header_select_state_tristate() {
        let mut dm = manager();
        assert_eq!(dm.header_select_state(), SelectState::None);

        dm.state.toggle_selection(&id(7));
        assert_eq!(dm.header_select_state(), SelectState::Partial);

        dm.select_all_visible();
        assert_eq!(dm.header_select_state(), SelectState::All);
    }

    #[test]
    fn test_set_rows_prunes_dead_selection() {
        let mut dm = manager();
        dm.state.toggle_selection(&id(7));
        dm.state.toggle_selection(&id(8));

        dm.set_rows(ingest_list(&json!([{"id": 7, "marca": "Honda"}])).rows);
        assert!(dm.state.selection.contains(&id(7)));
        assert!(!dm.state.selection.contains(&id(8)));
    }

    #[test]
    fn test_sort_hotkey_respects_sortable_flag() {
        let mut dm = manager();
        dm.request_sort_by_column(1); // "Estado" is not sortable
        assert!(dm.state.sort_field.is_none());

        dm.request_sort_by_column(0);
        assert_eq!(dm.state.sort_field.as_deref(), Some("marca"));
    }

    #[test]
    fn test_debounced_search_applies_after_quiet_period() {
        let mut dm = manager();
        let t0 = Instant::now();
        dm.search_push('h', t0);
        dm.search_push('o', t0 + Duration::from_millis(100));

        assert!(!dm.poll_search(t0 + Duration::from_millis(200)));
        assert_eq!(dm.state.search_query, "");

        assert!(dm.poll_search(t0 + Duration::from_millis(400)));
        assert_eq!(dm.state.search_query, "ho");
        assert_eq!(dm.visible_rows().len(), 1); // Honda
    }

    #[test]
    fn test_error_keeps_stale_rows_visible() {
        let mut dm = manager();
        dm.set_error("Error del servidor, intente nuevamente");
        assert!(!dm.rows.is_empty());
        assert!(dm.error.is_some());
        assert!(!dm.visible_rows().is_empty());
    }

    #[test]
    fn test_cursor_clamps_to_visible() {
        let mut dm = manager();
        dm.cursor = Some(2);
        dm.set_view_mode(ViewMode::Deleted); // one visible row
        assert_eq!(dm.cursor, Some(0));
        assert_eq!(dm.row_at_cursor().unwrap().id, id(11));
    }

    #[test]
    fn test_cycle_filter_walks_options_and_wraps() {
        use crate::model::view_state::FilterOption;

        fn brand_is(row: &Row, value: &str) -> bool {
            row.field("marca").and_then(serde_json::Value::as_str) == Some(value)
        }

        let mut dm = manager();
        dm.config.filters = vec![FilterDef {
            key: "marca".into(),
            label: "Marca".into(),
            options: ["all", "Honda", "Yamaha"]
                .into_iter()
                .map(|v| FilterOption {
                    value: v.into(),
                    label: v.into(),
                })
                .collect(),
            apply: Some(brand_is),
        }];

        dm.cycle_filter();
        assert_eq!(dm.state.filters.get("marca").unwrap(), "all");
        assert_eq!(dm.visible_rows().len(), 3); // "all" is inert

        dm.cycle_filter();
        assert_eq!(dm.state.filters.get("marca").unwrap(), "Honda");
        assert_eq!(dm.visible_rows().len(), 1);

        dm.cycle_filter();
        assert_eq!(dm.state.filters.get("marca").unwrap(), "Yamaha");

        // wraps back to the first option
        dm.cycle_filter();
        assert_eq!(dm.state.filters.get("marca").unwrap(), "all");
    }

    #[test]
    fn test_cycle_filter_without_filters_is_noop() {
        let mut dm = manager();
        dm.cycle_filter();
        assert!(dm.state.filters.is_empty());
    }

    #[test]
    fn test_export_csv_covers_only_visible_rows() {
        let dm = manager();
        let csv = dm.export_csv();
        let lines: Vec<&str> = csv.lines().collect();

        // header + the three active rows; inactive/deleted rows stay out
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Marca,Estado");
        assert!(lines[1].starts_with("Honda"));
        assert!(!csv.contains("BMW"));
    }

    #[test]
    fn test_export_csv_quotes_delimiters() {
        assert_eq!(csv_field("Honda, usada"), "\"Honda, usada\"");
        assert_eq!(csv_field("la \"buena\""), "\"la \"\"buena\"\"\"");
        assert_eq!(csv_field("simple"), "simple");
    }

    #[test]
    fn test_actions_column_follows_config() {
        let mut dm = manager();
        assert!(dm.has_actions_column());
        dm.config.actions = ActionsConfig::default();
        assert!(!dm.has_actions_column());
    }
}
