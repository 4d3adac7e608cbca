//! src/model/view_state.rs
//! ============================================================================
//! # ViewState: Pure Derivation of the Visible Row Set
//!
//! Holds view mode, free-text search, column filters, sort key/direction, and
//! the multi-select selection set. `derive_visible_rows` is a pure function:
//! view-mode bucket → search → custom filters → stable sort, deterministic for
//! identical inputs and never touching the raw row collection.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::model::column::{Column, coerce_display, parse_temporal};
use crate::model::row::{Row, RowBucket, RowId};

/// Coarse, mutually-partitioning filter applied before search/custom filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Active,
    Inactive,
    Deleted,
    All,
}

impl ViewMode {
    pub const ALL_MODES: [ViewMode; 4] = [
        ViewMode::Active,
        ViewMode::Inactive,
        ViewMode::Deleted,
        ViewMode::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Active => "Activos",
            ViewMode::Inactive => "Inactivos",
            ViewMode::Deleted => "Papelera",
            ViewMode::All => "Todos",
        }
    }

    fn admits(self, row: &Row) -> bool {
        match self {
            ViewMode::Active => row.bucket() == RowBucket::Active,
            ViewMode::Inactive => row.bucket() == RowBucket::Inactive,
            ViewMode::Deleted => row.bucket() == RowBucket::Deleted,
            ViewMode::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One selectable option of a custom filter.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

/// Caller-declared custom filter. A filter whose `apply` is `None` is inert.
#[derive(Debug, Clone)]
pub struct FilterDef {
    pub key: String,
    pub label: String,
    pub options: Vec<FilterOption>,
    pub apply: Option<fn(&Row, &str) -> bool>,
}

/// All business view state owned by one DataManager instance.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub view_mode: ViewMode,
    pub search_query: String,
    /// Active custom filter values keyed by `FilterDef::key`.
    pub filters: HashMap<String, String>,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub selection: HashSet<RowId>,
}

impl ViewState {
    pub fn new(default_mode: ViewMode) -> Self {
        ViewState {
            view_mode: default_mode,
            search_query: String::new(),
            filters: HashMap::new(),
            sort_field: None,
            sort_direction: SortDirection::Asc,
            selection: HashSet::new(),
        }
    }

    /// Switch view mode. Selection is cleared; search and filters persist.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_mode = mode;
            self.selection.clear();
        }
    }

    /// Sort cycle: a new field starts ascending, the same field toggles.
    pub fn request_sort(&mut self, field: &str) {
        if self.sort_field.as_deref() == Some(field) {
            self.sort_direction = match self.sort_direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
        } else {
            self.sort_field = Some(field.to_string());
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn toggle_selection(&mut self, id: &RowId) {
        if !self.selection.remove(id) {
            self.selection.insert(id.clone());
        }
    }

    pub fn select_all(&mut self, visible: &[&Row]) {
        self.selection = visible.iter().map(|r| r.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(ViewMode::Active)
    }
}

/// Derive the rows to render. Pure: no side effects, no mutation of `rows`,
/// identical inputs yield identical output content and order.
pub fn derive_visible_rows<'a>(
    rows: &'a [Row],
    state: &ViewState,
    columns: &[Column],
    filter_defs: &[FilterDef],
) -> Vec<&'a Row> {
    let query: String = state.search_query.trim().to_lowercase();

    let mut visible: Vec<&Row> = rows
        .iter()
        .filter(|row| state.view_mode.admits(row))
        .filter(|row| query.is_empty() || matches_search(row, columns, &query))
        .filter(|row| passes_filters(row, state, filter_defs))
        .collect();

    if let Some(field) = state.sort_field.as_deref() {
        // Vec::sort_by is stable, so equal keys keep their original order.
        visible.sort_by(|a, b| {
            let ord: Ordering = compare_values(a.field(field), b.field(field));
            match state.sort_direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    visible
}

/// A row matches when any searchable column with an accessor contains the
/// query as a case-insensitive substring of its coerced value.
fn matches_search(row: &Row, columns: &[Column], query: &str) -> bool {
    columns
        .iter()
        .filter(|col| col.searchable)
        .filter_map(|col| col.accessor.as_deref())
        .filter_map(|key| row.field(key))
        .any(|value| coerce_display(value).to_lowercase().contains(query))
}

/// Apply every active custom filter. The literal value `"all"` and empty
/// values are inert; unknown keys and filters without a predicate are
/// ignored (no-op, not an error).
fn passes_filters(row: &Row, state: &ViewState, filter_defs: &[FilterDef]) -> bool {
    state.filters.iter().all(|(key, value)| {
        if value.is_empty() || value == "all" {
            return true;
        }
        match filter_defs.iter().find(|def| &def.key == key) {
            Some(def) => match def.apply {
                Some(apply) => apply(row, value),
                None => true,
            },
            None => true,
        }
    })
}

/// Natural comparison: nulls sort after everything (and equal among
/// themselves), numbers numerically, strings chronologically when both parse
/// as dates, lexicographically otherwise.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::String(x), Value::String(y)) => {
                match (parse_temporal(x), parse_temporal(y)) {
                    (Some(dx), Some(dy)) => dx.cmp(&dy),
                    _ => x.cmp(y),
                }
            }
            _ => coerce_display(a).cmp(&coerce_display(b)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row::ingest_list;
    use serde_json::json;

    fn sample_rows() -> Vec<Row> {
        ingest_list(&json!([
            {"id": 1, "marca": "Honda abc", "kilometraje": 5},
            {"id": 2, "marca": "Yamaha", "kilometraje": null},
            {"id": 3, "marca": "abcdef", "kilometraje": 1},
            {"id": 4, "marca": "Suzuki ABC", "kilometraje": 9},
            {"id": 5, "marca": "Kawasaki", "kilometraje": 9},
            {"id": 6, "marca": "Ducati", "kilometraje": 2},
            {"id": 7, "marca": "BMW", "activo": false},
            {"id": 8, "marca": "KTM", "activo": false},
            {"id": 9, "marca": "Triumph", "eliminado": true},
            {"id": 10, "marca": "Benelli", "deleted_at": "2026-04-01T10:00:00Z"},
        ]))
        .rows
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Marca", "marca").searchable(),
            Column::new("Kilometraje", "kilometraje"),
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn test_view_modes_partition_rows() {
        let rows = sample_rows();
        let cols = columns();
        let mut state = ViewState::default();

        state.view_mode = ViewMode::Active;
        let active = derive_visible_rows(&rows, &state, &cols, &[]).len();
        state.view_mode = ViewMode::Inactive;
        let inactive = derive_visible_rows(&rows, &state, &cols, &[]).len();
        state.view_mode = ViewMode::Deleted;
        let deleted = derive_visible_rows(&rows, &state, &cols, &[]).len();
        state.view_mode = ViewMode::All;
        let all = derive_visible_rows(&rows, &state, &cols, &[]).len();

        assert_eq!(active, 6);
        assert_eq!(inactive, 2);
        assert_eq!(deleted, 2);
        assert_eq!(all, active + inactive + deleted);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let rows = sample_rows();
        let cols = columns();
        let mut state = ViewState::default();
        state.search_query = "a".into();
        state.sort_field = Some("marca".into());

        let first = ids(&derive_visible_rows(&rows, &state, &cols, &[]));
        let second = ids(&derive_visible_rows(&rows, &state, &cols, &[]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_matches_only_searchable_columns() {
        // "abc" appears (case-insensitively) in marca of rows 1, 3, 4 among
        // the six active rows.
        let rows = sample_rows();
        let cols = columns();
        let mut state = ViewState::default();
        state.search_query = "abc".into();

        let visible = derive_visible_rows(&rows, &state, &cols, &[]);
        assert_eq!(ids(&visible), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_search_ignores_unsearchable_values() {
        let rows = sample_rows();
        let cols = columns();
        let mut state = ViewState::default();
        // "9" matches kilometraje values, but that column is not searchable.
        state.search_query = "9".into();
        assert!(derive_visible_rows(&rows, &state, &cols, &[]).is_empty());
    }

    #[test]
    fn test_null_sorts_last_ascending() {
        let rows = ingest_list(&json!([
            {"id": 1, "v": 5},
            {"id": 2, "v": null},
            {"id": 3, "v": 1},
        ]))
        .rows;
        let cols = vec![Column::new("V", "v")];
        let mut state = ViewState::default();
        state.sort_field = Some("v".into());

        let visible = derive_visible_rows(&rows, &state, &cols, &[]);
        assert_eq!(ids(&visible), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_sort_is_stable_on_equal_keys() {
        let rows = ingest_list(&json!([
            {"id": 1, "v": 7},
            {"id": 2, "v": 7},
            {"id": 3, "v": 7},
        ]))
        .rows;
        let cols = vec![Column::new("V", "v")];
        let mut state = ViewState::default();
        state.sort_field = Some("v".into());

        let asc = ids(&derive_visible_rows(&rows, &state, &cols, &[]));
        state.sort_direction = SortDirection::Desc;
        let desc = ids(&derive_visible_rows(&rows, &state, &cols, &[]));
        assert_eq!(asc, vec!["1", "2", "3"]);
        assert_eq!(desc, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_desc_reverses_asc_for_distinct_keys() {
        let rows = ingest_list(&json!([
            {"id": 1, "v": 5},
            {"id": 2, "v": 2},
            {"id": 3, "v": 9},
        ]))
        .rows;
        let cols = vec![Column::new("V", "v")];
        let mut state = ViewState::default();
        state.sort_field = Some("v".into());

        let asc = ids(&derive_visible_rows(&rows, &state, &cols, &[]));
        state.sort_direction = SortDirection::Desc;
        let mut desc = ids(&derive_visible_rows(&rows, &state, &cols, &[]));
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_string_dates_sort_chronologically() {
        let rows = ingest_list(&json!([
            {"id": 1, "fecha": "2026-02-01"},
            {"id": 2, "fecha": "2025-12-31"},
            {"id": 3, "fecha": "2026-01-15"},
        ]))
        .rows;
        let cols = vec![Column::new("Fecha", "fecha")];
        let mut state = ViewState::default();
        state.sort_field = Some("fecha".into());

        let visible = derive_visible_rows(&rows, &state, &cols, &[]);
        assert_eq!(ids(&visible), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_filters_all_and_unknown_keys_are_inert() {
        fn brand_is(row: &Row, value: &str) -> bool {
            row.field("marca").and_then(Value::as_str) == Some(value)
        }
        let rows = sample_rows();
        let cols = columns();
        let defs = vec![FilterDef {
            key: "marca".into(),
            label: "Marca".into(),
            options: vec![],
            apply: Some(brand_is),
        }];

        let mut state = ViewState::default();
        state.filters.insert("marca".into(), "all".into());
        state.filters.insert("desconocido".into(), "x".into());
        assert_eq!(derive_visible_rows(&rows, &state, &cols, &defs).len(), 6);

        state.filters.insert("marca".into(), "Yamaha".into());
        assert_eq!(ids(&derive_visible_rows(&rows, &state, &cols, &defs)), vec!["2"]);
    }

    #[test]
    fn test_selection_clears_on_view_mode_change() {
        let rows = sample_rows();
        let mut state = ViewState::default();
        state.toggle_selection(&rows[0].id);
        state.toggle_selection(&rows[1].id);
        assert_eq!(state.selection.len(), 2);

        state.set_view_mode(ViewMode::Deleted);
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_same_view_mode_keeps_selection() {
        let rows = sample_rows();
        let mut state = ViewState::default();
        state.toggle_selection(&rows[0].id);
        state.set_view_mode(ViewMode::Active);
        assert_eq!(state.selection.len(), 1);
    }

    #[test]
    fn test_toggle_selection_round_trip() {
        let rows = sample_rows();
        let mut state = ViewState::default();
        state.toggle_selection(&rows[0].id);
        assert!(state.selection.contains(&rows[0].id));
        state.toggle_selection(&rows[0].id);
        assert!(!state.selection.contains(&rows[0].id));
    }

    #[test]
    fn test_sort_cycle_toggles_direction() {
        let mut state = ViewState::default();
        state.request_sort("marca");
        assert_eq!(state.sort_field.as_deref(), Some("marca"));
        assert_eq!(state.sort_direction, SortDirection::Asc);

        state.request_sort("marca");
        assert_eq!(state.sort_direction, SortDirection::Desc);

        // a new field resets to ascending
        state.request_sort("kilometraje");
        assert_eq!(state.sort_field.as_deref(), Some("kilometraje"));
        assert_eq!(state.sort_direction, SortDirection::Asc);
    }
}
