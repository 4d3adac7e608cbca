//! src/model/column.rs
//! ============================================================================
//! # Column: Declarative Column Spec and Cell Formatting
//!
//! Callers declare columns once per view; they are immutable for the lifetime
//! of one DataManager. Cell rendering dispatches over a closed `CellKind`
//! tagged union so the match is total; a column's custom `render` hook always
//! takes precedence over kind-based formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::model::row::{Row, RowBucket};

/// Closed set of built-in cell formatters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellKind {
    /// Plain string coercion.
    #[default]
    Text,
    /// Row lifecycle badge (Activo/Inactivo/Eliminado), derived from the row.
    Status,
    /// Sí/No.
    Boolean,
    /// Locale-style `dd/mm/yyyy`, `-` when null or unparsable.
    Date,
    /// `dd/mm/yyyy HH:MM`, `-` when null or unparsable.
    DateTime,
    /// Fixed two decimals with a `$` prefix, `-` when null.
    Currency,
    /// Thousands-grouped, `-` when null.
    Number,
}

/// Custom cell renderer: receives the accessed value (if any) and the row.
pub type CellRender = fn(Option<&Value>, &Row) -> String;

/// One declared column of a data view.
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    /// Field key this column reads; `None` for purely computed columns.
    pub accessor: Option<String>,
    /// Sortable by header click/hotkey. Defaults to true.
    pub sortable: bool,
    /// Participates in free-text search matching. Defaults to false.
    pub searchable: bool,
    pub kind: CellKind,
    /// Takes precedence over `kind` when set.
    pub render: Option<CellRender>,
}

impl Column {
    pub fn new(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        Column {
            header: header.into(),
            accessor: Some(accessor.into()),
            sortable: true,
            searchable: false,
            kind: CellKind::Text,
            render: None,
        }
    }

    /// A column with no accessor (e.g. computed/status columns).
    pub fn computed(header: impl Into<String>) -> Self {
        Column {
            header: header.into(),
            accessor: None,
            sortable: false,
            searchable: false,
            kind: CellKind::Text,
            render: None,
        }
    }

    pub fn kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn render_with(mut self, render: CellRender) -> Self {
        self.render = Some(render);
        self
    }

    /// Format this column's cell for one row.
    pub fn format_cell(&self, row: &Row) -> String {
        let value: Option<&Value> = self
            .accessor
            .as_deref()
            .and_then(|key| row.field(key))
            .filter(|v| !v.is_null());

        if let Some(render) = self.render {
            return render(value, row);
        }

        match self.kind {
            CellKind::Text => value.map(coerce_display).unwrap_or_else(|| "-".into()),
            CellKind::Status => status_badge(row).to_string(),
            CellKind::Boolean => match value.and_then(Value::as_bool) {
                Some(true) => "Sí".into(),
                Some(false) => "No".into(),
                None => "-".into(),
            },
            CellKind::Date => value
                .and_then(Value::as_str)
                .and_then(parse_temporal)
                .map(|dt| dt.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "-".into()),
            CellKind::DateTime => value
                .and_then(Value::as_str)
                .and_then(parse_temporal)
                .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
            CellKind::Currency => value
                .and_then(Value::as_f64)
                .map(|n| format!("${n:.2}"))
                .unwrap_or_else(|| "-".into()),
            CellKind::Number => value
                .and_then(Value::as_f64)
                .map(group_thousands)
                .unwrap_or_else(|| "-".into()),
        }
    }
}

/// Lifecycle badge text for a row.
pub fn status_badge(row: &Row) -> &'static str {
    match row.bucket() {
        RowBucket::Active => "Activo",
        RowBucket::Inactive => "Inactivo",
        RowBucket::Deleted => "Eliminado",
    }
}

/// Coerce any JSON value to its display string (search matching uses this too).
pub fn coerce_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Parse a temporal string in the formats the backend emits: RFC 3339,
/// `YYYY-MM-DDTHH:MM:SS`, or a bare `YYYY-MM-DD`.
pub fn parse_temporal(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// Group integer digits in threes; a nonzero fractional part keeps two
/// digits, matching the backend's decimal fields. The value is rounded once
/// up front so a fractional carry propagates into the integer digits.
fn group_thousands(n: f64) -> String {
    let cents: u128 = (n.abs() * 100.0).round() as u128;
    let int_part: u128 = cents / 100;
    let frac: u128 = cents % 100;

    let digits: String = int_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if n < 0.0 && cents > 0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac > 0 {
        out.push_str(&format!(".{frac:02}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        Row::from_value(&value).unwrap()
    }

    #[test]
    fn test_text_null_renders_dash() {
        let col = Column::new("Marca", "marca");
        assert_eq!(col.format_cell(&row(json!({"id": 1, "marca": null}))), "-");
        assert_eq!(col.format_cell(&row(json!({"id": 1}))), "-");
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "marca": "Honda"}))),
            "Honda"
        );
    }

    #[test]
    fn test_currency_two_decimals() {
        let col = Column::new("Costo", "costo").kind(CellKind::Currency);
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "costo": 1250.5}))),
            "$1250.50"
        );
        assert_eq!(col.format_cell(&row(json!({"id": 1, "costo": null}))), "-");
    }

    #[test]
    fn test_date_formats_and_falls_back() {
        let col = Column::new("Fecha", "fecha").kind(CellKind::Date);
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "fecha": "2026-03-15"}))),
            "15/03/2026"
        );
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "fecha": "no es fecha"}))),
            "-"
        );
    }

    #[test]
    fn test_datetime_format() {
        let col = Column::new("Creado", "created_at").kind(CellKind::DateTime);
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "created_at": "2026-03-15T09:30:00"}))),
            "15/03/2026 09:30"
        );
    }

    #[test]
    fn test_number_groups_thousands() {
        let col = Column::new("Km", "kilometraje").kind(CellKind::Number);
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "kilometraje": 1234567}))),
            "1,234,567"
        );
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "kilometraje": 950}))),
            "950"
        );
    }

    #[test]
    fn test_number_rounding_carries_into_integer_digits() {
        let col = Column::new("Km", "kilometraje").kind(CellKind::Number);
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "kilometraje": 949.999}))),
            "950"
        );
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "kilometraje": 999.999}))),
            "1,000"
        );
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "kilometraje": 1234.567}))),
            "1,234.57"
        );
    }

    #[test]
    fn test_status_badge_tracks_bucket() {
        let col = Column::computed("Estado").kind(CellKind::Status);
        assert_eq!(col.format_cell(&row(json!({"id": 1}))), "Activo");
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "activo": false}))),
            "Inactivo"
        );
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "eliminado": true}))),
            "Eliminado"
        );
    }

    #[test]
    fn test_custom_render_wins_over_kind() {
        fn shout(value: Option<&Value>, _row: &Row) -> String {
            value
                .map(coerce_display)
                .unwrap_or_default()
                .to_uppercase()
        }
        let col = Column::new("Marca", "marca")
            .kind(CellKind::Currency)
            .render_with(shout);
        assert_eq!(
            col.format_cell(&row(json!({"id": 1, "marca": "honda"}))),
            "HONDA"
        );
    }
}
