//! src/model/row.rs
//! ============================================================================
//! # Row: Normalized Entity Record
//!
//! Rows arrive from the backend as arbitrary JSON objects. This module is the
//! single ingestion boundary that normalizes them: the opaque `id`, the
//! `activo` enabled flag (missing means enabled), and the soft-delete markers
//! (`eliminado` boolean or `deleted_at` timestamp) are folded into one
//! canonical `deleted` boolean here. Nothing downstream re-derives that union.

use serde_json::{Map, Value};

/// Opaque, stable row identifier. Backend ids may be numbers or strings;
/// both normalize to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        RowId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract an id from a JSON value (string or number), if present.
    pub fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::String(s) => Some(RowId(s.clone())),
            Value::Number(n) => Some(RowId(n.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutually exclusive display bucket of a row. Every row is in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBucket {
    Active,
    Inactive,
    Deleted,
}

/// A normalized entity record: identity and lifecycle flags lifted out,
/// all original fields kept addressable by accessor key.
#[derive(Debug, Clone)]
pub struct Row {
    pub id: RowId,
    /// Soft "enabled" flag; absent in the payload means enabled.
    pub activo: bool,
    /// Canonical soft-delete flag (`eliminado == true` OR `deleted_at` non-null).
    pub deleted: bool,
    /// The full original object, including `id`/`activo`/etc.
    pub fields: Map<String, Value>,
}

impl Row {
    /// Normalize one backend object into a `Row`. Returns `None` for values
    /// that are not objects or carry no usable `id`.
    pub fn from_value(value: &Value) -> Option<Row> {
        let obj: &Map<String, Value> = value.as_object()?;
        let id: RowId = RowId::from_value(obj.get("id")?)?;

        let activo: bool = match obj.get("activo") {
            Some(Value::Bool(b)) => *b,
            // absent or non-boolean defaults to enabled
            _ => true,
        };

        let eliminado: bool = matches!(obj.get("eliminado"), Some(Value::Bool(true)));
        let deleted_at: bool = matches!(obj.get("deleted_at"), Some(v) if !v.is_null());

        Some(Row {
            id,
            activo,
            deleted: eliminado || deleted_at,
            fields: obj.clone(),
        })
    }

    /// The display bucket this row belongs to. Deletion wins over `activo`.
    pub fn bucket(&self) -> RowBucket {
        if self.deleted {
            RowBucket::Deleted
        } else if self.activo {
            RowBucket::Active
        } else {
            RowBucket::Inactive
        }
    }

    /// Look up a field by accessor key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Bucket counts over a raw row set, rendered in the toolbar stats strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub deleted: usize,
}

impl RowStats {
    pub fn of(rows: &[Row]) -> Self {
        let mut stats = RowStats {
            total: rows.len(),
            ..RowStats::default()
        };
        for row in rows {
            match row.bucket() {
                RowBucket::Active => stats.active += 1,
                RowBucket::Inactive => stats.inactive += 1,
                RowBucket::Deleted => stats.deleted += 1,
            }
        }
        stats
    }
}

/// One page of ingested rows plus backend pagination metadata.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub rows: Vec<Row>,
    /// Total count reported by the backend; equals `rows.len()` for bare arrays.
    pub total: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Ingest a backend list response. Supports both the paginated envelope
/// `{count, next, previous, results}` and a bare array (one unpaginated page).
/// Non-object entries and entries without an id are skipped with a warning.
pub fn ingest_list(value: &Value) -> Page {
    let (items, total, next, previous) = match value {
        Value::Array(items) => (items.as_slice(), items.len(), None, None),
        Value::Object(obj) => {
            let items: &[Value] = obj
                .get("results")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let total: usize = obj
                .get("count")
                .and_then(Value::as_u64)
                .map(|n| n as usize)
                .unwrap_or(items.len());
            let next = obj.get("next").and_then(Value::as_str).map(String::from);
            let previous = obj
                .get("previous")
                .and_then(Value::as_str)
                .map(String::from);
            (items, total, next, previous)
        }
        _ => (&[][..], 0, None, None),
    };

    let mut rows: Vec<Row> = Vec::with_capacity(items.len());
    for item in items {
        match Row::from_value(item) {
            Some(row) => rows.push(row),
            None => tracing::warn!("Skipping list entry without usable id: {item}"),
        }
    }

    Page {
        rows,
        total,
        next,
        previous,
    }
}
