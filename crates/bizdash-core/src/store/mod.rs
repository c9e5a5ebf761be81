//! Backend access. Rows travel as JSON objects; typing happens in
//! [`crate::repository`].

mod file;
mod memory;
mod rest;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::config::BackendConfig;
use crate::error::{DashError, Result};
use crate::types::Table;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

impl Op {
    /// PostgREST operator prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Gte => "gte",
            Op::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: Op,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// Select parameters understood by every backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op: Op::Eq,
            value: value.to_string(),
        });
        self
    }

    pub fn gte(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op: Op::Gte,
            value: value.to_string(),
        });
        self
    }

    pub fn lte(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op: Op::Lte,
            value: value.to_string(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Evaluate the filters against one row. Used by the local backends.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| {
            let Some(cell) = row.get(&f.column).map(cell_text) else {
                return false;
            };
            let ord = compare_text(&cell, &f.value);
            match f.op {
                Op::Eq => ord == Ordering::Equal,
                Op::Gte => ord != Ordering::Less,
                Op::Lte => ord != Ordering::Greater,
            }
        })
    }

    /// Filter, order and limit a table held in memory.
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        let mut out: Vec<Value> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        if let Some(order) = &self.order {
            out.sort_by(|a, b| {
                let ord = match (a.get(&order.column), b.get(&order.column)) {
                    (Some(x), Some(y)) if !x.is_null() && !y.is_null() => {
                        compare_text(&cell_text(x), &cell_text(y))
                    }
                    // Nulls sort last in both directions.
                    (Some(x), _) if !x.is_null() => return Ordering::Less,
                    (_, Some(y)) if !y.is_null() => return Ordering::Greater,
                    _ => Ordering::Equal,
                };
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        if let Some(n) = self.limit {
            out.truncate(n);
        }
        out
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Numeric comparison when both sides are numbers, lexicographic otherwise.
/// ISO dates compare correctly either way.
fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The generic select/insert/update/delete surface of the backend.
pub trait Store: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>>;

    /// Insert a row and return it as stored (with its assigned `id`).
    fn insert(&self, table: Table, row: Value) -> Result<Value>;

    /// Merge `patch` into the row with `id` and return the updated row.
    fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value>;

    fn delete(&self, table: Table, id: &str) -> Result<()>;
}

/// Build the backend named by the config.
pub fn open_store(backend: &BackendConfig) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match backend {
        BackendConfig::Rest {
            url,
            api_key,
            timeout_secs,
        } => Arc::new(RestStore::new(url, api_key, *timeout_secs)?),
        BackendConfig::File { dir } => Arc::new(FileStore::open(dir)?),
        BackendConfig::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!(backend = store.name(), "opened store");
    Ok(store)
}

// ---------------------------------------------------------------------------
// Shared row helpers for the local backends
// ---------------------------------------------------------------------------

pub(crate) fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

pub(crate) fn insert_row(rows: &mut Vec<Value>, mut row: Value) -> Result<Value> {
    let obj = row
        .as_object_mut()
        .ok_or_else(|| DashError::MalformedRow("insert expects a JSON object".into()))?;
    let has_id = obj.get("id").and_then(Value::as_str).is_some();
    if !has_id {
        obj.insert(
            "id".to_string(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );
    }
    rows.push(row.clone());
    Ok(row)
}

pub(crate) fn update_row(rows: &mut [Value], table: Table, id: &str, patch: Value) -> Result<Value> {
    let Value::Object(patch) = patch else {
        return Err(DashError::MalformedRow("update expects a JSON object".into()));
    };
    let row = rows
        .iter_mut()
        .find(|r| row_id(r) == Some(id))
        .ok_or_else(|| DashError::not_found(table.as_str(), id))?;
    if let Value::Object(existing) = &mut *row {
        for (k, v) in patch {
            if k != "id" {
                existing.insert(k, v);
            }
        }
    }
    Ok(row.clone())
}

pub(crate) fn delete_row(rows: &mut Vec<Value>, table: Table, id: &str) -> Result<()> {
    let before = rows.len();
    rows.retain(|r| row_id(r) != Some(id));
    if rows.len() == before {
        return Err(DashError::not_found(table.as_str(), id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": "a", "year": 2024, "event_date": "2025-03-01", "owner": "Kim"}),
            json!({"id": "b", "year": 2025, "event_date": "2025-02-10", "owner": "Lee"}),
            json!({"id": "c", "year": 2025, "event_date": null, "owner": "Kim"}),
        ]
    }

    #[test]
    fn eq_filter_compares_numbers_and_strings() {
        let out = Query::all().eq("year", 2025).apply(&rows());
        assert_eq!(out.len(), 2);
        let out = Query::all().eq("owner", "Kim").eq("year", 2024).apply(&rows());
        assert_eq!(out.len(), 1);
        assert_eq!(row_id(&out[0]), Some("a"));
    }

    #[test]
    fn range_filter_on_dates() {
        let out = Query::all()
            .gte("event_date", "2025-02-01")
            .lte("event_date", "2025-02-28")
            .apply(&rows());
        assert_eq!(out.len(), 1);
        assert_eq!(row_id(&out[0]), Some("b"));
    }

    #[test]
    fn order_puts_nulls_last() {
        let out = Query::all().order_by("event_date", false).apply(&rows());
        let ids: Vec<_> = out.iter().filter_map(row_id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        let out = Query::all().order_by("event_date", true).apply(&rows());
        let ids: Vec<_> = out.iter().filter_map(row_id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn limit_truncates() {
        assert_eq!(Query::all().limit(2).apply(&rows()).len(), 2);
    }

    #[test]
    fn missing_column_never_matches() {
        assert!(Query::all().eq("stage", "won").apply(&rows()).is_empty());
    }

    #[test]
    fn insert_assigns_id_and_update_merges() {
        let mut table = Vec::new();
        let row = insert_row(&mut table, json!({"title": "x"})).unwrap();
        let id = row_id(&row).unwrap().to_string();
        let updated = update_row(&mut table, Table::Issues, &id, json!({"title": "y", "id": "zzz"}))
            .unwrap();
        assert_eq!(updated["title"], "y");
        assert_eq!(row_id(&updated), Some(id.as_str()));
    }

    #[test]
    fn delete_missing_row_is_not_found() {
        let mut table = rows();
        assert!(delete_row(&mut table, Table::Rocks, "a").is_ok());
        assert!(matches!(
            delete_row(&mut table, Table::Rocks, "a"),
            Err(DashError::NotFound { .. })
        ));
    }
}
