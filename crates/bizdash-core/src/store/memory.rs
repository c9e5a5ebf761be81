use super::{delete_row, insert_row, update_row, Query, Store};
use crate::error::Result;
use crate::types::Table;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process backend. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<T>(&self, table: Table, f: impl FnOnce(&mut Vec<Value>) -> T) -> T {
        let mut guard = self
            .tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(guard.entry(table).or_default())
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        Ok(self.with_table(table, |rows| query.apply(rows)))
    }

    fn insert(&self, table: Table, row: Value) -> Result<Value> {
        self.with_table(table, |rows| insert_row(rows, row))
    }

    fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value> {
        self.with_table(table, |rows| update_row(rows, table, id, patch))
    }

    fn delete(&self, table: Table, id: &str) -> Result<()> {
        self.with_table(table, |rows| delete_row(rows, table, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tables_are_isolated() {
        let store = MemoryStore::new();
        store.insert(Table::Issues, json!({"title": "a"})).unwrap();
        assert_eq!(store.select(Table::Issues, &Query::all()).unwrap().len(), 1);
        assert!(store.select(Table::Rocks, &Query::all()).unwrap().is_empty());
    }

    #[test]
    fn update_then_select_sees_change() {
        let store = MemoryStore::new();
        let row = store
            .insert(Table::SalesTargets, json!({"company": "Acme", "stage": "prospect"}))
            .unwrap();
        let id = row["id"].as_str().unwrap();
        store
            .update(Table::SalesTargets, id, json!({"stage": "won"}))
            .unwrap();
        let won = store
            .select(Table::SalesTargets, &Query::all().eq("stage", "won"))
            .unwrap();
        assert_eq!(won.len(), 1);
        assert_eq!(won[0]["company"], "Acme");
    }
}
