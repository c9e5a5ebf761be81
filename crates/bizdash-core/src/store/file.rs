use super::{delete_row, insert_row, update_row, Query, Store};
use crate::error::{DashError, Result};
use crate::types::Table;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Local backend: one JSON array per table under `dir`, rewritten atomically
/// on every mutation.
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn open(dir: &Path) -> Result<Self> {
        crate::io::ensure_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.dir.join(format!("{}.json", table.as_str()))
    }

    fn load(&self, table: Table) -> Result<Vec<Value>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&data)? {
            Value::Array(rows) => Ok(rows),
            _ => Err(DashError::MalformedRow(format!(
                "{} does not hold a JSON array",
                path.display()
            ))),
        }
    }

    fn save(&self, table: Table, rows: &[Value]) -> Result<()> {
        let data = serde_json::to_string_pretty(rows)?;
        crate::io::atomic_write(&self.table_path(table), data.as_bytes())
    }

    fn mutate<T>(&self, table: Table, f: impl FnOnce(&mut Vec<Value>) -> Result<T>) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut rows = self.load(table)?;
        let out = f(&mut rows)?;
        self.save(table, &rows)?;
        Ok(out)
    }
}

impl Store for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        Ok(query.apply(&self.load(table)?))
    }

    fn insert(&self, table: Table, row: Value) -> Result<Value> {
        self.mutate(table, |rows| insert_row(rows, row))
    }

    fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value> {
        self.mutate(table, |rows| update_row(rows, table, id, patch))
    }

    fn delete(&self, table: Table, id: &str) -> Result<()> {
        self.mutate(table, |rows| delete_row(rows, table, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn rows_persist_across_instances() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = FileStore::open(dir.path()).unwrap();
            let row = store
                .insert(Table::Associations, json!({"name": "Chamber of Commerce"}))
                .unwrap();
            row["id"].as_str().unwrap().to_string()
        };
        let store = FileStore::open(dir.path()).unwrap();
        let rows = store.select(Table::Associations, &Query::all()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], id.as_str());
        assert!(dir.path().join("associations.json").exists());
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.insert(Table::Rocks, json!({"title": "a"})).unwrap();
        let before = std::fs::read_to_string(store.table_path(Table::Rocks)).unwrap();
        assert!(store.delete(Table::Rocks, "missing").is_err());
        let after = std::fs::read_to_string(store.table_path(Table::Rocks)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn non_array_file_is_malformed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("issues.json"), "{}").unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.select(Table::Issues, &Query::all()),
            Err(DashError::MalformedRow(_))
        ));
    }
}
