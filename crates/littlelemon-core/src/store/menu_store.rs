use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::{debug, warn};

use crate::models::MenuItem;

use super::StorageError;

const CREATE_MENU_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS menuitems (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        price TEXT,
        description TEXT,
        image TEXT,
        category TEXT
    );
";

const SELECT_COLUMNS: &str = "SELECT id, name, price, description, image, category FROM menuitems";

/// The local menu table.
///
/// One connection guarded by a mutex; SQLite serializes writers anyway.
pub struct MenuStore {
    conn: Mutex<Connection>,
}

impl MenuStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// In-memory database, gone when the store is dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        register_fold(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Create the menu table if it does not exist. Safe to call on every start.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        self.conn()?.execute_batch(CREATE_MENU_TABLE)?;
        Ok(())
    }

    /// Insert every item as a new row and return the assigned ids in input order.
    ///
    /// Any `id` already set on an item is ignored. The batch is a single
    /// transaction: either every row is inserted or none is.
    pub fn insert_all(&self, items: &[MenuItem]) -> Result<Vec<i64>, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(items.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO menuitems (name, price, description, image, category) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for item in items {
                stmt.execute(params![
                    item.name,
                    item.price,
                    item.description,
                    item.image,
                    item.category
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }

        tx.commit()?;
        debug!(count = ids.len(), "Menu items inserted");
        Ok(ids)
    }

    /// Every row, in insertion order.
    pub fn select_all(&self) -> Result<Vec<MenuItem>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM menuitems", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Rows whose category is one of `categories` and whose name contains
    /// `query`, both compared case-insensitively.
    ///
    /// An empty category set matches nothing. Failures are logged and
    /// reported as an empty result.
    pub fn select_by_categories(&self, categories: &BTreeSet<String>, query: &str) -> Vec<MenuItem> {
        match self.try_select_by_categories(categories, query) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, ?categories, query, "Filtered menu query failed, showing nothing");
                Vec::new()
            }
        }
    }

    fn try_select_by_categories(
        &self,
        categories: &BTreeSet<String>,
        query: &str,
    ) -> Result<Vec<MenuItem>, StorageError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; categories.len()].join(", ");
        // instr() rather than LIKE so '%' and '_' in the query match literally
        let sql = format!(
            "{} WHERE fold(category) IN ({}) AND instr(fold(name), ?) > 0 ORDER BY id",
            SELECT_COLUMNS, placeholders
        );

        let folded_query = query.to_lowercase();
        let bound = categories
            .iter()
            .map(|c| c.to_lowercase())
            .chain(std::iter::once(folded_query));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(bound), row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

/// `fold(text)`: the same Unicode lower-casing the bound parameters get in
/// Rust. SQLite's built-in `lower()` only folds ASCII.
fn register_fold(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
    )
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<MenuItem> {
    Ok(MenuItem {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        price: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        image: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        category: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}

// ============================================================================
// Tests
// ============================================================================
