//! Order persistence - orders plus their append-only history
//!
//! [`SqliteOrderStore`] keeps both tables in one SQLite database. Status
//! transitions go through [`OrderStore::commit_transition`], which re-reads
//! the order inside an immediate write transaction so two concurrent
//! transitions cannot both validate against the same stale status.

mod serialize;

#[cfg(test)]
mod tests;

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::entities::{HistoryEntry, Order};
pub use serialize::{format_timestamp, parse_timestamp};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already exists: {0}")]
    DuplicateOrder(String),

    #[error("History entry for {0} has no new status")]
    MissingNewStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Order persistence used by the status service
pub trait OrderStore: Send + Sync {
    /// Persist a new order together with its creation history row
    fn insert_order(&self, order: &Order) -> Result<(), StoreError>;

    fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError>;

    /// All orders, newest first
    fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// History rows for an order, oldest first
    fn history(&self, order_id: &str) -> Result<Vec<HistoryEntry>, StoreError>;

    fn set_assignee(&self, order_id: &str, assignee: Option<&str>) -> Result<Order, StoreError>;

    /// Atomically apply a status transition
    ///
    /// Inside one write transaction: read the current order, hand it to
    /// `check`, then write the returned entry's `new_status` and `timestamp`
    /// to the order and append the entry. An error from `check` or from
    /// either write leaves both tables untouched.
    fn commit_transition<E, F>(&self, order_id: &str, check: F) -> Result<(Order, HistoryEntry), E>
    where
        E: From<StoreError>,
        F: FnOnce(&Order) -> Result<HistoryEntry, E>;
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    po_number TEXT NOT NULL,
    customer_name TEXT NOT NULL,
    order_status TEXT NOT NULL,
    created_by TEXT NOT NULL,
    current_assignee TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_history (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    order_id TEXT NOT NULL REFERENCES orders(id),
    user_id TEXT NOT NULL,
    action TEXT NOT NULL,
    old_status TEXT,
    new_status TEXT,
    notes TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_history_order
    ON order_history(order_id, timestamp, seq);
"#;

const ORDER_COLUMNS: &str = "id, po_number, customer_name, order_status, created_by, \
     current_assignee, created_at, updated_at";

const HISTORY_COLUMNS: &str =
    "id, order_id, user_id, action, old_status, new_status, notes, timestamp";

/// SQLite-backed order store
pub struct SqliteOrderStore {
    conn: Mutex<Connection>,
}

impl SqliteOrderStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        // Writers wait for each other instead of failing immediately
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn read_order(conn: &Connection, id: &str) -> Result<Option<Order>, StoreError> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let order = conn
            .query_row(&sql, params![id], order_from_row)
            .optional()?;
        Ok(order)
    }

    fn append_history(conn: &Connection, entry: &HistoryEntry) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO order_history ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            HISTORY_COLUMNS
        );
        conn.execute(
            &sql,
            params![
                entry.id,
                entry.order_id,
                entry.user_id,
                entry.action,
                entry.old_status,
                entry.new_status,
                entry.notes,
                format_timestamp(&entry.timestamp),
            ],
        )?;
        Ok(())
    }
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(Order {
        id: row.get(0)?,
        po_number: row.get(1)?,
        customer_name: row.get(2)?,
        order_status: row.get(3)?,
        created_by: row.get(4)?,
        current_assignee: row.get(5)?,
        created_at: parse_timestamp(6, &created_at)?,
        updated_at: parse_timestamp(7, &updated_at)?,
    })
}

fn history_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    let timestamp: String = row.get(7)?;
    Ok(HistoryEntry {
        id: row.get(0)?,
        order_id: row.get(1)?,
        user_id: row.get(2)?,
        action: row.get(3)?,
        old_status: row.get(4)?,
        new_status: row.get(5)?,
        notes: row.get(6)?,
        timestamp: parse_timestamp(7, &timestamp)?,
    })
}

impl OrderStore for SqliteOrderStore {
    fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if Self::read_order(&tx, &order.id)?.is_some() {
            return Err(StoreError::DuplicateOrder(order.id.clone()));
        }

        let sql = format!(
            "INSERT INTO orders ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            ORDER_COLUMNS
        );
        tx.execute(
            &sql,
            params![
                order.id,
                order.po_number,
                order.customer_name,
                order.order_status,
                order.created_by,
                order.current_assignee,
                format_timestamp(&order.created_at),
                format_timestamp(&order.updated_at),
            ],
        )?;
        Self::append_history(&tx, &HistoryEntry::order_created(order))?;
        tx.commit()?;

        tracing::debug!(order = %order.id, "order inserted");
        Ok(())
    }

    fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        let conn = self.get_conn()?;
        Self::read_order(&conn, id)
    }

    fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, id",
            ORDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map([], order_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    fn history(&self, order_id: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM order_history WHERE order_id = ?1 ORDER BY timestamp, seq",
            HISTORY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![order_id], history_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn set_assignee(&self, order_id: &str, assignee: Option<&str>) -> Result<Order, StoreError> {
        let conn = self.get_conn()?;
        let now = chrono::Utc::now();
        let changed = conn.execute(
            "UPDATE orders SET current_assignee = ?1, updated_at = ?2 WHERE id = ?3",
            params![assignee, format_timestamp(&now), order_id],
        )?;
        if changed == 0 {
            return Err(StoreError::OrderNotFound(order_id.to_string()));
        }
        Self::read_order(&conn, order_id)?
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))
    }

    fn commit_transition<E, F>(&self, order_id: &str, check: F) -> Result<(Order, HistoryEntry), E>
    where
        E: From<StoreError>,
        F: FnOnce(&Order) -> Result<HistoryEntry, E>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;

        let mut order = Self::read_order(&tx, order_id)?
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;

        // Dropping `tx` on any early return rolls back
        let entry = check(&order)?;
        let new_status = entry
            .new_status
            .ok_or_else(|| StoreError::MissingNewStatus(order_id.to_string()))?;

        tx.execute(
            "UPDATE orders SET order_status = ?1, updated_at = ?2 WHERE id = ?3",
            params![new_status, format_timestamp(&entry.timestamp), order_id],
        )
        .map_err(StoreError::from)?;
        Self::append_history(&tx, &entry)?;
        tx.commit().map_err(StoreError::from)?;

        order.order_status = new_status;
        order.updated_at = entry.timestamp;
        Ok((order, entry))
    }
}
