//! Versioned schema for the preference store.
//!
//! # Invariants
//! - Step `n` (1-based) of `STEPS` brings `PRAGMA user_version` to `n`.
//! - Pending steps run in one transaction.
//! - After `migrate` returns, every table in `STORE_TABLES` exists.

use super::{DbError, DbResult};
use rusqlite::Connection;

const STEPS: &[&str] = &[include_str!("sql/0001_init.sql")];

/// Tables the repositories read and write.
pub const STORE_TABLES: [&str; 3] = ["chores", "roommates", "preferences"];

/// Schema version this build writes.
pub fn schema_version() -> u32 {
    STEPS.len() as u32
}

/// State of the store after `migrate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Row count per entry of `STORE_TABLES`, in the same order.
    pub table_rows: Vec<(&'static str, i64)>,
}

impl SchemaReport {
    pub fn migrated(&self) -> bool {
        self.from_version != self.to_version
    }

    pub fn rows_in(&self, table: &str) -> Option<i64> {
        self.table_rows
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, rows)| *rows)
    }
}

/// Brings `conn` to `schema_version()` and checks the store tables.
pub fn migrate(conn: &mut Connection) -> DbResult<SchemaReport> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = schema_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    if found < supported {
        let tx = conn.transaction()?;
        for (version, sql) in (1..=supported).zip(STEPS).skip(found as usize) {
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version)?;
        }
        tx.commit()?;
    }

    Ok(SchemaReport {
        from_version: found,
        to_version: supported,
        table_rows: count_store_rows(conn)?,
    })
}

fn count_store_rows(conn: &Connection) -> DbResult<Vec<(&'static str, i64)>> {
    STORE_TABLES
        .iter()
        .map(|&table| {
            let present: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
                [table],
                |row| row.get(0),
            )?;
            if !present {
                return Err(DbError::MissingTable(table));
            }
            let rows: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                    row.get(0)
                })?;
            Ok((table, rows))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{migrate, schema_version, STORE_TABLES};
    use rusqlite::Connection;

    #[test]
    fn second_migrate_is_a_no_op_that_still_counts_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        let first = migrate(&mut conn).unwrap();
        assert!(first.migrated());
        assert_eq!(first.from_version, 0);
        assert_eq!(first.table_rows.len(), STORE_TABLES.len());

        conn.execute("INSERT INTO chores (name) VALUES ('Dishes');", [])
            .unwrap();
        let second = migrate(&mut conn).unwrap();
        assert!(!second.migrated());
        assert_eq!(second.to_version, schema_version());
        assert_eq!(second.rows_in("chores"), Some(1));
        assert_eq!(second.rows_in("preferences"), Some(0));
        assert_eq!(second.rows_in("notes"), None);
    }
}
