//! Versioned schema steps for the document store.
//!
//! Steps run inside one transaction, in version order, each followed by a
//! `PRAGMA user_version` bump. A failed step rolls back the whole upgrade.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

/// One schema step.
#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

impl Migration {
    fn apply(&self, tx: &Transaction<'_>) -> DbResult<()> {
        tx.execute_batch(self.sql)?;
        tx.pragma_update(None, "user_version", self.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            self.version, self.name
        );
        Ok(())
    }
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "documents",
        sql: include_str!("0001_documents.sql"),
    },
    Migration {
        version: 2,
        name: "documents_user_index",
        sql: include_str!("0002_documents_user_index.sql"),
    },
];

/// Schema version produced by the last known step.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Schema version recorded on the connection.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

/// Brings the connection up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_version(conn)?;
    let latest_supported = latest_version();
    if from_version > latest_supported {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        migration.apply(&tx)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from_version} to_version={latest_supported} steps={}",
        pending.len()
    );
    Ok(())
}
