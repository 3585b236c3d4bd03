//! Layout of the storage file.
//!
//! Everything the tracker persists lives in one `storage` table of
//! `key -> JSON text` rows. Changes to that table ship as numbered SQL
//! scripts; `schema_migrations` records which ones a file has already seen,
//! so opening an existing file twice never re-runs a script.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Name of the key/value table created by the first script.
pub const STORAGE_TABLE: &str = "storage";

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: "001",
    name: "storage_table",
    sql: include_str!("migrations/001_storage_table.sql"),
}];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let applied = applied_versions(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|v| v == m.version))
        .collect();

    if pending.is_empty() {
        tracing::debug!("Storage file is up to date");
        return Ok(());
    }

    for migration in pending {
        apply_migration(conn, migration)?;
    }
    Ok(())
}

fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(versions)
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!(
        "Updating {} table layout ({} {})",
        STORAGE_TABLE,
        migration.version,
        migration.name
    );

    // Script and bookkeeping row commit together.
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute_batch(&format!("BEGIN TRANSACTION; {}", migration.sql))
        .and_then(|_| {
            conn.execute(
                "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
                (migration.version, migration.name, &now),
            )
        })
        .and_then(|_| conn.execute_batch("COMMIT;"))
        .or_else(|e| {
            let _ = conn.execute_batch("ROLLBACK;");
            Err(e)
        })
        .with_context(|| {
            format!(
                "Failed to update {} table ({} {})",
                STORAGE_TABLE, migration.version, migration.name
            )
        })?;

    Ok(())
}
