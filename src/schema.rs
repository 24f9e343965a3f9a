use rusqlite::Connection;

use crate::errors::BasinGraphError;

const CREATE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS minima (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        energy      REAL NOT NULL,
        fvib        REAL NOT NULL,
        pgorder     INTEGER NOT NULL,
        invalid     INTEGER NOT NULL DEFAULT 0,
        coords      TEXT,
        user_data   TEXT
    );
    CREATE TABLE IF NOT EXISTS transition_states (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        energy       REAL NOT NULL,
        fvib         REAL NOT NULL,
        pgorder      INTEGER NOT NULL,
        invalid      INTEGER NOT NULL DEFAULT 0,
        minimum1_id  INTEGER NOT NULL,
        minimum2_id  INTEGER NOT NULL,
        eigenval     REAL,
        coords       TEXT,
        eigenvec     TEXT,
        user_data    TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_minima_energy ON minima(energy);
    CREATE INDEX IF NOT EXISTS idx_ts_energy ON transition_states(energy);
    CREATE INDEX IF NOT EXISTS idx_ts_min1 ON transition_states(minimum1_id);
    CREATE INDEX IF NOT EXISTS idx_ts_min2 ON transition_states(minimum2_id);
    "#;

/// Creates the tables if they do not exist. Read-side open path.
pub fn ensure_schema(conn: &Connection) -> Result<(), BasinGraphError> {
    conn.execute_batch(CREATE_TABLES)
        .map_err(|e| BasinGraphError::schema(e.to_string()))?;
    Ok(())
}

/// Drops and recreates all backing tables. `GraphStore::open` calls this,
/// which makes opening destructive: prior contents are discarded.
pub fn reset_schema(conn: &Connection) -> Result<(), BasinGraphError> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS transition_states;
        DROP TABLE IF EXISTS minima;
        "#,
    )
    .map_err(|e| BasinGraphError::schema(e.to_string()))?;
    ensure_schema(conn)
}
