//! Batched inserts for the two-phase flat-file load.
//!
//! Each function runs one transaction with one prepared statement and
//! commits or rolls back as a whole, so a half-loaded batch is never
//! visible. Inserting 10^4-10^6 records through the validating
//! single-record path is asymptotically too slow; these paths skip
//! per-record overhead instead.

use ahash::AHashSet;
use rusqlite::Connection;

use crate::{
    errors::BasinGraphError,
    store::{GraphStore, encode_floats},
};

/// One minima-file row. Coords are stored as the empty placeholder and
/// `invalid` defaults to false, matching what the flat format carries.
#[derive(Clone, Debug)]
pub struct MinimumCreate {
    pub energy: f64,
    pub fvib: f64,
    pub pgorder: i64,
}

/// One ts-file row. Endpoint ids are the 1-based minima file positions.
#[derive(Clone, Debug)]
pub struct TransitionStateCreate {
    pub energy: f64,
    pub fvib: f64,
    pub pgorder: i64,
    pub minimum1_id: i64,
    pub minimum2_id: i64,
}

pub fn bulk_insert_minima(
    store: &GraphStore,
    entries: &[MinimumCreate],
) -> Result<Vec<i64>, BasinGraphError> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }
    let conn = store.connection();
    begin(conn)?;
    let result = (|| {
        let empty_coords = encode_floats(&[])?;
        let mut stmt = conn
            .prepare_cached(
                "INSERT INTO minima(energy, fvib, pgorder, invalid, coords) \
                 VALUES(?1, ?2, ?3, 0, ?4)",
            )
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            stmt.execute(rusqlite::params![
                entry.energy,
                entry.fvib,
                entry.pgorder,
                empty_coords,
            ])
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
            ids.push(conn.last_insert_rowid());
        }
        Ok(ids)
    })();
    finalize_transaction(store, result)
}

/// Fast path: endpoint ids are written exactly as given. No existence
/// check and no canonical reordering; callers who need the canonical
/// ordering invariant on bulk-loaded edges must use
/// [`bulk_insert_transition_states_checked`].
pub fn bulk_insert_transition_states(
    store: &GraphStore,
    entries: &[TransitionStateCreate],
) -> Result<Vec<i64>, BasinGraphError> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }
    let conn = store.connection();
    begin(conn)?;
    let result = (|| {
        let empty_coords = encode_floats(&[])?;
        let mut stmt = prepare_ts_insert(conn)?;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            stmt.execute(rusqlite::params![
                entry.energy,
                entry.fvib,
                entry.pgorder,
                entry.minimum1_id,
                entry.minimum2_id,
                empty_coords,
            ])
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
            ids.push(conn.last_insert_rowid());
        }
        Ok(ids)
    })();
    finalize_transaction(store, result)
}

/// Validating batch path: still one transaction and one statement, but
/// every row's endpoints are checked against the full minima id set
/// (loaded once) and stored smaller-id first.
pub fn bulk_insert_transition_states_checked(
    store: &GraphStore,
    entries: &[TransitionStateCreate],
) -> Result<Vec<i64>, BasinGraphError> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }
    let known: AHashSet<i64> = store.all_minimum_ids()?.into_iter().collect();
    let conn = store.connection();
    begin(conn)?;
    let result = (|| {
        let empty_coords = encode_floats(&[])?;
        let mut stmt = prepare_ts_insert(conn)?;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.minimum1_id == entry.minimum2_id {
                return Err(BasinGraphError::invalid_input(format!(
                    "transition state endpoints must be distinct, got {} twice",
                    entry.minimum1_id
                )));
            }
            if !known.contains(&entry.minimum1_id) || !known.contains(&entry.minimum2_id) {
                return Err(BasinGraphError::invalid_input(format!(
                    "transition state references unknown minima ({}, {})",
                    entry.minimum1_id, entry.minimum2_id
                )));
            }
            let (m1, m2) = if entry.minimum1_id < entry.minimum2_id {
                (entry.minimum1_id, entry.minimum2_id)
            } else {
                (entry.minimum2_id, entry.minimum1_id)
            };
            stmt.execute(rusqlite::params![
                entry.energy,
                entry.fvib,
                entry.pgorder,
                m1,
                m2,
                empty_coords,
            ])
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
            ids.push(conn.last_insert_rowid());
        }
        Ok(ids)
    })();
    finalize_transaction(store, result)
}

fn prepare_ts_insert(
    conn: &Connection,
) -> Result<rusqlite::CachedStatement<'_>, BasinGraphError> {
    conn.prepare_cached(
        "INSERT INTO transition_states\
         (energy, fvib, pgorder, invalid, minimum1_id, minimum2_id, coords) \
         VALUES(?1, ?2, ?3, 0, ?4, ?5, ?6)",
    )
    .map_err(|e| BasinGraphError::query(e.to_string()))
}

fn begin(conn: &Connection) -> Result<(), BasinGraphError> {
    conn.execute("BEGIN IMMEDIATE", [])
        .map_err(|e| BasinGraphError::query(e.to_string()))?;
    Ok(())
}

fn finalize_transaction(
    store: &GraphStore,
    result: Result<Vec<i64>, BasinGraphError>,
) -> Result<Vec<i64>, BasinGraphError> {
    let conn = store.connection();
    match result {
        Ok(ids) => {
            conn.execute("COMMIT", [])
                .map_err(|e| BasinGraphError::query(e.to_string()))?;
            store.invalidate_caches();
            Ok(ids)
        }
        Err(err) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(err)
        }
    }
}
