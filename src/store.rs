use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    cache::AdjacencyCache,
    config::ConnectionConfig,
    errors::BasinGraphError,
    schema::{ensure_schema, reset_schema},
    types::{
        Minimum, NewMinimum, NewTransitionState, TransitionState, row_to_minimum,
        row_to_transition_state, validate_new_minimum, validate_new_transition_state,
    },
};

const MINIMUM_COLS: &str = "id, energy, fvib, pgorder, invalid";
const TS_COLS: &str = "id, energy, fvib, pgorder, invalid, minimum1_id, minimum2_id, eigenval";

/// SQLite-backed collection of minima and transition states.
///
/// All mutation in the common path goes through the bulk loader
/// (`crate::bulk`, driven by `crate::loader`); the single-record
/// `add_minimum` / `add_transition_state` methods are the validating path
/// that enforces the canonical endpoint ordering and referential
/// integrity. Records are never deleted individually; `open` tears the
/// schema down wholesale.
pub struct GraphStore {
    conn: Connection,
    adjacency_cache: AdjacencyCache,
}

impl GraphStore {
    /// Opens the database at `path` and destructively resets the schema.
    /// Any prior contents are discarded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BasinGraphError> {
        let conn =
            Connection::open(path).map_err(|e| BasinGraphError::connection(e.to_string()))?;
        reset_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, BasinGraphError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BasinGraphError::connection(e.to_string()))?;
        reset_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Opens without resetting. Read path for consumers attaching to a
    /// database a previous run has loaded.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self, BasinGraphError> {
        let conn =
            Connection::open(path).map_err(|e| BasinGraphError::connection(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Destructive open using the database component of a resolved
    /// connection configuration as the file path.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, BasinGraphError> {
        Self::open(config.database_path())
    }

    /// Commits pending work and releases the connection. Consumes the
    /// store; no operation can follow.
    pub fn close(self) -> Result<(), BasinGraphError> {
        self.conn
            .close()
            .map_err(|(_, e)| BasinGraphError::connection(e.to_string()))
    }

    /// Inserts one minimum through the validating path and returns the
    /// persisted record with its assigned id.
    pub fn add_minimum(&self, minimum: &NewMinimum) -> Result<Minimum, BasinGraphError> {
        validate_new_minimum(minimum)?;
        let coords = encode_floats(&minimum.coords)?;
        let user_data = encode_value(minimum.user_data.as_ref())?;
        self.conn
            .execute(
                "INSERT INTO minima(energy, fvib, pgorder, invalid, coords, user_data) \
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    minimum.energy,
                    minimum.fvib,
                    minimum.pgorder,
                    0i64,
                    coords,
                    user_data,
                ],
            )
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        self.invalidate_caches();
        Ok(Minimum {
            id: self.conn.last_insert_rowid(),
            energy: minimum.energy,
            fvib: minimum.fvib,
            pgorder: minimum.pgorder,
            invalid: false,
        })
    }

    /// Inserts one transition state through the validating path. The two
    /// endpoints must be distinct persisted minima; they are stored with
    /// the smaller id first regardless of argument order.
    pub fn add_transition_state(
        &self,
        min1: &Minimum,
        min2: &Minimum,
        ts: &NewTransitionState,
    ) -> Result<TransitionState, BasinGraphError> {
        validate_new_transition_state(ts)?;
        if min1.id == min2.id {
            return Err(BasinGraphError::invalid_input(
                "transition state endpoints must be distinct minima",
            ));
        }
        if !self.minimum_exists(min1.id)? || !self.minimum_exists(min2.id)? {
            return Err(BasinGraphError::invalid_input(
                "transition state endpoints must reference existing minima",
            ));
        }
        let (m1, m2) = if min1.id < min2.id {
            (min1.id, min2.id)
        } else {
            (min2.id, min1.id)
        };
        let coords = encode_floats(&ts.coords)?;
        let eigenvec = match &ts.eigenvec {
            Some(v) => Some(encode_floats(v)?),
            None => None,
        };
        let user_data = encode_value(ts.user_data.as_ref())?;
        self.conn
            .execute(
                "INSERT INTO transition_states\
                 (energy, fvib, pgorder, invalid, minimum1_id, minimum2_id, eigenval, coords, eigenvec, user_data) \
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    ts.energy,
                    ts.fvib,
                    ts.pgorder,
                    0i64,
                    m1,
                    m2,
                    ts.eigenval,
                    coords,
                    eigenvec,
                    user_data,
                ],
            )
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        self.invalidate_caches();
        Ok(TransitionState {
            id: self.conn.last_insert_rowid(),
            energy: ts.energy,
            fvib: ts.fvib,
            pgorder: ts.pgorder,
            invalid: false,
            minimum1_id: m1,
            minimum2_id: m2,
            eigenval: ts.eigenval,
        })
    }

    /// The minimum with globally minimal energy. `NotFound` on an empty
    /// store.
    pub fn lowest_energy_minimum(&self) -> Result<Minimum, BasinGraphError> {
        self.conn
            .query_row(
                &format!("SELECT {MINIMUM_COLS} FROM minima ORDER BY energy LIMIT 1"),
                [],
                row_to_minimum,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    BasinGraphError::not_found("store holds no minima")
                }
                other => BasinGraphError::query(other.to_string()),
            })
    }

    pub fn minimum_by_id(&self, id: i64) -> Result<Minimum, BasinGraphError> {
        self.conn
            .query_row(
                &format!("SELECT {MINIMUM_COLS} FROM minima WHERE id=?1"),
                params![id],
                row_to_minimum,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    BasinGraphError::not_found(format!("minimum {id}"))
                }
                other => BasinGraphError::query(other.to_string()),
            })
    }

    pub fn transition_state_by_id(&self, id: i64) -> Result<TransitionState, BasinGraphError> {
        self.conn
            .query_row(
                &format!("SELECT {TS_COLS} FROM transition_states WHERE id=?1"),
                params![id],
                row_to_transition_state,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    BasinGraphError::not_found(format!("transition state {id}"))
                }
                other => BasinGraphError::query(other.to_string()),
            })
    }

    /// The transition state whose unordered endpoint pair is `{a, b}`.
    /// Both orderings are checked, so callers may pass the endpoints
    /// either way round.
    pub fn transition_state_between(
        &self,
        a: &Minimum,
        b: &Minimum,
    ) -> Result<TransitionState, BasinGraphError> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {TS_COLS} FROM transition_states \
                     WHERE (minimum1_id=?1 AND minimum2_id=?2) \
                        OR (minimum1_id=?2 AND minimum2_id=?1) \
                     LIMIT 1"
                ),
                params![a.id, b.id],
                row_to_transition_state,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => BasinGraphError::not_found(format!(
                    "transition state between minima {} and {}",
                    a.id, b.id
                )),
                other => BasinGraphError::query(other.to_string()),
            })
    }

    /// All transition states incident to `minimum`, in unspecified order.
    pub fn transition_states_of(
        &self,
        minimum: &Minimum,
    ) -> Result<Vec<TransitionState>, BasinGraphError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {TS_COLS} FROM transition_states \
                 WHERE minimum1_id=?1 OR minimum2_id=?1"
            ))
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let rows = stmt
            .query_map(params![minimum.id], row_to_transition_state)
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let mut result = Vec::new();
        for item in rows {
            result.push(item.map_err(|e| BasinGraphError::query(e.to_string()))?);
        }
        Ok(result)
    }

    /// Ids of the minima on the far side of each transition state
    /// incident to `id`. Cached; the cache is cleared on every mutation.
    pub fn adjacent_minimum_ids(&self, id: i64) -> Result<Vec<i64>, BasinGraphError> {
        if let Some(cached) = self.adjacency_cache.get(id) {
            return Ok(cached);
        }
        let mut stmt = self
            .conn
            .prepare(
                "SELECT CASE WHEN minimum1_id=?1 THEN minimum2_id ELSE minimum1_id END \
                 FROM transition_states WHERE minimum1_id=?1 OR minimum2_id=?1 ORDER BY id",
            )
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let rows = stmt
            .query_map(params![id], |row| row.get(0))
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let mut result = Vec::new();
        for item in rows {
            result.push(item.map_err(|e| BasinGraphError::query(e.to_string()))?);
        }
        self.adjacency_cache.insert(id, result.clone());
        Ok(result)
    }

    /// All minima, ascending by energy when `order_energy` is true, in
    /// insertion (id) order otherwise. Deferred columns are not read.
    pub fn minima(&self, order_energy: bool) -> Result<Vec<Minimum>, BasinGraphError> {
        let sql = if order_energy {
            format!("SELECT {MINIMUM_COLS} FROM minima ORDER BY energy")
        } else {
            format!("SELECT {MINIMUM_COLS} FROM minima ORDER BY id")
        };
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let rows = stmt
            .query_map([], row_to_minimum)
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let mut result = Vec::new();
        for item in rows {
            result.push(item.map_err(|e| BasinGraphError::query(e.to_string()))?);
        }
        Ok(result)
    }

    /// All transition states; callers conventionally pass `false` and get
    /// insertion order.
    pub fn transition_states(
        &self,
        order_energy: bool,
    ) -> Result<Vec<TransitionState>, BasinGraphError> {
        let sql = if order_energy {
            format!("SELECT {TS_COLS} FROM transition_states ORDER BY energy")
        } else {
            format!("SELECT {TS_COLS} FROM transition_states ORDER BY id")
        };
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let rows = stmt
            .query_map([], row_to_transition_state)
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let mut result = Vec::new();
        for item in rows {
            result.push(item.map_err(|e| BasinGraphError::query(e.to_string()))?);
        }
        Ok(result)
    }

    pub fn number_of_minima(&self) -> Result<i64, BasinGraphError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM minima", [], |row| row.get(0))
            .map_err(|e| BasinGraphError::query(e.to_string()))
    }

    pub fn number_of_transition_states(&self) -> Result<i64, BasinGraphError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM transition_states", [], |row| row.get(0))
            .map_err(|e| BasinGraphError::query(e.to_string()))
    }
}

/// Deferred payload loaders and mutators for the caller-settable fields.
impl GraphStore {
    pub fn minimum_coords(&self, id: i64) -> Result<Vec<f64>, BasinGraphError> {
        let raw = self.payload_column("minima", "coords", id)?;
        decode_floats(raw.as_deref())
    }

    pub fn minimum_user_data(
        &self,
        id: i64,
    ) -> Result<Option<serde_json::Value>, BasinGraphError> {
        let raw = self.payload_column("minima", "user_data", id)?;
        decode_value(raw.as_deref())
    }

    pub fn transition_state_coords(&self, id: i64) -> Result<Vec<f64>, BasinGraphError> {
        let raw = self.payload_column("transition_states", "coords", id)?;
        decode_floats(raw.as_deref())
    }

    pub fn transition_state_eigenvec(
        &self,
        id: i64,
    ) -> Result<Option<Vec<f64>>, BasinGraphError> {
        let raw = self.payload_column("transition_states", "eigenvec", id)?;
        match raw {
            Some(text) => Ok(Some(decode_floats(Some(&text))?)),
            None => Ok(None),
        }
    }

    pub fn transition_state_user_data(
        &self,
        id: i64,
    ) -> Result<Option<serde_json::Value>, BasinGraphError> {
        let raw = self.payload_column("transition_states", "user_data", id)?;
        decode_value(raw.as_deref())
    }

    pub fn set_minimum_invalid(&self, id: i64, invalid: bool) -> Result<(), BasinGraphError> {
        self.set_column("minima", "invalid", id, invalid as i64)
    }

    pub fn set_transition_state_invalid(
        &self,
        id: i64,
        invalid: bool,
    ) -> Result<(), BasinGraphError> {
        self.set_column("transition_states", "invalid", id, invalid as i64)
    }

    pub fn set_minimum_user_data(
        &self,
        id: i64,
        user_data: &serde_json::Value,
    ) -> Result<(), BasinGraphError> {
        let encoded = serde_json::to_string(user_data)
            .map_err(|e| BasinGraphError::invalid_input(e.to_string()))?;
        self.set_column("minima", "user_data", id, encoded)
    }

    pub fn set_transition_state_user_data(
        &self,
        id: i64,
        user_data: &serde_json::Value,
    ) -> Result<(), BasinGraphError> {
        let encoded = serde_json::to_string(user_data)
            .map_err(|e| BasinGraphError::invalid_input(e.to_string()))?;
        self.set_column("transition_states", "user_data", id, encoded)
    }
}

impl GraphStore {
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn invalidate_caches(&self) {
        self.adjacency_cache.clear();
    }

    pub(crate) fn all_minimum_ids(&self) -> Result<Vec<i64>, BasinGraphError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM minima ORDER BY id")
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(id.map_err(|e| BasinGraphError::query(e.to_string()))?);
        }
        Ok(ids)
    }

    fn minimum_exists(&self, id: i64) -> Result<bool, BasinGraphError> {
        let exists: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM minima WHERE id=?1", params![id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        Ok(exists.is_some())
    }

    fn payload_column(
        &self,
        table: &str,
        column: &str,
        id: i64,
    ) -> Result<Option<String>, BasinGraphError> {
        self.conn
            .query_row(
                &format!("SELECT {column} FROM {table} WHERE id=?1"),
                params![id],
                |row| row.get(0),
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    BasinGraphError::not_found(format!("{table} record {id}"))
                }
                other => BasinGraphError::query(other.to_string()),
            })
    }

    fn set_column<V: rusqlite::ToSql>(
        &self,
        table: &str,
        column: &str,
        id: i64,
        value: V,
    ) -> Result<(), BasinGraphError> {
        let affected = self
            .conn
            .execute(
                &format!("UPDATE {table} SET {column}=?1 WHERE id=?2"),
                params![value, id],
            )
            .map_err(|e| BasinGraphError::query(e.to_string()))?;
        if affected == 0 {
            return Err(BasinGraphError::not_found(format!("{table} record {id}")));
        }
        Ok(())
    }

    fn from_connection(conn: Connection) -> Self {
        conn.set_prepared_statement_cache_capacity(128);
        Self {
            conn,
            adjacency_cache: AdjacencyCache::new(),
        }
    }
}

pub(crate) fn encode_floats(values: &[f64]) -> Result<String, BasinGraphError> {
    serde_json::to_string(values).map_err(|e| BasinGraphError::invalid_input(e.to_string()))
}

fn decode_floats(raw: Option<&str>) -> Result<Vec<f64>, BasinGraphError> {
    match raw {
        Some(text) => {
            serde_json::from_str(text).map_err(|e| BasinGraphError::query(e.to_string()))
        }
        None => Ok(Vec::new()),
    }
}

fn encode_value(value: Option<&serde_json::Value>) -> Result<Option<String>, BasinGraphError> {
    match value {
        Some(v) => serde_json::to_string(v)
            .map(Some)
            .map_err(|e| BasinGraphError::invalid_input(e.to_string())),
        None => Ok(None),
    }
}

fn decode_value(raw: Option<&str>) -> Result<Option<serde_json::Value>, BasinGraphError> {
    match raw {
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| BasinGraphError::query(e.to_string())),
        None => Ok(None),
    }
}
