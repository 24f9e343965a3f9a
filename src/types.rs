use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::errors::BasinGraphError;

/// A persisted local minimum. Summary fields only; `coords` and
/// `user_data` are deferred and fetched through the explicit loaders on
/// [`GraphStore`](crate::store::GraphStore).
///
/// Equality and hashing use the store-assigned id alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minimum {
    pub id: i64,
    pub energy: f64,
    pub fvib: f64,
    pub pgorder: i64,
    pub invalid: bool,
}

impl PartialEq for Minimum {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Minimum {}

impl Hash for Minimum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A persisted transition state connecting two minima. The canonical
/// ordering invariant holds for records built through
/// `GraphStore::add_transition_state`: `minimum1_id < minimum2_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionState {
    pub id: i64,
    pub energy: f64,
    pub fvib: f64,
    pub pgorder: i64,
    pub invalid: bool,
    pub minimum1_id: i64,
    pub minimum2_id: i64,
    pub eigenval: Option<f64>,
}

impl PartialEq for TransitionState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TransitionState {}

impl Hash for TransitionState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl TransitionState {
    /// The endpoint opposite `minimum_id`, or `None` if the edge is not
    /// incident to it.
    pub fn other_endpoint(&self, minimum_id: i64) -> Option<i64> {
        if self.minimum1_id == minimum_id {
            Some(self.minimum2_id)
        } else if self.minimum2_id == minimum_id {
            Some(self.minimum1_id)
        } else {
            None
        }
    }
}

/// An unpersisted minimum. Carries the payloads the summary type defers;
/// has no id and deliberately implements neither `Eq` nor `Hash`.
#[derive(Debug, Clone)]
pub struct NewMinimum {
    pub energy: f64,
    pub coords: Vec<f64>,
    pub fvib: f64,
    pub pgorder: i64,
    pub user_data: Option<serde_json::Value>,
}

impl NewMinimum {
    pub fn new(energy: f64, coords: Vec<f64>) -> Self {
        Self {
            energy,
            coords,
            fvib: 0.0,
            pgorder: 1,
            user_data: None,
        }
    }
}

/// An unpersisted transition state. Endpoints are supplied separately as
/// persisted `Minimum` records so the store can canonicalize their order.
#[derive(Debug, Clone)]
pub struct NewTransitionState {
    pub energy: f64,
    pub coords: Vec<f64>,
    pub fvib: f64,
    pub pgorder: i64,
    pub eigenval: Option<f64>,
    pub eigenvec: Option<Vec<f64>>,
    pub user_data: Option<serde_json::Value>,
}

impl NewTransitionState {
    pub fn new(energy: f64, coords: Vec<f64>) -> Self {
        Self {
            energy,
            coords,
            fvib: 0.0,
            pgorder: 1,
            eigenval: None,
            eigenvec: None,
            user_data: None,
        }
    }
}

pub fn validate_new_minimum(m: &NewMinimum) -> Result<(), BasinGraphError> {
    if !m.energy.is_finite() {
        return Err(BasinGraphError::invalid_input(
            "minimum energy must be finite",
        ));
    }
    Ok(())
}

pub fn validate_new_transition_state(ts: &NewTransitionState) -> Result<(), BasinGraphError> {
    if !ts.energy.is_finite() {
        return Err(BasinGraphError::invalid_input(
            "transition state energy must be finite",
        ));
    }
    Ok(())
}

pub fn row_to_minimum(row: &rusqlite::Row<'_>) -> Result<Minimum, rusqlite::Error> {
    Ok(Minimum {
        id: row.get(0)?,
        energy: row.get(1)?,
        fvib: row.get(2)?,
        pgorder: row.get(3)?,
        invalid: row.get::<_, i64>(4)? != 0,
    })
}

pub fn row_to_transition_state(row: &rusqlite::Row<'_>) -> Result<TransitionState, rusqlite::Error> {
    Ok(TransitionState {
        id: row.get(0)?,
        energy: row.get(1)?,
        fvib: row.get(2)?,
        pgorder: row.get(3)?,
        invalid: row.get::<_, i64>(4)? != 0,
        minimum1_id: row.get(5)?,
        minimum2_id: row.get(6)?,
        eigenval: row.get(7)?,
    })
}
