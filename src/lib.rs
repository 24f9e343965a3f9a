//! SQLite-backed store for energy-landscape exploration data: minima are
//! nodes, transition states are edges. `PathSampleLoader` bulk-loads the
//! `min.data` / `ts.data` flat formats; the query surface feeds an
//! external disconnectivity-graph stage.

pub mod bench_utils;
pub mod bulk;
pub mod cache;
pub mod colors;
pub mod config;
pub mod errors;
pub mod loader;
pub mod schema;
pub mod store;
pub mod types;

pub use crate::bulk::{MinimumCreate, TransitionStateCreate};
pub use crate::colors::ColorValues;
pub use crate::config::ConnectionConfig;
pub use crate::errors::BasinGraphError;
pub use crate::loader::PathSampleLoader;
pub use crate::store::GraphStore;
pub use crate::types::{Minimum, NewMinimum, NewTransitionState, TransitionState};
