//! Two-phase bulk loader for PATHSAMPLE-style flat files.
//!
//! `min.data` has one minimum per line: `energy fvib pgorder`, extra
//! columns ignored. `ts.data` has one transition state per line:
//! `energy fvib pgorder minIndex1 minIndex2`, where the indices are the
//! 1-based line positions in the minima file. Minima are loaded first so
//! those indices are exactly the ids the store assigns.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::{
    bulk::{
        MinimumCreate, TransitionStateCreate, bulk_insert_minima, bulk_insert_transition_states,
        bulk_insert_transition_states_checked,
    },
    errors::BasinGraphError,
    store::GraphStore,
};

pub struct PathSampleLoader<'a> {
    store: &'a GraphStore,
    min_data: PathBuf,
    ts_data: PathBuf,
    validate: bool,
}

impl<'a> PathSampleLoader<'a> {
    /// Loader reading `min.data` and `ts.data` from the working directory.
    pub fn new(store: &'a GraphStore) -> Self {
        Self::with_paths(store, "min.data", "ts.data")
    }

    pub fn with_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        store: &'a GraphStore,
        min_data: P,
        ts_data: Q,
    ) -> Self {
        Self {
            store,
            min_data: min_data.as_ref().to_path_buf(),
            ts_data: ts_data.as_ref().to_path_buf(),
            validate: false,
        }
    }

    /// Routes the transition-state phase through the validating batch
    /// path (endpoint existence + canonical ordering). Off by default:
    /// the fast path writes endpoint ids exactly as the file gives them.
    pub fn validating(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Phase 1: parse the whole minima file into one batch, then insert
    /// it in a single transaction. Returns the number of minima loaded;
    /// assigned ids are 1..=N in file line order.
    pub fn load_minima(&self) -> Result<usize, BasinGraphError> {
        let file_label = path_label(&self.min_data);
        let reader = open_input(&self.min_data)?;
        let mut batch = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| BasinGraphError::query(e.to_string()))?;
            let lineno = lineno + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return Err(BasinGraphError::parse(
                    file_label.as_str(),
                    lineno,
                    format!("expected at least 3 columns, got {}", fields.len()),
                ));
            }
            batch.push(MinimumCreate {
                energy: parse_float(fields[0], &file_label, lineno, "energy")?,
                fvib: parse_float(fields[1], &file_label, lineno, "fvib")?,
                pgorder: parse_int(fields[2], &file_label, lineno, "pgorder")?,
            });
        }
        bulk_insert_minima(self.store, &batch)?;
        Ok(batch.len())
    }

    /// Phase 2: parse the whole ts file, then insert it in a single
    /// transaction. Endpoint indices are taken literally from the file.
    pub fn load_transition_states(&self) -> Result<usize, BasinGraphError> {
        let file_label = path_label(&self.ts_data);
        let reader = open_input(&self.ts_data)?;
        let mut batch = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| BasinGraphError::query(e.to_string()))?;
            let lineno = lineno + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 {
                return Err(BasinGraphError::parse(
                    file_label.as_str(),
                    lineno,
                    format!("expected at least 5 columns, got {}", fields.len()),
                ));
            }
            batch.push(TransitionStateCreate {
                energy: parse_float(fields[0], &file_label, lineno, "energy")?,
                fvib: parse_float(fields[1], &file_label, lineno, "fvib")?,
                pgorder: parse_int(fields[2], &file_label, lineno, "pgorder")?,
                minimum1_id: parse_int(fields[3], &file_label, lineno, "minIndex1")?,
                minimum2_id: parse_int(fields[4], &file_label, lineno, "minIndex2")?,
            });
        }
        if self.validate {
            bulk_insert_transition_states_checked(self.store, &batch)?;
        } else {
            bulk_insert_transition_states(self.store, &batch)?;
        }
        Ok(batch.len())
    }

    /// Runs both phases in order (edges reference minima positionally).
    /// Returns (minima loaded, transition states loaded).
    pub fn load(&self) -> Result<(usize, usize), BasinGraphError> {
        let minima = self.load_minima()?;
        let transition_states = self.load_transition_states()?;
        Ok((minima, transition_states))
    }
}

fn open_input(path: &Path) -> Result<BufReader<File>, BasinGraphError> {
    if !path.is_file() {
        return Err(BasinGraphError::missing_input(path_label(path)));
    }
    let file = File::open(path).map_err(|e| BasinGraphError::query(e.to_string()))?;
    Ok(BufReader::new(file))
}

fn path_label(path: &Path) -> String {
    path.display().to_string()
}

fn parse_float(
    token: &str,
    file: &str,
    line: usize,
    column: &str,
) -> Result<f64, BasinGraphError> {
    token
        .parse()
        .map_err(|_| BasinGraphError::parse(file, line, format!("invalid {column} '{token}'")))
}

fn parse_int(token: &str, file: &str, line: usize, column: &str) -> Result<i64, BasinGraphError> {
    token
        .parse()
        .map_err(|_| BasinGraphError::parse(file, line, format!("invalid {column} '{token}'")))
}
