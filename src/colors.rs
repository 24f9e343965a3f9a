//! Per-minimum color values for the external plotting stage.
//!
//! The color file holds one number per line; line `i` belongs to the
//! minimum with id `i`. This works because the loader assigns ids in
//! minima-file line order, so ids are guaranteed to equal 1-based line
//! positions.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{errors::BasinGraphError, types::Minimum};

#[derive(Debug, Clone, PartialEq)]
pub struct ColorValues {
    values: Vec<f64>,
}

impl ColorValues {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BasinGraphError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BasinGraphError::missing_input(path.display().to_string()));
        }
        let file = File::open(path).map_err(|e| BasinGraphError::query(e.to_string()))?;
        let file_label = path.display().to_string();
        let mut values = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| BasinGraphError::query(e.to_string()))?;
            let token = match line.split_whitespace().next() {
                Some(token) => token,
                None => continue,
            };
            values.push(token.parse().map_err(|_| {
                BasinGraphError::parse(
                    file_label.as_str(),
                    lineno + 1,
                    format!("invalid color value '{token}'"),
                )
            })?);
        }
        Ok(Self { values })
    }

    /// The value for a 1-based minimum id.
    pub fn get(&self, id: i64) -> Option<f64> {
        if id < 1 {
            return None;
        }
        self.values.get(id as usize - 1).copied()
    }

    pub fn value_for(&self, minimum: &Minimum) -> Option<f64> {
        self.get(minimum.id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
