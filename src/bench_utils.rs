//! Seeded synthetic landscape generation for the Criterion benches.

use std::{fmt::Write as _, fs, io, path::Path};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::bulk::{MinimumCreate, TransitionStateCreate};

pub struct LandscapeDataset {
    pub minima: Vec<MinimumCreate>,
    pub transition_states: Vec<TransitionStateCreate>,
}

/// Generates `n_minima` minima with uniform random energies and `n_ts`
/// transition states between random distinct minima, smaller id first.
pub fn generate_landscape(n_minima: usize, n_ts: usize, seed: u64) -> LandscapeDataset {
    assert!(n_minima >= 2, "need at least two minima to connect");
    let mut rng = StdRng::seed_from_u64(seed);
    let minima = (0..n_minima)
        .map(|_| MinimumCreate {
            energy: rng.gen_range(-100.0..0.0),
            fvib: rng.gen_range(0.0..10.0),
            pgorder: rng.gen_range(1..=12),
        })
        .collect();
    let mut transition_states = Vec::with_capacity(n_ts);
    for _ in 0..n_ts {
        let a = rng.gen_range(1..=n_minima as i64);
        let mut b = rng.gen_range(1..=n_minima as i64);
        while b == a {
            b = rng.gen_range(1..=n_minima as i64);
        }
        transition_states.push(TransitionStateCreate {
            energy: rng.gen_range(-50.0..10.0),
            fvib: rng.gen_range(0.0..10.0),
            pgorder: rng.gen_range(1..=12),
            minimum1_id: a.min(b),
            minimum2_id: a.max(b),
        });
    }
    LandscapeDataset {
        minima,
        transition_states,
    }
}

/// Writes the dataset as `min.data` / `ts.data` under `dir` for the
/// file-load bench. Returns the two paths.
pub fn write_pathsample_files(
    dir: &Path,
    dataset: &LandscapeDataset,
) -> io::Result<(std::path::PathBuf, std::path::PathBuf)> {
    let min_path = dir.join("min.data");
    let ts_path = dir.join("ts.data");
    let mut min_text = String::new();
    for m in &dataset.minima {
        let _ = writeln!(min_text, "{} {} {}", m.energy, m.fvib, m.pgorder);
    }
    let mut ts_text = String::new();
    for ts in &dataset.transition_states {
        let _ = writeln!(
            ts_text,
            "{} {} {} {} {}",
            ts.energy, ts.fvib, ts.pgorder, ts.minimum1_id, ts.minimum2_id
        );
    }
    fs::write(&min_path, min_text)?;
    fs::write(&ts_path, ts_text)?;
    Ok((min_path, ts_path))
}
