//! Result-tree reader.
//!
//! Layout: `<base_dir>/static_analysis/experiment_*/results_flat.json`, each
//! file a JSON object with a top-level `results` array. Experiment
//! directories are listed eagerly; files are parsed one at a time as the
//! record iterator advances.
//!
//! A missing `static_analysis` directory yields no records. An experiment
//! directory without a results file is skipped with a warning. A results file
//! that fails to parse ends the iteration with an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use evalscan_core::ExperimentRecord;

pub const STATIC_ANALYSIS_DIR: &str = "static_analysis";
pub const EXPERIMENT_PREFIX: &str = "experiment_";
pub const RESULTS_FILE: &str = "results_flat.json";

/// Errors from reading the result tree.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed results file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct ResultsFile {
    results: Vec<ExperimentRecord>,
}

/// Read-only handle on a result tree.
#[derive(Debug, Clone)]
pub struct ResultStore {
    base_dir: PathBuf,
}

impl ResultStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Results files present under the tree, in sorted directory order.
    pub fn results_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let root = self.base_dir.join(STATIC_ANALYSIS_DIR);
        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %root.display(), "no static analysis directory");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { path: root, source }),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: root.clone(),
                source,
            })?;
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(EXPERIMENT_PREFIX) {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();

        let mut files = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let file = dir.join(RESULTS_FILE);
            if file.is_file() {
                files.push(file);
            } else {
                tracing::warn!(experiment = %dir.display(), "no results_flat.json; skipped");
            }
        }
        Ok(files)
    }

    /// Lazily iterate every record in the tree.
    ///
    /// Each call starts a fresh pass over the filesystem.
    pub fn records(&self) -> Result<Records, StoreError> {
        Ok(Records {
            files: self.results_files()?.into_iter(),
            current: Vec::new().into_iter(),
        })
    }

    /// Load every record into memory.
    pub fn load_all(&self) -> Result<Vec<ExperimentRecord>, StoreError> {
        self.records()?.collect()
    }
}

/// Record iterator over a result tree. Stops after the first error.
pub struct Records {
    files: std::vec::IntoIter<PathBuf>,
    current: std::vec::IntoIter<ExperimentRecord>,
}

impl Iterator for Records {
    type Item = Result<ExperimentRecord, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }
            let path = self.files.next()?;
            match read_results_file(&path) {
                Ok(records) => self.current = records.into_iter(),
                Err(e) => {
                    self.files = Vec::new().into_iter();
                    return Some(Err(e));
                }
            }
        }
    }
}

fn read_results_file(path: &Path) -> Result<Vec<ExperimentRecord>, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ResultsFile =
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), records = parsed.results.len(), "loaded results file");
    Ok(parsed.results)
}
