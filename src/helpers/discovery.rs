use log::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::processor::ProcessorError;

const CSV_EXTENSION: &str = "csv";

fn has_csv_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CSV_EXTENSION)
}

/// Resolves the CSV file to load.
///
/// An explicit `path` must be an existing regular file ending in `.csv`.
/// Without one, `dir` is scanned in file-name order and the first regular
/// `.csv` file wins.
pub fn find_csv_file(path: Option<&Path>, dir: &Path) -> Result<PathBuf, ProcessorError> {
    if let Some(path) = path {
        if !path.is_file() {
            return Err(ProcessorError::FileNotFound);
        }
        if !has_csv_extension(path) {
            return Err(ProcessorError::IncorrectExtension);
        }
        return Ok(path.to_path_buf());
    }

    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    let found = entries
        .into_iter()
        .find(|p| has_csv_extension(p) && p.is_file())
        .ok_or(ProcessorError::FileNotFound)?;

    debug!("discovered {}", found.display());
    Ok(found)
}
