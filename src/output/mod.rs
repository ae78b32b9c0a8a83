//! Program and catalog file output

use crate::program::Program;
use chrono::NaiveDateTime;
use std::io;
use std::path::{Path, PathBuf};

/// `MM-DD-YY_HHMMSSam.<ext>`, lowercase
pub fn timestamped_file_name(now: NaiveDateTime, extension: &str) -> String {
    format!("{}.{}", now.format("%m-%d-%y_%I%M%S%p"), extension).to_lowercase()
}

/// Write the program text into `dir`, creating it if needed
pub fn write_program(dir: &Path, file_name: &str, program: &Program) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, program.to_text())?;
    tracing::debug!(path = %path.display(), "wrote program");
    Ok(path)
}

/// Pick a name in `dir` that does not exist yet, adding `-2`, `-3`, ...
pub fn unique_file_name(dir: &Path, now: NaiveDateTime, extension: &str) -> String {
    let base = timestamped_file_name(now, extension);
    if !dir.join(&base).exists() {
        return base;
    }
    let stem = base.trim_end_matches(&format!(".{}", extension)).to_string();
    (2u32..)
        .map(|n| format!("{}-{}.{}", stem, n, extension))
        .find(|name| !dir.join(name).exists())
        .unwrap_or(base)
}
