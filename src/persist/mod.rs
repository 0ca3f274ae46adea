pub mod leaderboard;
pub mod save;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use thiserror::Error;

pub use self::{
    leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardStore},
    save::{GameSnapshot, SaveSlot, SaveSummary},
};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("refusing to save a defeated player")]
    DeadPlayer,
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{count} enemies do not fit a save with {capacity} slots")]
    TooManyEnemies { count: usize, capacity: usize },
    #[error("failed to encode save data: {0}")]
    Encode(#[source] bincode::Error),
}

impl PersistError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes `bytes` to a temp file beside `path`, then renames it over `path`.
/// Readers see either the old contents or the new ones, never a mix.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PersistError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PersistError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| PersistError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PersistError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| PersistError::io(path, e.error))?;
    Ok(())
}
