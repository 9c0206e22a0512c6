use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{HIGH_SCORE_KEY, HighScoreStore, StoreError, parse_score};

/// High score kept in a plain text file
///
/// Writes go to a sibling temporary file which is then renamed over the slot,
/// so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the slot as `snakeHighScore` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(HIGH_SCORE_KEY))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u32 {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(err) => {
                warn!(path = ?self.path, error = %err, "Could not read high score, using 0");
                return 0;
            }
        };

        parse_score(&raw).unwrap_or_else(|| {
            warn!(path = ?self.path, "Stored high score is malformed, using 0");
            0
        })
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, score.to_string()).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = ?self.path, score, "High score saved");
        Ok(())
    }
}
