//! Durable storage for the high score
//!
//! The high score is the only value that outlives a session. It is kept in a
//! single slot holding the decimal score; anything unreadable in that slot is
//! treated as a score of zero.

pub mod file;
pub mod memory;

pub use file::FileHighScoreStore;
pub use memory::MemoryHighScoreStore;

use std::path::PathBuf;

/// Name of the slot the high score is stored under
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

/// Errors raised while writing the high score
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Failed to write high score to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("High score store rejected the write")]
    Unavailable,
}

/// A single durable slot holding the high score
pub trait HighScoreStore {
    /// Read the stored value, defaulting to 0 when absent or malformed
    fn load(&self) -> u32;

    /// Overwrite the stored value
    fn save(&mut self, score: u32) -> Result<(), StoreError>;
}

/// Parse a stored high score, tolerating surrounding whitespace
pub(crate) fn parse_score(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}
