use super::{HighScoreStore, StoreError};

/// In-memory high score slot, for tests and `--no-save` style runs
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    value: u32,
    fail_writes: bool,
}

impl MemoryHighScoreStore {
    pub fn new(value: u32) -> Self {
        Self {
            value,
            fail_writes: false,
        }
    }

    /// Make subsequent writes fail, simulating an unavailable backing store
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> u32 {
        self.value
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable);
        }
        self.value = score;
        Ok(())
    }
}
