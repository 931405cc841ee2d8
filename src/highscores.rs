//! Best score across runs
//!
//! Persisted as a plain integer string, written the moment a run ends with
//! a new record (independent of the run snapshot).

use crate::persistence::{KeyValueStore, StorageError};

/// Best score ever reached on this device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "pwa-runner-highscore";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Check if a score beats the record
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a score. Returns true if it is a new best.
    pub fn submit(&mut self, score: u64) -> bool {
        if self.qualifies(score) {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Load from storage; missing or unparsable reads as zero
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(text)) => match text.trim().parse::<u64>() {
                Ok(best) => {
                    log::info!("Loaded high score {}", best);
                    Self::new(best)
                }
                Err(_) => {
                    log::warn!("Ignoring unreadable high score {:?}", text);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read high score: {}", e);
                Self::default()
            }
        }
    }

    /// Save to storage
    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<(), StorageError> {
        store.set(Self::STORAGE_KEY, &self.best.to_string())?;
        log::info!("High score saved ({})", self.best);
        Ok(())
    }
}
