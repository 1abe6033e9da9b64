use log::{debug, warn};

use crate::storage::local::KeyValueStore;

pub const RATE_STORAGE_KEY: &str = "player.playbackRate";
pub const DEFAULT_RATE: f64 = 1.0;

/// Playback rate preference, persisted across tracks and sessions.
///
/// The rate is always finite and > 0.
pub struct RateControl {
    rate: f64,
    options: Vec<f64>,
    store: Box<dyn KeyValueStore>,
}

impl RateControl {
    /// Adopts a valid persisted rate, otherwise starts at 1. Nothing is written back.
    pub fn init(store: Box<dyn KeyValueStore>, options: Vec<f64>) -> Self {
        let rate = match store.get(RATE_STORAGE_KEY) {
            Ok(Some(value)) => parse_rate(&value).unwrap_or_else(|| {
                debug!("Ignoring persisted playback rate {value:?}");
                DEFAULT_RATE
            }),
            Ok(None) => DEFAULT_RATE,
            Err(e) => {
                warn!("Failed to read playback rate preference: {e}");
                DEFAULT_RATE
            }
        };

        Self {
            rate,
            options,
            store,
        }
    }

    pub fn current(&self) -> f64 {
        self.rate
    }

    pub fn options(&self) -> &[f64] {
        &self.options
    }

    /// index of the rate option matching the current rate, if any
    pub fn active_option(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|option| (option - self.rate).abs() < 1e-6)
    }

    /// Adopts `rate` and optionally persists it.
    ///
    /// Invalid rates (non-finite, zero or negative) are ignored and `None` is returned.
    /// A failed write is logged, the new rate stays in effect.
    pub fn set_rate(&mut self, rate: f64, persist: bool) -> Option<f64> {
        if !is_valid_rate(rate) {
            debug!("Ignoring invalid playback rate {rate}");
            return None;
        }

        self.rate = rate;
        if persist {
            if let Err(e) = self.store.set(RATE_STORAGE_KEY, &rate.to_string()) {
                warn!("Failed to persist playback rate {rate}: {e}");
            }
        }
        Some(rate)
    }
}

pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

pub fn parse_rate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|rate| is_valid_rate(*rate))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{cell::RefCell, collections::HashMap, rc::Rc};

    use anyhow::anyhow;

    use crate::storage::{error::StorageError, local::KeyValueStore};

    /// in-memory store; clones share contents, writes can be made to fail
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        pub values: Rc<RefCell<HashMap<String, String>>>,
        pub writes: Rc<RefCell<usize>>,
        pub fail_writes: bool,
    }

    impl MemoryStore {
        pub fn with(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            store
        }

        pub fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub fn value(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }

        pub fn write_count(&self) -> usize {
            *self.writes.borrow()
        }
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.value(key))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            *self.writes.borrow_mut() += 1;
            if self.fail_writes {
                return Err(StorageError::Internal(anyhow!("quota exceeded")));
            }
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}
