//! Per-pair mutual exclusion for decisions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::PairKey;

/// Hands out one async mutex per canonical pair.
///
/// A decision holds its pair's guard from the first read to the commit, so two
/// concurrent likes on the same pair cannot both create a connection.
#[derive(Default)]
pub struct PairLocks {
    slots: Mutex<HashMap<PairKey, Arc<AsyncMutex<()>>>>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, pair: &PairKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Slots only referenced by the map are idle.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(pair.clone()).or_default().clone()
        };
        slot.lock_owned().await
    }
}
