use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Function(i64),
    Alert(i64),
}

/// In-process keyed mutex serializing work on the same legacy record.
///
/// When disabled, [`EntityLocks::acquire`] returns immediately without a
/// guard.
pub struct EntityLocks {
    enabled: bool,
    slots: Mutex<HashMap<EntityKey, Arc<AsyncMutex<()>>>>,
}

impl EntityLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn acquire(&self, key: EntityKey) -> Option<OwnedMutexGuard<()>> {
        if !self.enabled {
            return None;
        }
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            // drop slots nobody is holding or waiting on
            slots.retain(|k, slot| *k == key || Arc::strong_count(slot) > 1);
            slots.entry(key).or_default().clone()
        };
        Some(slot.lock_owned().await)
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for EntityLocks {
    fn default() -> Self {
        Self::new(true)
    }
}
