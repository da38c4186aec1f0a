use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{CredentialSlot, CredentialStore};

/// In-process credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slots: Mutex<HashMap<CredentialSlot, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(slot: CredentialSlot, token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(slot, token.into());
        store
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<CredentialSlot, String>> {
        // A poisoned map still holds plain strings.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, slot: CredentialSlot) -> Option<String> {
        self.slots().get(&slot).cloned()
    }

    fn set(&self, slot: CredentialSlot, token: String) {
        self.slots().insert(slot, token);
    }

    fn clear(&self, slot: CredentialSlot) {
        self.slots().remove(&slot);
    }
}
