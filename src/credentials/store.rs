use std::fmt;

/// Where an access token lives. Only one slot is populated at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialSlot {
    /// Survives restarts; chosen when the user asked to be remembered.
    Persistent,
    /// Dropped when the session ends.
    Ephemeral,
}

impl CredentialSlot {
    /// Lookup order used when reading the current token.
    pub const PRECEDENCE: [CredentialSlot; 2] = [CredentialSlot::Persistent, CredentialSlot::Ephemeral];

    /// Conventional storage key for the slot.
    pub fn storage_key(&self) -> &'static str {
        match self {
            CredentialSlot::Persistent => "remember",
            CredentialSlot::Ephemeral => "session",
        }
    }
}

impl fmt::Display for CredentialSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Key/value storage for the access token.
pub trait CredentialStore: Send + Sync {
    fn get(&self, slot: CredentialSlot) -> Option<String>;

    fn set(&self, slot: CredentialSlot, token: String);

    fn clear(&self, slot: CredentialSlot);

    /// Empties both slots so no stale token can resurface after a forced logout.
    fn clear_all(&self) {
        for slot in CredentialSlot::PRECEDENCE {
            self.clear(slot);
        }
    }

    /// The slot holding a non-empty token, persistent first.
    fn active_slot(&self) -> Option<CredentialSlot> {
        CredentialSlot::PRECEDENCE
            .into_iter()
            .find(|slot| self.get(*slot).is_some_and(|token| !token.is_empty()))
    }

    fn current_token(&self) -> Option<String> {
        CredentialSlot::PRECEDENCE
            .into_iter()
            .filter_map(|slot| self.get(slot))
            .find(|token| !token.is_empty())
    }
}
