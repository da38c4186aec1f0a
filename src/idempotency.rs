use uuid::Uuid;

/// Source of `Idempotency-Key` values, one per logical write.
pub trait IdempotencyKeys: Send + Sync {
    fn next_key(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeys;

impl IdempotencyKeys for UuidKeys {
    fn next_key(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
