mod memory;
mod store;

pub use memory::MemoryCredentialStore;
pub use store::{CredentialSlot, CredentialStore};
