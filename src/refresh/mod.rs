mod coordinator;
mod navigator;
mod refresher;

pub use coordinator::RefreshCoordinator;
pub use navigator::{MemoryNavigator, Navigator, NoopNavigator};
pub use refresher::{HttpTokenRefresher, TokenRefresher};
