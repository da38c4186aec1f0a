use std::sync::Mutex;

/// Hook into the application's routing, used to send the user to the login
/// view once the session cannot be renewed.
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Option<String>;

    fn redirect(&self, target: &str);
}

/// For headless callers with no view to navigate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn current_route(&self) -> Option<String> {
        None
    }

    fn redirect(&self, _target: &str) {}
}

/// Tracks the current route in memory and records every redirect.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    state: Mutex<(Option<String>, Vec<String>)>,
}

impl MemoryNavigator {
    pub fn at(route: impl Into<String>) -> Self {
        Self {
            state: Mutex::new((Some(route.into()), Vec::new())),
        }
    }

    pub fn redirects(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .1
            .clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_route(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .0
            .clone()
    }

    fn redirect(&self, target: &str) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.0 = Some(target.to_string());
        state.1.push(target.to_string());
    }
}
