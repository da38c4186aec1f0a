use std::time::SystemTime;

use tracing::{Level, event};
use uuid::Uuid;

use crate::credentials::CredentialSlot;
use crate::errors::RefreshFailure;

#[derive(Clone, Debug)]
pub enum RefreshOutcome {
    Success,
    Failed,
}

/// Structured events for one refresh cycle; every event carries the cycle's id.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, at: SystemTime) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            "refresh.start"
        );
    }

    pub fn emit_joined(&self) {
        event!(
            Level::DEBUG,
            attempt_id = %self.attempt_id,
            context = %self.context,
            "refresh.joined"
        );
    }

    pub fn emit_success(&self, slot: CredentialSlot, token_len: usize, at: SystemTime) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            outcome = ?RefreshOutcome::Success,
            slot = %slot,
            token_len,
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, failure: &RefreshFailure, at: SystemTime) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            outcome = ?RefreshOutcome::Failed,
            error = %failure,
            "refresh.failure"
        );
    }
}
