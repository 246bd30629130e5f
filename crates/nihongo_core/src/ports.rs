//! crates/nihongo_core/src/ports.rs
//!
//! Defines the service contracts (traits) the session store depends on.
//! These traits form the boundary of the hexagonal architecture, so the store
//! never knows whether replies come from a remote model or the local fallback,
//! or whether simulated latency is real time or instantaneous.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::Message;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for every fallible core operation.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,
    #[error("Email already registered. Please use a different email.")]
    DuplicateAccount,
    #[error("Invalid response from the completion API: {0}")]
    InvalidRemoteResponse(String),
    #[error("Completion API call failed: {0}")]
    RemoteCallFailed(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait TutorResponseService: Send + Sync {
    /// Produces a tutoring reply. Infallible: implementations degrade to a
    /// canned reply instead of returning an error.
    async fn generate_response(
        &self,
        user_input: &str,
        context: &str,
        conversation_history: &[Message],
    ) -> String;

    /// Whether a remote credential is present.
    fn is_configured(&self) -> bool;
}

/// Source of the artificial latency in the mock auth flows.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// A `Delay` that resolves immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}
