/// Push notification gateway
///
/// Delivery of reminders to registered device tokens goes through the
/// [`PushGateway`] trait so the reminder scanner never talks to Firebase
/// directly. Two implementations exist:
///
/// - [`fcm::FcmClient`]: the real FCM HTTP v1 client
/// - [`mock::MockPushGateway`]: a recording gateway for tests and demos
///
/// Per-token delivery failures are part of normal operation (tokens go
/// stale); a gateway reports them in the [`BatchSummary`] instead of failing
/// the batch.

pub mod fcm;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use fcm::{FcmClient, ServiceAccount};
pub use mock::MockPushGateway;

/// One notification addressed to one device token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Target device token
    pub token: String,

    /// Notification title
    pub title: String,

    /// Notification body
    pub body: String,

    /// Navigation target opened when the notification is tapped
    pub link: String,
}

/// Outcome of a batch dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of messages accepted by the gateway
    pub success_count: usize,

    /// Number of messages rejected per-token (stale token, etc.)
    pub failure_count: usize,
}

/// Error type for push gateway operations
///
/// These are gateway-level failures. A single rejected token is NOT an
/// error; it is counted in the batch summary.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// Service-account credentials are missing or malformed
    #[error("Invalid push credentials: {0}")]
    InvalidCredentials(String),

    /// OAuth token exchange with the credential endpoint failed
    #[error("Push token exchange failed: {0}")]
    TokenExchange(String),

    /// Transport-level failure talking to the gateway
    #[error("Push transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Gateway capable of delivering a batch of push notifications
///
/// Mirrors the `sendEach` semantics of the hosted messaging service: every
/// message is attempted, per-message failures are collected, and the call
/// fails only when the gateway itself is unreachable or credentials are bad.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Dispatches all messages, returning success/failure counts
    async fn send_each(&self, messages: &[PushMessage]) -> Result<BatchSummary, PushError>;
}
