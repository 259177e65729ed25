/// Mock push gateway for testing
///
/// Records every dispatched message and lets tests script per-token
/// rejections or a gateway-level failure. No network access.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{BatchSummary, PushError, PushGateway, PushMessage};

/// Recording push gateway
///
/// By default every message succeeds. Tokens registered via
/// [`fail_token`](Self::fail_token) are counted as per-token failures, and
/// [`fail_gateway`](Self::fail_gateway) makes the whole batch error the way
/// an unreachable gateway would.
#[derive(Default)]
pub struct MockPushGateway {
    sent: Mutex<Vec<PushMessage>>,
    failing_tokens: Mutex<Vec<String>>,
    gateway_down: Mutex<bool>,
}

impl MockPushGateway {
    /// Creates a mock gateway that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a token as stale; messages to it count as failures
    pub fn fail_token(&self, token: impl Into<String>) {
        self.failing_tokens.lock().unwrap().push(token.into());
    }

    /// Makes subsequent batches fail at the gateway level
    pub fn fail_gateway(&self) {
        *self.gateway_down.lock().unwrap() = true;
    }

    /// Returns a copy of every message dispatched so far
    pub fn sent_messages(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of messages dispatched so far
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl PushGateway for MockPushGateway {
    async fn send_each(&self, messages: &[PushMessage]) -> Result<BatchSummary, PushError> {
        if *self.gateway_down.lock().unwrap() {
            return Err(PushError::TokenExchange("gateway unavailable".to_string()));
        }

        let failing = self.failing_tokens.lock().unwrap().clone();
        let mut summary = BatchSummary::default();

        for message in messages {
            self.sent.lock().unwrap().push(message.clone());
            if failing.contains(&message.token) {
                summary.failure_count += 1;
            } else {
                summary.success_count += 1;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(token: &str) -> PushMessage {
        PushMessage {
            token: token.to_string(),
            title: "Task Reminder".to_string(),
            body: "Your task \"Water plants\" is due soon.".to_string(),
            link: "/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_records_messages() {
        let gateway = MockPushGateway::new();
        let summary = gateway
            .send_each(&[message("a"), message("b")])
            .await
            .unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 0);
        assert_eq!(gateway.sent_count(), 2);
        assert_eq!(gateway.sent_messages()[0].token, "a");
    }

    #[tokio::test]
    async fn test_mock_counts_failing_tokens() {
        let gateway = MockPushGateway::new();
        gateway.fail_token("stale");

        let summary = gateway
            .send_each(&[message("stale"), message("fresh")])
            .await
            .unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failure_count, 1);
        // Even failing messages are recorded as attempted.
        assert_eq!(gateway.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_gateway_failure() {
        let gateway = MockPushGateway::new();
        gateway.fail_gateway();

        let result = gateway.send_each(&[message("a")]).await;
        assert!(matches!(result, Err(PushError::TokenExchange(_))));
    }
}
