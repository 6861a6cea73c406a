//! Scripted mock backend for tests.
//!
//! Pops pre-loaded replies in order; useful anywhere the orchestration loop
//! needs a deterministic model.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::{CompletionRequest, CompletionResponse, ModelBackend};

/// A backend that replays a fixed script of replies.
///
/// When the script is exhausted it repeats the final reply, so a mock
/// loaded with a single tool-calling response loops forever (handy for
/// tool-loop-cap tests).
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<VecDeque<Result<CompletionResponse, GatewayError>>>,
    last: Mutex<Option<Result<CompletionResponse, GatewayError>>>,
    calls: AtomicUsize,
    /// Artificial per-call delay, for concurrency tests.
    pub delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn push(&self, reply: Result<CompletionResponse, GatewayError>) {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(reply);
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn clone_reply(
        reply: &Result<CompletionResponse, GatewayError>,
    ) -> Result<CompletionResponse, GatewayError> {
        match reply {
            Ok(r) => Ok(r.clone()),
            Err(GatewayError::Timeout) => Err(GatewayError::Timeout),
            Err(GatewayError::Unavailable(s)) => Err(GatewayError::Unavailable(s.clone())),
            Err(GatewayError::InvalidRequest(s)) => Err(GatewayError::InvalidRequest(s.clone())),
            Err(GatewayError::Response(s)) => Err(GatewayError::Response(s.clone())),
        }
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let popped = self.script.lock().expect("mock script lock").pop_front();
        match popped {
            Some(reply) => {
                let out = Self::clone_reply(&reply);
                *self.last.lock().expect("mock last lock") = Some(reply);
                out
            }
            None => match &*self.last.lock().expect("mock last lock") {
                Some(reply) => Self::clone_reply(reply),
                None => Err(GatewayError::Unavailable("mock script empty".to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = MockBackend::new();
        mock.push(Ok(CompletionResponse::text("one")));
        mock.push(Ok(CompletionResponse::text("two")));

        let req = CompletionRequest {
            system: None,
            messages: vec![],
            tools: vec![],
        };
        assert_eq!(mock.complete(&req).await.unwrap().content, "one");
        assert_eq!(mock.complete(&req).await.unwrap().content, "two");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_repeats_last_reply() {
        let mock = MockBackend::new();
        mock.push(Ok(CompletionResponse::text("only")));

        let req = CompletionRequest {
            system: None,
            messages: vec![],
            tools: vec![],
        };
        mock.complete(&req).await.unwrap();
        assert_eq!(mock.complete(&req).await.unwrap().content, "only");
        assert_eq!(mock.complete(&req).await.unwrap().content, "only");
    }

    #[tokio::test]
    async fn test_mock_empty_script_is_unavailable() {
        let mock = MockBackend::new();
        let req = CompletionRequest {
            system: None,
            messages: vec![],
            tools: vec![],
        };
        assert!(matches!(
            mock.complete(&req).await,
            Err(GatewayError::Unavailable(_))
        ));
    }
}
