//! Scripted transport for tests.
//!
//! [`FakeTransport`] answers requests from a per-host script and records every
//! request it receives, so tests can assert how many hosts were contacted and
//! in which order.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::transport::{BoxFuture, HttpRequest, HttpResponse, Transport, TransportError};

/// A scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Respond with a status and body.
    Status(u16, String),
    /// Fail with a connection error.
    Fail(String),
    /// Never respond.
    Hang,
    /// Wait, then apply the inner reply.
    Delayed(Duration, Box<Reply>),
}

struct Script {
    prefix: String,
    replies: VecDeque<Reply>,
}

/// Recording transport with per-host scripted replies.
///
/// Hosts without a script get `200` with an empty body. A script's last reply
/// repeats once the earlier ones are used up.
#[derive(Default)]
pub struct FakeTransport {
    scripts: Mutex<Vec<Script>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl std::fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeTransport")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl FakeTransport {
    /// A transport where every host succeeds with an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every request for URLs starting with `host` with `reply`.
    #[must_use]
    pub fn reply(self, host: &str, reply: Reply) -> Self {
        self.replies(host, vec![reply])
    }

    /// Reply to successive requests for `host` with `replies` in order.
    #[must_use]
    pub fn replies(self, host: &str, replies: Vec<Reply>) -> Self {
        self.lock_scripts().push(Script {
            prefix: host.to_string(),
            replies: replies.into(),
        });
        self
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.lock_calls().clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// URLs of every request received so far, in order.
    pub fn urls(&self) -> Vec<String> {
        self.lock_calls().iter().map(|c| c.url.clone()).collect()
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut scripts = self.lock_scripts();
        let Some(script) = scripts.iter_mut().find(|s| url.starts_with(&s.prefix)) else {
            return Reply::Status(200, String::new());
        };
        if script.replies.len() > 1 {
            script.replies.pop_front().unwrap_or(Reply::Hang)
        } else {
            script.replies.front().cloned().unwrap_or(Reply::Hang)
        }
    }

    fn lock_scripts(&self) -> MutexGuard<'_, Vec<Script>> {
        self.scripts.lock()
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<HttpRequest>> {
        self.calls.lock()
    }
}

async fn play(reply: Reply) -> Result<HttpResponse, TransportError> {
    let mut reply = reply;
    loop {
        match reply {
            Reply::Status(status, body) => return Ok(HttpResponse::new(status, body)),
            Reply::Fail(reason) => return Err(TransportError::Connect(reason)),
            Reply::Hang => futures::future::pending::<()>().await,
            Reply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
        }
    }
}

impl Transport for FakeTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        let reply = self.next_reply(&request.url);
        self.lock_calls().push(request);
        Box::pin(play(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Credentials;
    use crate::request::Method;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            url: url.into(),
            body: None,
            credentials: Credentials::default(),
        }
    }

    #[tokio::test]
    async fn scripted_replies_then_last_repeats() {
        let fake = FakeTransport::new().replies(
            "http://a",
            vec![Reply::Status(503, String::new()), Reply::Status(200, "ok".into())],
        );

        let statuses = [
            fake.send(request("http://a/v1/x")).await.map(|r| r.status),
            fake.send(request("http://a/v1/x")).await.map(|r| r.status),
            fake.send(request("http://a/v1/x")).await.map(|r| r.status),
        ];

        assert_eq!(statuses, [Ok(503), Ok(200), Ok(200)]);
        assert_eq!(fake.call_count(), 3);
    }

    #[tokio::test]
    async fn unscripted_hosts_succeed_and_are_recorded() {
        let fake = FakeTransport::new().reply("http://a", Reply::Fail("refused".into()));

        assert!(fake.send(request("http://a/v1/x")).await.is_err());
        let response = fake.send(request("http://b/v1/y")).await.expect("unscripted host");

        assert_eq!(response.status, 200);
        assert_eq!(fake.urls(), vec!["http://a/v1/x", "http://b/v1/y"]);
    }
}
