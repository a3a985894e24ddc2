//! Scripted `Transport` for store unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

struct Reply {
    result: Result<HttpResponse, ApiError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Answers requests with queued replies, in order, and records every request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn reply(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(response(status, body)), None)
    }

    pub(crate) fn fail(&self, message: &str) -> &Self {
        self.push(Err(ApiError::Transport(message.to_string())), None)
    }

    /// Queue a reply that is held back until the returned sender fires.
    pub(crate) fn reply_gated(&self, status: u16, body: &str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.push(Ok(response(status, body)), Some(gate));
        release
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, result: Result<HttpResponse, ApiError>, gate: Option<oneshot::Receiver<()>>) -> &Self {
        self.replies.lock().unwrap().push_back(Reply { result, gate });
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left");
        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }
        reply.result
    }
}

fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    }
}
