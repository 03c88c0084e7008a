//! Scripted fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::channel::oneshot;

use crate::client::{ApiConfig, ScreeningClient};
use crate::error::{ApiError, StoreError};
use crate::store::{MemoryStore, SessionStore};
use crate::transport::{ApiRequest, ApiResponse, Transport};

pub(crate) type Reply = Result<ApiResponse, ApiError>;

enum Scripted {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// Transport that answers from a FIFO script and records every request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn reply(&self, status: u16, body: &str) {
        self.push(Scripted::Ready(Ok(ApiResponse::new(status, body))));
    }

    pub(crate) fn fail(&self, err: ApiError) {
        self.push(Scripted::Ready(Err(err)));
    }

    /// Queue a reply that only resolves once the returned sender fires.
    pub(crate) fn gate(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.push(Scripted::Gated(rx));
        tx
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, item: Scripted) {
        self.script.lock().unwrap().push_back(item);
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Gated(rx)) => rx.await.unwrap_or_else(|_| Err(ApiError::Network("gate dropped".to_owned()))),
            None => Err(ApiError::Network("no scripted response".to_owned())),
        }
    }
}

pub(crate) fn scripted_client() -> ScreeningClient<ScriptedTransport> {
    ScreeningClient::new(ScriptedTransport::default(), ApiConfig::new("http://api.test/api/v1"))
}

/// Memory store whose writes to one key fail.
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: MemoryStore,
    pub(crate) fail_writes_to: Option<&'static str>,
}

impl SessionStore for FlakyStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes_to == Some(key) {
            return Err(StoreError::Write("quota exceeded".to_owned()));
        }
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

pub(crate) fn profile_json(id: i64, email: &str, role: &str) -> String {
    serde_json::json!({
        "id": id,
        "username": email.split('@').next().unwrap_or(email),
        "first_name": "Test",
        "last_name": "User",
        "email": email,
        "role": role,
    })
    .to_string()
}

pub(crate) fn login_json(token: &str, user: Option<&str>) -> String {
    let mut value = serde_json::json!({ "access_token": token, "token_type": "bearer" });
    if let Some(user) = user {
        value["user"] = serde_json::from_str(user).unwrap();
    }
    value.to_string()
}
