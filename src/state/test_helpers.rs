//! Test doubles shared by the store and form tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::net::api::{ApiError, SessionApi};
use crate::net::types::{Credentials, User};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MockCall {
    Login(Credentials),
    Fetch(String),
    Update(String, Value),
}

type Reply = Result<User, ApiError>;

/// Scripted `SessionApi`. Each call consumes the next queued reply, waiting
/// on it if the test has not released it yet.
#[derive(Default)]
pub(crate) struct MockApi {
    replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply that is ready immediately.
    pub(crate) fn reply(&self, result: Reply) {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        self.replies.lock().unwrap().push_back(rx);
    }

    /// Queue a reply the test releases later through the returned sender.
    pub(crate) fn gate(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn next(&self, call: MockCall) -> Reply {
        self.calls.lock().unwrap().push(call);
        let pending = self.replies.lock().unwrap().pop_front();
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Request("mock reply dropped".to_owned()))),
            None => Err(ApiError::Request("no mock reply queued".to_owned())),
        }
    }
}

#[async_trait::async_trait]
impl SessionApi for MockApi {
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.next(MockCall::Login(credentials.clone())).await
    }

    async fn fetch_user(&self, user_id: &str) -> Result<User, ApiError> {
        self.next(MockCall::Fetch(user_id.to_owned())).await
    }

    async fn update_user(&self, user_id: &str, data: &Value) -> Result<User, ApiError> {
        self.next(MockCall::Update(user_id.to_owned(), data.clone())).await
    }
}

pub(crate) fn user(id: u64, name: &str) -> User {
    User::new(json!({ "id": id, "name": name }))
}
