//! User session store: profile, loading flag and last error.
//!
//! SYSTEM CONTEXT
//! ==============
//! The login form writes the authenticated profile here with `Set`; other
//! callers load or replace it with `fetch_user` / `update_user`.
//!
//! DESIGN
//! ======
//! `SessionState::apply` is a pure reducer over typed `SessionAction`s.
//! `SessionStore` wraps it in a `tokio::sync::watch` channel so all writes
//! go through one `send_if_modified` call and subscribers see every change.
//!
//! TRADE-OFFS
//! ==========
//! Fetch and update share one request sequence. A completion whose
//! `RequestId` is not the most recently issued one is dropped, so the last
//! request issued wins no matter which response lands last. A caller whose
//! request went stale still gets its own `Result` back. Ids are allocated
//! inside the channel's write lock, so issue order and record order agree.
//! Dropping a fetch/update future before it settles dispatches `Abandoned`,
//! which ends the loading window without touching profile or error.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::net::api::{ApiError, SessionApi};
use crate::net::types::User;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch user data";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update user data";

// =============================================================================
// STATE
// =============================================================================

/// Sequence token for one fetch/update round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub profile: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
    latest_request: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    FetchPending(RequestId),
    FetchFulfilled(RequestId, User),
    FetchRejected(RequestId, String),
    UpdatePending(RequestId),
    UpdateFulfilled(RequestId, User),
    UpdateRejected(RequestId, String),
    /// The caller stopped waiting before the request settled.
    Abandoned(RequestId),
    Set(User),
    ClearUser,
    ClearError,
}

impl SessionState {
    /// The most recently issued fetch/update, settled or not.
    #[must_use]
    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest_request
    }

    /// Apply one action. Returns `false` when the action was a stale
    /// completion and left the state untouched.
    pub fn apply(&mut self, action: SessionAction) -> bool {
        match action {
            SessionAction::FetchPending(id) | SessionAction::UpdatePending(id) => {
                self.latest_request = Some(id);
                self.loading = true;
                self.error = None;
            }
            SessionAction::FetchFulfilled(id, user) | SessionAction::UpdateFulfilled(id, user) => {
                if !self.is_current(id) {
                    return false;
                }
                self.loading = false;
                self.profile = Some(user);
                self.error = None;
            }
            SessionAction::FetchRejected(id, message) | SessionAction::UpdateRejected(id, message) => {
                if !self.is_current(id) {
                    return false;
                }
                self.loading = false;
                self.error = Some(message);
            }
            SessionAction::Abandoned(id) => {
                if !self.is_current(id) || !self.loading {
                    return false;
                }
                self.loading = false;
            }
            SessionAction::Set(user) => {
                self.profile = Some(user);
            }
            SessionAction::ClearUser => {
                self.profile = None;
                self.error = None;
            }
            SessionAction::ClearError => {
                self.error = None;
            }
        }
        true
    }

    fn is_current(&self, id: RequestId) -> bool {
        self.latest_request == Some(id)
    }

    fn next_request(&self) -> RequestId {
        RequestId(self.latest_request.map_or(1, |id| id.0 + 1))
    }
}

/// Message stored for a failed fetch/update. Status failures get the fixed
/// text; anything else carries the error's own message.
fn rejection_message(err: &ApiError, status_message: &str) -> String {
    match err {
        ApiError::Status { .. } => status_message.to_owned(),
        other => other.to_string(),
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Cloneable handle to the process-wide session state.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
    api: Arc<dyn SessionApi>,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state: Arc::new(state), api }
    }

    /// Run `action` through the reducer. Subscribers are notified only when
    /// the state actually changed.
    pub fn dispatch(&self, action: SessionAction) -> bool {
        self.state.send_if_modified(|state| state.apply(action))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn set_user(&self, user: User) {
        self.dispatch(SessionAction::Set(user));
    }

    pub fn clear_user(&self) {
        self.dispatch(SessionAction::ClearUser);
    }

    pub fn clear_error(&self) {
        self.dispatch(SessionAction::ClearError);
    }

    /// Load `user_id` from the backend into the store.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] that rejected the request. The store's
    /// `error` holds the user-facing message.
    pub async fn fetch_user(&self, user_id: &str) -> Result<User, ApiError> {
        let id = self.begin_request(SessionAction::FetchPending);
        tracing::debug!(%user_id, request = id.get(), "fetching user");

        let mut in_flight = InFlight::new(self, id);
        let result = self.api.fetch_user(user_id).await;
        in_flight.settle();
        let applied = match &result {
            Ok(user) => self.dispatch(SessionAction::FetchFulfilled(id, user.clone())),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "fetch user failed");
                self.dispatch(SessionAction::FetchRejected(id, rejection_message(e, FETCH_FAILED_MESSAGE)))
            }
        };
        if !applied {
            tracing::debug!(%user_id, request = id.get(), "dropped stale fetch result");
        }
        result
    }

    /// Send `data` as the new profile for `user_id` and store the response.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] that rejected the request. The store's
    /// `error` holds the user-facing message.
    pub async fn update_user(&self, user_id: &str, data: &Value) -> Result<User, ApiError> {
        let id = self.begin_request(SessionAction::UpdatePending);
        tracing::debug!(%user_id, request = id.get(), "updating user");

        let mut in_flight = InFlight::new(self, id);
        let result = self.api.update_user(user_id, data).await;
        in_flight.settle();
        let applied = match &result {
            Ok(user) => self.dispatch(SessionAction::UpdateFulfilled(id, user.clone())),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "update user failed");
                self.dispatch(SessionAction::UpdateRejected(id, rejection_message(e, UPDATE_FAILED_MESSAGE)))
            }
        };
        if !applied {
            tracing::debug!(%user_id, request = id.get(), "dropped stale update result");
        }
        result
    }

    /// Allocate the next request id and apply its pending action under the
    /// same write lock.
    fn begin_request(&self, pending: fn(RequestId) -> SessionAction) -> RequestId {
        let mut issued = RequestId(0);
        self.state.send_modify(|state| {
            issued = state.next_request();
            state.apply(pending(issued));
        });
        issued
    }
}

/// Ends the loading window if a fetch/update future is dropped mid-flight.
struct InFlight<'a> {
    store: &'a SessionStore,
    id: RequestId,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(store: &'a SessionStore, id: RequestId) -> Self {
        Self { store, id, settled: false }
    }

    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled && self.store.dispatch(SessionAction::Abandoned(self.id)) {
            tracing::debug!(request = self.id.get(), "abandoned in-flight request");
        }
    }
}
