//! Login form controller: credential fields, validation and submission.
//!
//! SYSTEM CONTEXT
//! ==============
//! Posts credentials straight to `SessionApi::login` and, on success, pushes
//! the returned profile into the `SessionStore` with a synchronous `Set`.
//! The caller performs the navigation named by `SubmitOutcome::Navigate`.
//!
//! ERROR HANDLING
//! ==============
//! Validation problems stay per field and never reach the network. Every
//! login failure collapses into one generic `general` message; the cause is
//! only logged.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use regex::Regex;
use tokio::sync::watch;

use crate::net::api::SessionApi;
use crate::net::types::Credentials;
use crate::state::session::SessionStore;

pub const ROOT_ROUTE: &str = "/";
pub const MIN_PASSWORD_LEN: usize = 6;

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Email is invalid";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"\S+@\S+\.\S+").unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

// =============================================================================
// FIELDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Email,
    Password,
    RememberMe,
}

/// New value for a field: text inputs carry `Text`, the checkbox `Checked`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Checked(_) => "checkbox",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(checked: bool) -> Self {
        Self::Checked(checked)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("field {field:?} does not accept {found} values")]
    FieldKind { field: FormField, found: &'static str },
}

/// Per-field validation messages plus the submission-level `general` slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Option<String>,
    pub password: Option<String>,
    pub general: Option<String>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.general.is_none()
    }

    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Email => self.email.as_deref(),
            FormField::Password => self.password.as_deref(),
            FormField::RememberMe => None,
        }
    }

    fn clear(&mut self, field: FormField) {
        match field {
            FormField::Email => self.email = None,
            FormField::Password => self.password = None,
            FormField::RememberMe => {}
        }
    }
}

/// Check `credentials` against the form rules. Pure.
#[must_use]
pub fn validate_credentials(credentials: &Credentials) -> FieldErrors {
    let email = if credentials.email.is_empty() {
        Some(EMAIL_REQUIRED.to_owned())
    } else if !email_regex().is_match(&credentials.email) {
        Some(EMAIL_INVALID.to_owned())
    } else {
        None
    };

    let password = if credentials.password.is_empty() {
        Some(PASSWORD_REQUIRED.to_owned())
    } else if credentials.password.chars().count() < MIN_PASSWORD_LEN {
        Some(PASSWORD_TOO_SHORT.to_owned())
    } else {
        None
    };

    FieldErrors { email, password, general: None }
}

// =============================================================================
// CONTROLLER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; no request was sent.
    Invalid,
    /// A previous submission is still in flight.
    Busy,
    /// The login request failed; `general` holds the message.
    Failed,
    /// The form was disposed before the request settled.
    Cancelled,
    /// Logged in; the caller should move to this route.
    Navigate(&'static str),
}

#[derive(Default)]
struct FormState {
    credentials: Credentials,
    errors: FieldErrors,
    submitting: bool,
}

pub struct LoginForm {
    state: Mutex<FormState>,
    api: Arc<dyn SessionApi>,
    store: SessionStore,
    teardown: watch::Sender<bool>,
}

impl LoginForm {
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>, store: SessionStore) -> Self {
        let (teardown, _) = watch::channel(false);
        Self { state: Mutex::new(FormState::default()), api, store, teardown }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.lock().credentials.clone()
    }

    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        self.lock().errors.clone()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        *self.teardown.borrow()
    }

    /// Store a new field value and drop that field's validation error.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldKind`] if a checkbox value is given for a
    /// text field or the other way round. Nothing changes in that case.
    pub fn update_field(&self, field: FormField, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let value: FieldValue = value.into();
        let mut state = self.lock();
        match (field, value) {
            (FormField::Email, FieldValue::Text(text)) => state.credentials.email = text,
            (FormField::Password, FieldValue::Text(text)) => state.credentials.password = text,
            (FormField::RememberMe, FieldValue::Checked(checked)) => state.credentials.remember_me = checked,
            (field, value) => return Err(FormError::FieldKind { field, found: value.kind() }),
        }
        state.errors.clear(field);
        Ok(())
    }

    /// Validation errors for the current field values. Does not touch the
    /// form's stored errors.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        validate_credentials(&self.lock().credentials)
    }

    /// Validate and, if clean, send one login request.
    ///
    /// The submitting flag is cleared once the request settles, whatever
    /// the outcome, and also when this future is dropped mid-flight.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.is_disposed() {
            return SubmitOutcome::Cancelled;
        }

        let credentials = {
            let mut state = self.lock();
            if state.submitting {
                return SubmitOutcome::Busy;
            }
            state.errors = validate_credentials(&state.credentials);
            if !state.errors.is_empty() {
                return SubmitOutcome::Invalid;
            }
            state.submitting = true;
            state.credentials.clone()
        };
        let _submitting = SubmittingGuard(self);

        tracing::info!(email = %credentials.email, remember_me = credentials.remember_me, "login attempt");

        let mut teardown = self.teardown.subscribe();
        let result = tokio::select! {
            result = self.api.login(&credentials) => Some(result),
            _ = teardown.wait_for(|disposed| *disposed) => None,
        };

        let outcome = match result {
            Some(Ok(user)) => {
                tracing::info!(email = %credentials.email, "login succeeded");
                self.store.set_user(user);
                SubmitOutcome::Navigate(ROOT_ROUTE)
            }
            Some(Err(e)) => {
                tracing::warn!(email = %credentials.email, error = %e, "login failed");
                self.lock().errors = FieldErrors { general: Some(LOGIN_FAILED.to_owned()), ..FieldErrors::default() };
                SubmitOutcome::Failed
            }
            None => {
                tracing::debug!(email = %credentials.email, "login abandoned on teardown");
                SubmitOutcome::Cancelled
            }
        };
        outcome
    }

    /// Tear the form down. An in-flight login is abandoned without writing
    /// to the store, and later submissions are refused.
    pub fn dispose(&self) {
        self.teardown.send_replace(true);
    }
}

/// Clears `submitting` when a submission ends, including by being dropped.
struct SubmittingGuard<'a>(&'a LoginForm);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().submitting = false;
    }
}
