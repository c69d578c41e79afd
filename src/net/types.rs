//! Wire DTOs for the login and user-profile endpoints.
//!
//! DESIGN
//! ======
//! The backend owns the profile schema, so `User` keeps the response body
//! verbatim instead of narrowing it to a fixed struct. Whatever the server
//! returns from `/login` or `/users/{id}` is what the session store holds.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Login form payload posted to `/login`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// User profile payload as returned by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Value);

impl User {
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// The `id` field, if the payload carries one.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// The `name` field, if present and a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_json(self) -> Value {
        self.0
    }
}

impl From<Value> for User {
    fn from(body: Value) -> Self {
        Self(body)
    }
}
