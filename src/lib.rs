//! Session client: credential login and the user session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! `form` owns the login form controller, `state` owns the process-wide
//! session store, and `net` talks to the backend. `config` resolves the
//! base URL and HTTP timeouts shared by all of them.

pub mod config;
pub mod form;
pub mod net;
pub mod state;
