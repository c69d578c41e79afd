//! Form controllers.

pub mod login;
