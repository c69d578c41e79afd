//! Shared client state.
//!
//! DESIGN
//! ======
//! `SessionStore` is the single writer for the authenticated user's profile.
//! Every mutation is a `SessionAction` run through one reducer, and readers
//! observe the result through a watch channel instead of shared globals.

pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
