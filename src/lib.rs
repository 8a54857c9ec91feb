//! Session layer for the artefolio front end, shared between the binary and tests.
//!
//! [`client::SessionClient`] talks to the backend and hides credential
//! expiry; [`session::SessionStore`] holds the current user on top of it.

pub mod client;
pub mod config;
pub mod models;
pub mod session;
pub mod utils;
