//! Twittlite - a client library for the Twittlite social backend
//!
//! The heart of the crate is [`store::ClientStore`], an observable snapshot
//! store over the backend REST API with durable session persistence and an
//! inactivity timeout. [`api::ApiClient`] and
//! [`verification::VerificationClient`] are the typed HTTP clients
//! underneath it.

pub mod api;
pub mod config;
pub mod models;
pub mod prelude;
pub mod session;
pub mod store;
pub mod verification;
