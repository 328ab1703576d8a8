//! Backend API plumbing: session, fetch client, poll backoff.
//!
//! The console talks to one backend over HTTP with a bearer token. The
//! token lives in an explicit [`Session`] object created at login and
//! dropped at logout, never read ambiently from browser storage. Every
//! in-flight request is tied to its owning client's lifetime and aborted
//! on teardown, so nothing resolves into a component that no longer
//! exists.

mod backoff;
#[cfg(target_arch = "wasm32")]
mod client;
mod session;

pub use backoff::PollBackoff;
#[cfg(target_arch = "wasm32")]
pub use client::ApiClient;
pub use session::Session;
