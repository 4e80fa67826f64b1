//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such
//! as trace correlation. Token checks live with the HTTP adapter in
//! `inbound::http::auth_guard`.

pub mod trace;

pub use trace::Trace;
