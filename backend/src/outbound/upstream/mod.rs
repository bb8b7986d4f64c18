//! Reqwest-backed adapter for the upstream records API.
//!
//! One client implements all four gateway ports; the upstream is a single
//! service and the resources share transport, auth, and error mapping.

mod client;
mod dto;

pub use client::UpstreamClient;
