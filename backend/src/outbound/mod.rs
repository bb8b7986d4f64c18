//! Outbound adapters.

pub mod upstream;
