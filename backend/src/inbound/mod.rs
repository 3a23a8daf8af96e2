//! Inbound adapters translating external requests into domain service calls.
//!
//! HTTP handlers live under [`http`]; they resolve identity and validate
//! payloads at the edge so the domain only sees typed values.

pub mod http;
