//! Core primitives for the proposal-page CORS relay, independent of any
//! particular server runtime.

pub mod body;
pub mod cors;
pub mod error;
pub mod http;
pub mod relay;
pub mod upstream;
