//! HTTP server

pub mod http;

pub use http::{classify, run, Action, AppState, SESSION_COOKIE};
