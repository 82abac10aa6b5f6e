//! Netzke gateway - HTTP middleware for session-resident components
//!
//! Routes requests under `/netzke/` to named component instances registered
//! in the caller's session and invokes a named endpoint on them. Everything
//! else is forwarded to the wrapped upstream application.
//!
//! ## Actions
//!
//! - **direct**: batched endpoint RPC with a fixed per-entry envelope shape
//! - **dispatcher**: legacy single-call RPC returning the raw result
//! - **ext / touch**: dynamic asset bodies (`.js` / `.css`)
//!
//! The component system itself is external: the gateway consumes it through
//! the [`component::ComponentFactory`] and [`component::EndpointInvokable`]
//! collaborator traits, plus [`routes::AssetSource`] for asset bodies.

pub mod component;
pub mod config;
pub mod dispatch;
pub mod routes;
pub mod server;
pub mod session;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{GatewayError, Result};
