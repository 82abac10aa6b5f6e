//! Component collaborator interfaces.
//!
//! The gateway does not know what components do; it only knows how to
//! instantiate them from the configuration stored in the session and how to
//! call a named endpoint on them. Both concerns are behind traits so the
//! surrounding application supplies the actual component system.

pub mod address;

pub use address::{ComponentAddress, DELIMITER};

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::types::GatewayError;

/// Opaque component configuration recorded in the session registry when a
/// component is first rendered by external code. Passed through verbatim to
/// the instantiation collaborator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComponentConfig(pub Value);

/// Arguments handed to an endpoint invocation.
///
/// The batch path passes the query's `data` array positionally; the legacy
/// path passes the raw request parameter map. The distinction is part of the
/// wire protocol and must not be collapsed.
#[derive(Debug, Clone)]
pub enum EndpointArgs {
    Positional(Vec<Value>),
    Params(Map<String, Value>),
}

/// Capability interface for invoking a named endpoint on a live component.
///
/// `endpoint_path` uses the same `__` notation as component addresses and
/// may itself descend into nested sub-components; the gateway imposes no
/// semantics beyond assembling the path string.
pub trait EndpointInvokable: Send + Sync {
    fn invoke_endpoint(&self, endpoint_path: &str, args: EndpointArgs) -> Result<Value, GatewayError>;
}

/// Instantiates a live component from its session-stored configuration.
pub trait ComponentFactory: Send + Sync {
    fn instance_by_config(
        &self,
        config: &ComponentConfig,
    ) -> Result<Arc<dyn EndpointInvokable>, GatewayError>;
}
