//! Component address resolution against the session registry.

use std::sync::Arc;

use crate::component::{ComponentFactory, EndpointInvokable};
use crate::session::Session;
use crate::types::GatewayError;

/// Outcome of resolving a root component name.
///
/// "Not found" is a representable outcome, not an error: the batch
/// dispatcher turns it into a `{component_not_in_session: true}` entry
/// result without aborting its siblings. Factory failures, in contrast,
/// propagate as hard errors.
pub enum Resolution {
    Found(Arc<dyn EndpointInvokable>),
    NotFound,
}

/// Look up `root_name` in the session's component registry and instantiate
/// it via the factory. A request with no session resolves to `NotFound` as
/// well, since it cannot carry a registry.
pub fn resolve(
    root_name: &str,
    session: Option<&Session>,
    factory: &dyn ComponentFactory,
) -> Result<Resolution, GatewayError> {
    let Some(session) = session else {
        return Ok(Resolution::NotFound);
    };

    let config = {
        let data = session.read().unwrap_or_else(|e| e.into_inner());
        match data.components.get(root_name) {
            Some(config) => config.clone(),
            None => return Ok(Resolution::NotFound),
        }
    };

    let handle = factory.instance_by_config(&config)?;
    Ok(Resolution::Found(handle))
}
