//! Legacy single dispatcher for `/netzke/dispatcher` requests (old-style
//! Sencha Touch clients).
//!
//! The URL carries the component and the method to call in double-underscore
//! notation, e.g. `address=some_grid__post_grid_data`. Unlike the batch
//! path there is no envelope, no batching, no soft not-found, and no method
//! name normalization: the remaining address segments are the endpoint path
//! as sent.

use serde_json::{Map, Value};

use crate::component::{ComponentAddress, ComponentFactory, EndpointArgs};
use crate::dispatch::resolver::{resolve, Resolution};
use crate::session::Session;
use crate::types::GatewayError;

/// Dispatch one legacy call and return the serialized result for a
/// `text/plain` response body. Resolution failure is a hard error here.
pub fn handle_dispatch(
    address: &str,
    params: Map<String, Value>,
    session: Option<&Session>,
    factory: &dyn ComponentFactory,
) -> Result<String, GatewayError> {
    let parsed = ComponentAddress::parse(address);

    let handle = match resolve(&parsed.root, session, factory)? {
        Resolution::Found(handle) => handle,
        Resolution::NotFound => return Err(GatewayError::ComponentNotFound(parsed.root)),
    };

    let result = handle.invoke_endpoint(&parsed.sub_path(), EndpointArgs::Params(params))?;
    Ok(serde_json::to_string(&result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentConfig, EndpointInvokable};
    use crate::session::SessionData;
    use serde_json::json;
    use std::sync::{Arc, RwLock};

    struct Recorder;

    impl EndpointInvokable for Recorder {
        fn invoke_endpoint(&self, path: &str, args: EndpointArgs) -> Result<Value, GatewayError> {
            let args = match args {
                EndpointArgs::Positional(values) => Value::Array(values),
                EndpointArgs::Params(map) => Value::Object(map),
            };
            Ok(json!({"endpoint": path, "args": args}))
        }
    }

    struct Factory;

    impl ComponentFactory for Factory {
        fn instance_by_config(
            &self,
            _config: &ComponentConfig,
        ) -> Result<Arc<dyn EndpointInvokable>, GatewayError> {
            Ok(Arc::new(Recorder))
        }
    }

    fn session_with(name: &str) -> Session {
        let mut data = SessionData::default();
        data.components
            .insert(name.to_string(), ComponentConfig(json!({})));
        Arc::new(RwLock::new(data))
    }

    #[test]
    fn test_address_segments_are_not_normalized() {
        let session = session_with("some_grid");
        let mut params = Map::new();
        params.insert("page".into(), json!("2"));

        let body =
            handle_dispatch("some_grid__PostGridData", params, Some(&session), &Factory).unwrap();
        let result: Value = serde_json::from_str(&body).unwrap();
        // the legacy path passes segments through verbatim
        assert_eq!(result["endpoint"], "PostGridData");
        assert_eq!(result["args"]["page"], "2");
    }

    #[test]
    fn test_raw_result_no_envelope() {
        let session = session_with("grid");
        let body = handle_dispatch("grid__load", Map::new(), Some(&session), &Factory).unwrap();
        let result: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(result["endpoint"], "load");
        assert!(result.get("type").is_none());
        assert!(result.get("tid").is_none());
    }

    #[test]
    fn test_missing_component_is_hard_error() {
        let session = session_with("grid");
        let result = handle_dispatch("panel__load", Map::new(), Some(&session), &Factory);
        assert!(matches!(result, Err(GatewayError::ComponentNotFound(_))));
    }

    #[test]
    fn test_no_session_is_hard_error() {
        let result = handle_dispatch("grid__load", Map::new(), None, &Factory);
        assert!(matches!(result, Err(GatewayError::ComponentNotFound(_))));
    }
}
