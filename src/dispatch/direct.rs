//! Batch dispatcher for `/netzke/direct` requests.
//!
//! The body is either a single query or a query carrying `_json`, in which
//! case `_json` holds the actual ordered batch and the outer object is
//! discarded. Every query produces exactly one response envelope, in
//! submission order. A missing component soft-fails its own entry only; any
//! other failure aborts the whole response.

use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::component::{ComponentAddress, ComponentFactory, EndpointArgs};
use crate::dispatch::resolver::{resolve, Resolution};
use crate::session::Session;
use crate::types::GatewayError;

/// One unit of work in a `direct` request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchQuery {
    /// Component address in `__` notation
    #[serde(default)]
    pub act: String,
    /// Endpoint method name as sent by the client (camelCase convention)
    #[serde(default)]
    pub method: String,
    /// Positional endpoint arguments
    #[serde(default)]
    pub data: Vec<Value>,
    /// Opaque transaction id, echoed verbatim
    #[serde(default)]
    pub tid: Value,
    /// When present, the request is batched and these are the real queries
    #[serde(rename = "_json")]
    pub json: Option<Vec<BatchQuery>>,
}

/// Fixed-shape response element, one per query.
///
/// `result` deliberately holds the invocation result pre-serialized to a
/// JSON string, embedded as a string value in the outer array. Existing
/// clients parse this nested encoding; do not flatten it to native JSON
/// without a protocol version bump.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tid: Value,
    pub action: String,
    pub method: String,
    pub result: String,
}

/// Serialize an endpoint result for the `result` field; blank results
/// collapse to `"{}"`.
fn serialize_result(result: &Value) -> Result<String, GatewayError> {
    let blank = match result {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if blank {
        Ok("{}".to_string())
    } else {
        Ok(serde_json::to_string(result)?)
    }
}

/// Dispatch a parsed `direct` body against the session registry and return
/// the serialized JSON array of envelopes.
pub fn handle_direct(
    body: &[u8],
    session: Option<&Session>,
    factory: &dyn ComponentFactory,
) -> Result<String, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::MissingBody);
    }
    let parsed: BatchQuery = serde_json::from_slice(body)?;

    let queries = match parsed.json {
        Some(batch) => batch,
        None => vec![parsed],
    };

    let mut envelopes = Vec::with_capacity(queries.len());
    for query in queries {
        match dispatch_query(&query, session, factory) {
            Ok(envelope) => envelopes.push(envelope),
            Err(e) => {
                error!(act = %query.act, method = %query.method, "Error invoking endpoint: {}", e);
                return Err(e);
            }
        }
    }

    Ok(serde_json::to_string(&envelopes)?)
}

fn dispatch_query(
    query: &BatchQuery,
    session: Option<&Session>,
    factory: &dyn ComponentFactory,
) -> Result<ResponseEnvelope, GatewayError> {
    let address = ComponentAddress::parse(&query.act);
    let action = query.method.to_snake_case();

    let result = match resolve(&address.root, session, factory)? {
        Resolution::Found(handle) => {
            let endpoint = address.endpoint_path(&action);
            let value =
                handle.invoke_endpoint(&endpoint, EndpointArgs::Positional(query.data.clone()))?;
            serialize_result(&value)?
        }
        Resolution::NotFound => {
            serde_json::to_string(&serde_json::json!({"component_not_in_session": true}))?
        }
    };

    Ok(ResponseEnvelope {
        kind: "rpc",
        tid: query.tid.clone(),
        action: address.root,
        method: action,
        result,
    })
}
