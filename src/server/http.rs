//! HTTP server implementation.
//!
//! Uses hyper http1 with TokioIo for async handling. Requests matching
//! `/netzke/<action>(.<format>|/)?` are classified and dispatched; everything
//! else is forwarded to the configured upstream application (or answered
//! with 404 when no upstream is set), so the gateway behaves as a
//! middleware in front of an existing app.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::component::ComponentFactory;
use crate::config::Args;
use crate::dispatch::{handle_direct, handle_dispatch};
use crate::routes::{handle_asset, AssetKind, AssetSource};
use crate::session::{flags, Session, SessionStore};
use crate::types::{GatewayError, Result};

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "netzke_session";

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Session store; None when no session backend is attached, in which
    /// case all requests run sessionless
    pub sessions: Option<Arc<SessionStore>>,
    /// Component instantiation collaborator
    pub factory: Arc<dyn ComponentFactory>,
    /// Asset generation collaborator
    pub assets: Arc<dyn AssetSource>,
}

/// The fixed set of gateway actions under the `/netzke/` mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Direct,
    Dispatcher,
    Ext,
    Touch,
}

impl Action {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "direct" => Some(Self::Direct),
            "dispatcher" => Some(Self::Dispatcher),
            "ext" => Some(Self::Ext),
            "touch" => Some(Self::Touch),
            _ => None,
        }
    }
}

/// Classify a request path against `/netzke/<action>(.<format>|/)?`.
///
/// The action segment is required and may not contain `/`; the format is
/// everything after the first dot and may itself contain dots. A single
/// trailing slash is tolerated. Anything else does not classify and falls
/// through to the wrapped application, including unknown action names.
pub fn classify(path: &str) -> Option<(&str, Option<&str>)> {
    let rest = path.strip_prefix("/netzke/")?;
    if rest.is_empty() {
        return None;
    }
    if let Some(dot) = rest.find('.') {
        let (action, format) = (&rest[..dot], &rest[dot + 1..]);
        if action.is_empty() || action.contains('/') || format.is_empty() {
            return None;
        }
        return Some((action, Some(format)));
    }
    let action = rest.strip_suffix('/').unwrap_or(rest);
    if action.is_empty() || action.contains('/') {
        return None;
    }
    Some((action, None))
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Netzke gateway listening on {}", state.args.listen);
    match state.args.upstream_url {
        Some(ref url) => info!("Forwarding non-netzke requests to {}", url),
        None => warn!("No upstream configured - non-netzke requests answered with 404"),
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route one incoming request
async fn handle_request(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path().to_string();
    debug!("{} {}", req.method(), path);

    // Locate the session and run the flag pass exactly once per request,
    // before classification and any dispatch logic
    let session = request_session(&state, &req);
    if let Some(ref session) = session {
        let mut data = session.write().unwrap_or_else(|e| e.into_inner());
        flags::update_flags(&mut data);
    }

    let (action, format) = match classify(&path).map(|(a, f)| (Action::from_name(a), f)) {
        Some((Some(action), format)) => (action, format.map(str::to_string)),
        // Unknown action or non-matching path: the gateway does not consume
        // the request
        _ => return Ok(passthrough(&state, req).await),
    };

    let response = match action {
        Action::Direct => direct(req, session.as_ref(), &state).await,
        Action::Dispatcher => dispatcher(&req, session.as_ref(), &state),
        Action::Ext => handle_asset(
            AssetKind::Ext,
            format.as_deref(),
            session.as_ref(),
            state.assets.as_ref(),
        ),
        Action::Touch => handle_asset(
            AssetKind::Touch,
            format.as_deref(),
            session.as_ref(),
            state.assets.as_ref(),
        ),
    };

    Ok(response)
}

/// Look up the request's session from the `netzke_session` cookie.
fn request_session(state: &AppState, req: &Request<Incoming>) -> Option<Session> {
    let store = state.sessions.as_ref()?;
    let cookies = req.headers().get("cookie")?.to_str().ok()?;
    let session_id = cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })?;
    store.get(session_id)
}

/// `/netzke/direct`: batched endpoint RPC.
async fn direct(
    req: Request<Incoming>,
    session: Option<&Session>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!("Error reading direct request body: {}", e);
            return server_error();
        }
    };

    match handle_direct(&body, session, state.factory.as_ref()) {
        Ok(json) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json; charset=utf-8")
            .body(Full::new(Bytes::from(json)))
            .unwrap(),
        Err(e) => {
            error!("{}", e);
            server_error()
        }
    }
}

/// `/netzke/dispatcher?address=...`: legacy single RPC.
fn dispatcher(
    req: &Request<Incoming>,
    session: Option<&Session>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let params = query_params(req.uri().query().unwrap_or(""));
    let address = match params.get("address").and_then(Value::as_str) {
        Some(address) => address.to_string(),
        None => {
            error!("{}", GatewayError::MissingAddress);
            return server_error();
        }
    };

    match handle_dispatch(&address, params, session, state.factory.as_ref()) {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(body)))
            .unwrap(),
        Err(e) => {
            error!("Error dispatching to {}: {}", address, e);
            server_error()
        }
    }
}

/// Decode the query string into the raw parameter map handed to legacy
/// endpoint invocations.
fn query_params(query: &str) -> Map<String, Value> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
    pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// Forward a request the gateway does not consume to the wrapped upstream
/// application.
async fn passthrough(state: &AppState, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let Some(ref upstream) = state.args.upstream_url else {
        return not_found_response(req.uri().path());
    };

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let target_url = format!("{}{}", upstream.trim_end_matches('/'), path_and_query);

    debug!(url = %target_url, "Forwarding request to upstream");

    let method = match reqwest::Method::from_bytes(req.method().as_str().as_bytes()) {
        Ok(m) => m,
        Err(_) => return bad_gateway_response("Unsupported method"),
    };
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Error reading passthrough body: {}", e);
            return bad_gateway_response("Failed to read request body");
        }
    };

    let client = reqwest::Client::new();
    let mut builder = client.request(method, &target_url).body(body.to_vec());
    if let Some(ct) = content_type {
        builder = builder.header("Content-Type", ct);
    }

    match builder.send().await {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status().as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            match response.bytes().await {
                Ok(bytes) => {
                    let mut builder = Response::builder().status(status);
                    if let Some(ct) = content_type {
                        builder = builder.header("Content-Type", ct);
                    }
                    builder.body(Full::new(bytes)).unwrap()
                }
                Err(e) => {
                    warn!("Error reading upstream response: {}", e);
                    bad_gateway_response("Failed to read upstream response")
                }
            }
        }
        Err(e) => {
            warn!(url = %target_url, "Upstream request failed: {}", e);
            bad_gateway_response("Upstream unavailable")
        }
    }
}

/// Hard dispatch failures always surface as a bare 500 with an empty body;
/// details go to the log only.
fn server_error() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Bad gateway response
fn bad_gateway_response(message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Bad Gateway",
        "message": message,
    });

    Response::builder()
        .status(StatusCode::BAD_GATEWAY)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_plain_action() {
        assert_eq!(classify("/netzke/direct"), Some(("direct", None)));
        assert_eq!(classify("/netzke/dispatcher"), Some(("dispatcher", None)));
    }

    #[test]
    fn test_classify_with_format() {
        assert_eq!(classify("/netzke/ext.js"), Some(("ext", Some("js"))));
        assert_eq!(classify("/netzke/touch.css"), Some(("touch", Some("css"))));
        // format is everything after the first dot
        assert_eq!(classify("/netzke/ext.min.js"), Some(("ext", Some("min.js"))));
    }

    #[test]
    fn test_classify_trailing_slash() {
        assert_eq!(classify("/netzke/direct/"), Some(("direct", None)));
    }

    #[test]
    fn test_classify_rejects_non_matching() {
        assert_eq!(classify("/other/direct"), None);
        assert_eq!(classify("/netzke/"), None);
        assert_eq!(classify("/netzke/a/b"), None);
        assert_eq!(classify("/netzke/a/b/"), None);
        assert_eq!(classify("/netzke/.js"), None);
        assert_eq!(classify("/netzke"), None);
    }

    #[test]
    fn test_unknown_action_name() {
        // classifies, but is not a known action - routed to passthrough
        assert_eq!(classify("/netzke/bogus"), Some(("bogus", None)));
        assert!(Action::from_name("bogus").is_none());
    }

    #[test]
    fn test_query_params_decoding() {
        let params = query_params("address=grid__load&page=2&q=a%20b");
        assert_eq!(params["address"], "grid__load");
        assert_eq!(params["page"], "2");
        assert_eq!(params["q"], "a b");
    }
}
