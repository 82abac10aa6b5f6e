//! Dynamic asset actions (`ext`, `touch`).
//!
//! Asset bodies come from an external generator collaborator; the gateway
//! only gates on the requested format and supplies the CSRF token where the
//! generated script needs to embed it.

use base64::Engine;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use rand::RngCore;

use crate::session::Session;

/// Which asset family is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Ext,
    Touch,
}

/// External asset generator. The `ext` JavaScript bundle embeds the CSRF
/// token so client-side calls can pass request forgery checks.
pub trait AssetSource: Send + Sync {
    fn ext_js(&self, csrf_token: Option<&str>) -> String;
    fn ext_css(&self) -> String;
    fn touch_js(&self) -> String;
    fn touch_css(&self) -> String;
}

/// Return the session's CSRF token, creating and storing one on first use.
pub fn csrf_token(session: &Session) -> String {
    let mut data = session.write().unwrap_or_else(|e| e.into_inner());
    if let Some(ref token) = data.csrf_token {
        return token.clone();
    }
    let mut raw = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut raw);
    let token = base64::engine::general_purpose::STANDARD.encode(raw);
    data.csrf_token = Some(token.clone());
    token
}

/// Serve an asset for the given kind/format pair. Formats outside
/// `{js, css}` (including absent) yield 406 with an empty body and no
/// content-type header.
pub fn handle_asset(
    kind: AssetKind,
    format: Option<&str>,
    session: Option<&Session>,
    assets: &dyn AssetSource,
) -> Response<Full<Bytes>> {
    match (kind, format) {
        (AssetKind::Ext, Some("js")) => {
            let token = session.map(csrf_token);
            asset_response("text/javascript; charset=utf-8", assets.ext_js(token.as_deref()))
        }
        (AssetKind::Ext, Some("css")) => {
            asset_response("text/css; charset=utf-8", assets.ext_css())
        }
        (AssetKind::Touch, Some("js")) => {
            asset_response("text/javascript; charset=utf-8", assets.touch_js())
        }
        (AssetKind::Touch, Some("css")) => {
            asset_response("text/css; charset=utf-8", assets.touch_css())
        }
        _ => Response::builder()
            .status(StatusCode::NOT_ACCEPTABLE)
            .body(Full::new(Bytes::new()))
            .unwrap(),
    }
}

fn asset_response(content_type: &str, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionData;
    use std::sync::{Arc, RwLock};

    struct StaticAssets;

    impl AssetSource for StaticAssets {
        fn ext_js(&self, csrf_token: Option<&str>) -> String {
            format!("Ext.js; token={}", csrf_token.unwrap_or("none"))
        }
        fn ext_css(&self) -> String {
            ".ext {}".to_string()
        }
        fn touch_js(&self) -> String {
            "Touch.js".to_string()
        }
        fn touch_css(&self) -> String {
            ".touch {}".to_string()
        }
    }

    fn fresh_session() -> Session {
        Arc::new(RwLock::new(SessionData::default()))
    }

    #[test]
    fn test_js_and_css_content_types() {
        let resp = handle_asset(AssetKind::Ext, Some("css"), None, &StaticAssets);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["Content-Type"],
            "text/css; charset=utf-8"
        );

        let resp = handle_asset(AssetKind::Touch, Some("js"), None, &StaticAssets);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["Content-Type"],
            "text/javascript; charset=utf-8"
        );
    }

    #[test]
    fn test_unknown_format_is_406_for_both_kinds() {
        for kind in [AssetKind::Ext, AssetKind::Touch] {
            for format in [Some("xml"), Some("jsx"), None] {
                let resp = handle_asset(kind, format, None, &StaticAssets);
                assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
                assert!(resp.headers().get("Content-Type").is_none());
            }
        }
    }

    #[test]
    fn test_csrf_token_is_stable_per_session() {
        let session = fresh_session();
        let first = csrf_token(&session);
        let second = csrf_token(&session);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_ext_js_embeds_session_token() {
        let session = fresh_session();
        let resp = handle_asset(AssetKind::Ext, Some("js"), Some(&session), &StaticAssets);
        assert_eq!(resp.status(), StatusCode::OK);
        let token = session.read().unwrap().csrf_token.clone().unwrap();
        assert!(!token.is_empty());
    }
}
