//! Netzke gateway development server.
//!
//! Serves the gateway with a demo component system so the dispatch protocol
//! can be exercised without a surrounding application. Production
//! deployments embed the library and supply their own
//! [`netzke_gateway::component::ComponentFactory`] and
//! [`netzke_gateway::routes::AssetSource`] implementations.

use std::sync::Arc;

use clap::Parser;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use netzke_gateway::component::{
    ComponentConfig, ComponentFactory, EndpointArgs, EndpointInvokable,
};
use netzke_gateway::routes::AssetSource;
use netzke_gateway::session::SessionStore;
use netzke_gateway::{server, AppState, Args, GatewayError};

/// Demo component that echoes the endpoint path and arguments back.
struct EchoComponent {
    name: String,
}

impl EndpointInvokable for EchoComponent {
    fn invoke_endpoint(&self, endpoint_path: &str, args: EndpointArgs) -> Result<Value, GatewayError> {
        let args = match args {
            EndpointArgs::Positional(values) => Value::Array(values),
            EndpointArgs::Params(map) => Value::Object(map),
        };
        Ok(json!({
            "component": self.name,
            "endpoint": endpoint_path,
            "args": args,
        }))
    }
}

struct DemoFactory;

impl ComponentFactory for DemoFactory {
    fn instance_by_config(
        &self,
        config: &ComponentConfig,
    ) -> Result<Arc<dyn EndpointInvokable>, GatewayError> {
        let name = config.0["name"]
            .as_str()
            .ok_or_else(|| GatewayError::Component("config is missing a name".to_string()))?;
        Ok(Arc::new(EchoComponent {
            name: name.to_string(),
        }))
    }
}

struct DemoAssets;

impl AssetSource for DemoAssets {
    fn ext_js(&self, csrf_token: Option<&str>) -> String {
        format!(
            "Ext.ns('Netzke');Netzke.csrfToken={};",
            serde_json::to_string(csrf_token.unwrap_or_default()).unwrap_or_default()
        )
    }
    fn ext_css(&self) -> String {
        "/* netzke ext styles */".to_string()
    }
    fn touch_js(&self) -> String {
        "Ext.ns('Netzke');".to_string()
    }
    fn touch_css(&self) -> String {
        "/* netzke touch styles */".to_string()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("netzke_gateway={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        anyhow::bail!("Configuration error: {}", e);
    }

    info!("======================================");
    info!("  Netzke Gateway");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    match args.upstream_url {
        Some(ref url) => info!("Upstream: {}", url),
        None => info!("Upstream: none (404 for non-netzke paths)"),
    }
    info!("======================================");

    let sessions = Arc::new(SessionStore::new(args.session_ttl_seconds));

    if args.dev_mode {
        // Pre-register an echo component under a well-known session id so
        // the protocol can be poked with curl:
        //   curl -b netzke_session=sess_dev -d '{"act":"echo","method":"SayHello","tid":1}' \
        //     http://localhost:8080/netzke/direct
        let (_, session) = sessions.create();
        session
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .components
            .insert("echo".to_string(), ComponentConfig(json!({"name": "echo"})));
        sessions.insert("sess_dev", session);
        info!("Dev mode: component 'echo' registered under session 'sess_dev'");
    }

    let state = Arc::new(AppState {
        args,
        sessions: Some(sessions),
        factory: Arc::new(DemoFactory),
        assets: Arc::new(DemoAssets),
    });

    server::run(state).await?;
    Ok(())
}
