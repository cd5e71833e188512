//! corsgate-server: serves a small demonstration GraphQL schema behind the
//! CORS-aware dispatcher.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_graphql::{Context, EmptyMutation, EmptySubscription, Object};
use clap::Parser;
use corsgate_core::ResolverContext;
use corsgate_server::network::{NetworkConfig, NetworkModule};
use corsgate_server::service::{DispatchConfig, Dispatcher, QueryLimits};
use corsgate_server::StaticSchemaGenerator;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "corsgate-server", version, about = "CORS-aware GraphQL server")]
struct Args {
    /// Address to bind.
    #[arg(long, env = "CORSGATE_HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to listen on. 0 picks a free port.
    #[arg(long, env = "CORSGATE_PORT", default_value_t = 4000)]
    port: u16,
    /// Path the GraphQL endpoint is mounted at.
    #[arg(long, env = "CORSGATE_GRAPHQL_PATH", default_value = "/graphql")]
    graphql_path: String,
    /// Largest accepted request body, in bytes.
    #[arg(long, env = "CORSGATE_MAX_BODY_SIZE", default_value_t = 2 * 1024 * 1024)]
    max_body_size: usize,
    /// Include internal error details in responses.
    #[arg(long, env = "CORSGATE_DEBUG_ERRORS")]
    debug_errors: bool,
    #[arg(long, env = "CORSGATE_MAX_QUERY_DEPTH", default_value_t = 20)]
    max_query_depth: usize,
    #[arg(long, env = "CORSGATE_MAX_QUERY_COMPLEXITY", default_value_t = 300)]
    max_query_complexity: usize,
    /// Emit logs as JSON lines.
    #[arg(long, env = "CORSGATE_LOG_JSON")]
    log_json: bool,
    /// Seconds to wait for in-flight requests on shutdown.
    #[arg(long, env = "CORSGATE_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    drain_timeout_secs: u64,
}

struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Liveness check through the GraphQL stack.
    async fn ping(&self) -> String {
        "pong".to_string()
    }

    /// Returns its argument unchanged.
    async fn echo(&self, text: String) -> String {
        text
    }

    /// Identifier of the HTTP request carrying this query.
    async fn request_id(&self, ctx: &Context<'_>) -> Option<String> {
        ctx.data_opt::<ResolverContext>()
            .and_then(|c| c.request_id.clone())
    }
}

fn setup_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = installed {
        warn!(error = %err, "global tracing subscriber already set, keeping it");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "failed to install Ctrl-C handler");
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing(args.log_json);
    info!(?args, "starting corsgate-server");

    let schema = async_graphql::Schema::new(QueryRoot, EmptyMutation, EmptySubscription);
    let dispatch_config = DispatchConfig {
        debug_errors: args.debug_errors,
        query_limits: QueryLimits {
            max_depth: args.max_query_depth,
            max_complexity: args.max_query_complexity,
        },
        ..DispatchConfig::default()
    };
    let generator = Arc::new(StaticSchemaGenerator::new(schema));
    let dispatcher = Dispatcher::new(generator, &dispatch_config);

    let network_config = NetworkConfig {
        host: args.host,
        port: args.port,
        graphql_path: args.graphql_path,
        max_body_size: args.max_body_size,
        drain_timeout: Duration::from_secs(args.drain_timeout_secs),
    };
    let mut network = NetworkModule::new(network_config, dispatcher);
    network.start().await.context("failed to bind listener")?;
    network.serve(shutdown_signal()).await?;

    info!("shutdown complete");
    Ok(())
}
