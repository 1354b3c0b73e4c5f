//! Fianchetto 网关入口
//!
//! 装配上游客户端、评估流水线、走法提供器和会话管理器，
//! 然后启动 HTTP 服务。

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use fianchetto_ai::{
    EngineMoveProvider, EvaluationPipeline, ExplainClient, ExplainConfig, MoveClient, MoveConfig,
    NeuralClient, NeuralConfig,
};
use fianchetto_server::routes::{router, AppState};
use fianchetto_server::session::SessionManager;
use fianchetto_server::ServerConfig;
use protocol::{Rules, StandardRules};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fianchetto_server=debug,fianchetto_ai=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        "upstreams: neural={} explain={} engine={}",
        config.neural_url, config.explain_url, config.engine_url
    );

    let neural = NeuralClient::new(NeuralConfig {
        base_url: config.neural_url.clone(),
        timeout_secs: config.upstream_timeout_secs,
    })?;
    let explain = ExplainClient::new(ExplainConfig {
        base_url: config.explain_url.clone(),
        timeout_secs: config.upstream_timeout_secs,
    })?;
    let engine = MoveClient::new(MoveConfig {
        base_url: config.engine_url.clone(),
        timeout_secs: config.upstream_timeout_secs,
    })?;

    // 启动时探活，三个上游都只警告不阻塞
    if let Err(e) = neural.health_check().await {
        warn!("neural service not reachable at startup: {}", e);
    }
    if let Err(e) = explain.health_check().await {
        warn!("explain service not reachable at startup: {}", e);
    }
    if let Err(e) = engine.health_check().await {
        warn!("move service not reachable at startup: {}", e);
    }

    let rules: Arc<dyn Rules> = Arc::new(StandardRules);
    let state = AppState {
        evaluator: Arc::new(EvaluationPipeline::new(neural, explain)),
        engine: Arc::new(EngineMoveProvider::new(engine, rules.clone())),
        sessions: Arc::new(SessionManager::new(rules)),
        default_depth: config.default_depth,
    };

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("fianchetto gateway listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}
