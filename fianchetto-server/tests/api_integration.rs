//! 网关 API 集成测试
//!
//! 用伪造的上游来源装配真实的评估管线和走法提供器，
//! 通过 oneshot 请求验证各路由的状态码和响应体。

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use fianchetto_ai::{
    EngineMoveProvider, EvaluationPipeline, ExplainSource, MoveSource, ScoreSource, UpstreamError,
};
use fianchetto_server::routes::{router, AppState};
use fianchetto_server::session::SessionManager;
use protocol::{Classification, EvaluationResult, Rules, StandardRules};

/// 评分服务宕机
struct FailScorer;

#[async_trait]
impl ScoreSource for FailScorer {
    async fn score(&self, _fen: &str) -> Result<i32, UpstreamError> {
        Err(UpstreamError::BadStatus { status: 503 })
    }
}

/// 固定模板的解释服务
struct TemplateExplainer;

#[async_trait]
impl ExplainSource for TemplateExplainer {
    async fn explain(
        &self,
        _fen: &str,
        fianchetto_eval: i32,
    ) -> Result<EvaluationResult, UpstreamError> {
        Ok(EvaluationResult {
            fianchetto_eval,
            stockfish_eval: 15,
            delta_cp: fianchetto_eval - 15,
            classification: Classification::Equal,
            themes: vec!["development".to_string()],
            explanation: "Both sides are developing normally.".to_string(),
        })
    }
}

/// 解释服务宕机
struct FailExplainer;

#[async_trait]
impl ExplainSource for FailExplainer {
    async fn explain(
        &self,
        _fen: &str,
        _fianchetto_eval: i32,
    ) -> Result<EvaluationResult, UpstreamError> {
        Err(UpstreamError::BadStatus { status: 500 })
    }
}

/// 走法服务宕机
struct DownEngine;

#[async_trait]
impl MoveSource for DownEngine {
    async fn best_move(&self, _fen: &str, _depth: u8) -> Result<Option<String>, UpstreamError> {
        Err(UpstreamError::BadStatus { status: 502 })
    }
}

/// 固定回复的走法服务
struct ScriptedEngine(&'static str);

#[async_trait]
impl MoveSource for ScriptedEngine {
    async fn best_move(&self, _fen: &str, _depth: u8) -> Result<Option<String>, UpstreamError> {
        Ok(Some(self.0.to_string()))
    }
}

fn app_with<X, M>(explainer: X, engine: M) -> axum::Router
where
    X: ExplainSource + 'static,
    M: MoveSource + 'static,
{
    let rules: Arc<dyn Rules> = Arc::new(StandardRules);
    let state = AppState {
        evaluator: Arc::new(EvaluationPipeline::new(FailScorer, explainer)),
        engine: Arc::new(EngineMoveProvider::new(engine, rules.clone())),
        sessions: Arc::new(SessionManager::new(rules)),
        default_depth: 5,
    };
    router(state)
}

fn app() -> axum::Router {
    app_with(TemplateExplainer, DownEngine)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const STALEMATE_FEN: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_explain_requires_fen() {
    let response = app()
        .oneshot(post_json("/explain", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "FEN string required");
}

#[tokio::test]
async fn test_explain_rejects_invalid_fen() {
    let response = app()
        .oneshot(post_json("/explain", json!({ "fen": "not a position" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_explain_substitutes_neutral_score_when_scorer_down() {
    // 评分服务宕机（FailScorer），解释照常返回，评分为中性 0
    let response = app()
        .oneshot(post_json("/explain", json!({ "fen": INITIAL_FEN })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["fianchetto_eval"], 0);
    assert_eq!(body["classification"], "equal");
    assert!(!body["explanation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_explain_propagates_explainer_failure() {
    let response = app_with(FailExplainer, DownEngine)
        .oneshot(post_json("/explain", json!({ "fen": INITIAL_FEN })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_move_falls_back_when_engine_down() {
    // 走法服务宕机：仍返回 200 和一个合法走法
    let response = app()
        .oneshot(post_json("/move", json!({ "fen": INITIAL_FEN })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let mv = body["move"].as_str().expect("fallback move expected");

    let rules = StandardRules;
    let position = protocol::Position::from_fen(INITIAL_FEN).unwrap();
    assert!(rules
        .legal_moves(&position)
        .iter()
        .any(|m| m.code().as_str() == mv));
}

#[tokio::test]
async fn test_move_returns_null_on_terminal_position() {
    let response = app()
        .oneshot(post_json("/move", json!({ "fen": STALEMATE_FEN })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["move"].is_null());
}

#[tokio::test]
async fn test_move_rejects_invalid_fen() {
    let response = app()
        .oneshot(post_json("/move", json!({ "fen": "garbage" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_full_ply() {
    let app = app_with(TemplateExplainer, ScriptedEngine("e7e5"));

    let response = app
        .clone()
        .oneshot(post_json("/session", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["fen"], INITIAL_FEN);
    assert_eq!(created["state"], "human_turn");

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/session/{}/move", id),
            json!({ "move": "e2e4" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;

    // 一轮结束：双方各走一步，回到等待人类输入
    assert_eq!(report["history"], json!(["e4", "e5"]));
    assert_eq!(report["state"], "human_turn");
    assert_eq!(report["engine_move"]["san"], "e5");
    assert_eq!(report["evaluation"]["fianchetto_eval"], 0);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/session/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = json_body(response).await;
    assert_eq!(view["history"], json!(["e4", "e5"]));
}

#[tokio::test]
async fn test_session_rejects_illegal_move() {
    let app = app_with(TemplateExplainer, ScriptedEngine("e7e5"));

    let created = json_body(
        app.clone()
            .oneshot(post_json("/session", json!({})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_u64().unwrap();

    let response = app
        .oneshot(post_json(
            &format!("/session/{}/move", id),
            json!({ "move": "e2e5" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Illegal move"));
}

#[tokio::test]
async fn test_session_reset_and_flip() {
    let app = app_with(TemplateExplainer, ScriptedEngine("e7e5"));

    let created = json_body(
        app.clone()
            .oneshot(post_json("/session", json!({})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_u64().unwrap();

    app.clone()
        .oneshot(post_json(
            &format!("/session/{}/move", id),
            json!({ "move": "e2e4" }),
        ))
        .await
        .unwrap();

    let reset = json_body(
        app.clone()
            .oneshot(post_json(&format!("/session/{}/reset", id), json!({})))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(reset["fen"], INITIAL_FEN);
    assert_eq!(reset["history"], json!([]));

    let flipped = json_body(
        app.oneshot(post_json(&format!("/session/{}/flip", id), json!({})))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(flipped["orientation"], "black");
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/session/4242")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
