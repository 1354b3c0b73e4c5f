//! 网关路由
//!
//! 两个无状态边界操作（/explain, /move）加会话接口。
//! 所有内部失败统一翻译为 `{"error": message}` 信封和
//! 相应的非 2xx 状态码。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use protocol::{Evaluate, EvaluationResult, MoveCode, MoveError, Position, ProvideMove};

use crate::session::{SessionError, SessionId, SessionManager, SessionView, TurnReport};

/// 路由共享状态
///
/// 评估与走法能力以抽象句柄注入：路由处理器和会话驱动
/// 共用同一组对象，会话编排不直接接触上游网络。
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<dyn Evaluate>,
    pub engine: Arc<dyn ProvideMove>,
    pub sessions: Arc<SessionManager>,
    pub default_depth: u8,
}

/// 构建路由表
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/explain", post(explain))
        .route("/move", post(engine_move))
        .route("/session", post(create_session))
        .route("/session/{id}", get(get_session))
        .route("/session/{id}/move", post(session_move))
        .route("/session/{id}/reset", post(reset_session))
        .route("/session/{id}/flip", post(flip_session))
        .with_state(state)
}

/// 统一错误信封
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match &e {
            SessionError::UnknownSession(_) => ApiError::NotFound(e.to_string()),
            SessionError::IllegalMove(_) | SessionError::GameOver => {
                ApiError::BadRequest(e.to_string())
            }
            SessionError::TurnInFlight | SessionError::StateConflict => {
                ApiError::Conflict(e.to_string())
            }
            SessionError::EngineFault(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct ExplainRequest {
    fen: Option<String>,
}

#[derive(Deserialize)]
struct EngineMoveRequest {
    fen: Option<String>,
    depth: Option<u8>,
}

#[derive(Serialize)]
struct EngineMoveReply {
    #[serde(rename = "move")]
    mv: Option<MoveCode>,
}

#[derive(Deserialize)]
struct SessionMoveRequest {
    #[serde(rename = "move")]
    mv: String,
    depth: Option<u8>,
}

fn parse_fen(fen: Option<String>) -> Result<Position, ApiError> {
    let fen = fen.ok_or_else(|| ApiError::BadRequest("FEN string required".to_string()))?;
    Position::from_fen(&fen).map_err(|e| ApiError::BadRequest(e.to_string()))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// 局面评估与解释 (POST /explain)
async fn explain(
    State(state): State<AppState>,
    Json(req): Json<ExplainRequest>,
) -> Result<Json<EvaluationResult>, ApiError> {
    let position = parse_fen(req.fen)?;
    let result = state
        .evaluator
        .evaluate(&position)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(result))
}

/// 引擎走法 (POST /move)
///
/// 终局不是错误：`move: null` 区分"对局结束所以引擎沉默"
/// 和"引擎坏了"。
async fn engine_move(
    State(state): State<AppState>,
    Json(req): Json<EngineMoveRequest>,
) -> Result<Json<EngineMoveReply>, ApiError> {
    let position = parse_fen(req.fen)?;
    let depth = req.depth.unwrap_or(state.default_depth);

    match state.engine.next_move(&position, depth).await {
        Ok(code) => {
            debug!("engine move for depth {}: {}", depth, code);
            Ok(Json(EngineMoveReply { mv: Some(code) }))
        }
        Err(MoveError::NoLegalMoves) => Ok(Json(EngineMoveReply { mv: None })),
    }
}

/// 新建会话 (POST /session)
async fn create_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.sessions.create())
}

/// 会话快照 (GET /session/{id})
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.view(id)?))
}

/// 执行完整的一轮 (POST /session/{id}/move)
async fn session_move(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(req): Json<SessionMoveRequest>,
) -> Result<Json<TurnReport>, ApiError> {
    let code = MoveCode::parse(&req.mv).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let depth = req.depth.unwrap_or(state.default_depth);

    let report = state
        .sessions
        .play_turn(
            id,
            &code,
            depth,
            state.evaluator.as_ref(),
            state.engine.as_ref(),
        )
        .await?;
    Ok(Json(report))
}

/// 重置会话 (POST /session/{id}/reset)
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.reset(id)?))
}

/// 翻转棋盘视角 (POST /session/{id}/flip)
async fn flip_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.flip(id)?))
}
