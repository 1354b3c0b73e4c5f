//! Fianchetto 网关服务端
//!
//! 包含:
//! - 无状态网关路由 (/explain, /move, /health)
//! - 对局会话状态机与会话管理 (/session/...)
//! - 服务配置

pub mod config;
pub mod routes;
pub mod session;

pub use config::ServerConfig;
pub use routes::{router, AppState};
pub use session::{GameSession, SessionError, SessionManager, SessionState, SessionView, TurnReport};
