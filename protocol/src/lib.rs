//! Fianchetto 共享协议库
//!
//! 包含:
//! - 局面、走法编码等核心数据结构
//! - 规则能力抽象 (Rules trait) 及 shakmaty 实现
//! - 评估结果类型 (EvaluationResult)
//! - 服务能力抽象 (Evaluate, ProvideMove traits)
//! - 错误类型定义

mod error;
mod evaluation;
mod moves;
mod position;
mod rules;
mod service;

pub use error::{ChessError, EvalError, MoveError};
pub use evaluation::{Classification, EvaluationResult};
pub use moves::{MoveCode, VerboseMove};
pub use position::{GameStatus, Position, Side, INITIAL_FEN};
pub use rules::{Rules, StandardRules};
pub use service::{Evaluate, ProvideMove};
