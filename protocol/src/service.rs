//! 服务能力抽象
//!
//! 提供 Evaluate/ProvideMove traits 使对局会话与具体的
//! 上游网络实现解耦，便于测试时替换为内存实现。

use async_trait::async_trait;

use crate::error::{EvalError, MoveError};
use crate::evaluation::EvaluationResult;
use crate::moves::MoveCode;
use crate::position::Position;

/// 局面评估能力
#[async_trait]
pub trait Evaluate: Send + Sync {
    /// 评估局面，返回合成的评估+解释结果
    ///
    /// 对有效局面只在解释服务不可用时失败。
    async fn evaluate(&self, position: &Position) -> Result<EvaluationResult, EvalError>;
}

/// 引擎走法获取能力
#[async_trait]
pub trait ProvideMove: Send + Sync {
    /// 获取局面的下一步走法
    ///
    /// 只要局面存在合法走法就保证返回一个走法；
    /// 否则返回 [`MoveError::NoLegalMoves`]。
    async fn next_move(&self, position: &Position, depth: u8) -> Result<MoveCode, MoveError>;
}
