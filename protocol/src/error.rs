//! 错误类型定义

use thiserror::Error;

/// 规则层错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 无效的走法编码
    #[error("Invalid move encoding: {input}")]
    InvalidMoveCode { input: String },

    /// 非法走法（规则拒绝）
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: String },
}

/// 评估服务错误
///
/// 神经评分服务失败会被管线内部吞掉（以 0 分代替），
/// 因此唯一向外传播的失败是解释服务不可用。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// 解释服务不可用，评估无法产出有意义的结果
    #[error("Explanation service unavailable: {reason}")]
    ExplanationUnavailable { reason: String },
}

/// 走法服务错误
///
/// 主服务失败会回退到本地随机合法走法，
/// 因此唯一向外传播的失败是局面已无合法走法。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// 局面没有合法走法（终局）
    #[error("No legal moves in position")]
    NoLegalMoves,
}
