//! 评估结果类型
//!
//! 解释服务返回的合成评估：神经评分、Stockfish 对照分、
//! 分类、战略主题与自然语言解释。

use serde::{Deserialize, Serialize};

/// 局面分类（以走子方视角的 Stockfish 评分为准）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Winning,
    Losing,
    Equal,
}

/// 合成评估结果
///
/// 每次请求都完整生成，只替换不修改。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// 神经评分（centipawn；评分服务不可用时为 0）
    pub fianchetto_eval: i32,
    /// Stockfish 对照评分（centipawn）
    pub stockfish_eval: i32,
    /// 两者差值（centipawn）
    pub delta_cp: i32,
    /// 局面分类
    pub classification: Classification,
    /// 识别出的战略主题（有序）
    pub themes: Vec<String>,
    /// 自然语言解释
    pub explanation: String,
}
