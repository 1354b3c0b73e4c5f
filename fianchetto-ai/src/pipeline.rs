//! 评估管线
//!
//! 两步合成，顺序严格：先取可选的神经评分（失败以 0 代替），
//! 再以该评分调用必需的解释服务。第二步的请求体嵌入第一步的
//! 结果，因此两步不能并行。

use async_trait::async_trait;
use protocol::{EvalError, Evaluate, EvaluationResult, Position};
use tracing::{debug, warn};

use crate::error::UpstreamError;

/// 神经评分来源
#[async_trait]
pub trait ScoreSource: Send + Sync {
    /// 获取局面的 centipawn 评分
    async fn score(&self, fen: &str) -> Result<i32, UpstreamError>;
}

/// 解释来源
#[async_trait]
pub trait ExplainSource: Send + Sync {
    /// 以局面和神经评分生成合成评估
    async fn explain(&self, fen: &str, fianchetto_eval: i32) -> Result<EvaluationResult, UpstreamError>;
}

/// 评估管线
///
/// 评分服务失败被吞掉；解释服务失败使整个 evaluate 调用失败。
pub struct EvaluationPipeline<S, X> {
    scorer: S,
    explainer: X,
}

impl<S, X> EvaluationPipeline<S, X> {
    pub fn new(scorer: S, explainer: X) -> Self {
        Self { scorer, explainer }
    }
}

#[async_trait]
impl<S, X> Evaluate for EvaluationPipeline<S, X>
where
    S: ScoreSource,
    X: ExplainSource,
{
    async fn evaluate(&self, position: &Position) -> Result<EvaluationResult, EvalError> {
        let fen = position.fen();

        // 第一步：可选的神经评分，失败以中性分 0 代替
        let fianchetto_eval = match self.scorer.score(&fen).await {
            Ok(score) => score,
            Err(e) => {
                warn!("neural service not available, using 0 evaluation: {}", e);
                0
            }
        };

        debug!("evaluating position with fianchetto_eval={}", fianchetto_eval);

        // 第二步：必需的解释服务，携带第一步的评分
        self.explainer
            .explain(&fen, fianchetto_eval)
            .await
            .map_err(|e| EvalError::ExplanationUnavailable {
                reason: e.to_string(),
            })
    }
}
