//! Fianchetto 服务管线
//!
//! 包含:
//! - 上游 HTTP 客户端（神经评分、解释、走法服务）
//! - 评估管线（可选评分 + 必需解释的两步合成）
//! - 引擎走法获取（主服务失败时回退本地随机合法走法）

mod engine;
mod error;
mod explain;
mod neural;
mod pipeline;

pub use engine::{EngineMoveProvider, MoveClient, MoveConfig, MoveSource};
pub use error::UpstreamError;
pub use explain::{ExplainClient, ExplainConfig};
pub use neural::{NeuralClient, NeuralConfig};
pub use pipeline::{EvaluationPipeline, ExplainSource, ScoreSource};
