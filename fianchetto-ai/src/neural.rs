//! 神经评分服务客户端
//!
//! 调用推理服务获取局面的 centipawn 评分。
//! 该服务是可选依赖：调用失败由评估管线以中性分 0 代替。

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::UpstreamError;
use crate::pipeline::ScoreSource;

/// 神经评分服务配置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NeuralConfig {
    /// 服务地址，默认 http://localhost:8000
    pub base_url: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 5,
        }
    }
}

/// 评分请求体
#[derive(Serialize)]
struct EvaluateRequest<'a> {
    fen: &'a str,
}

/// 评分响应体
#[derive(Deserialize)]
struct EvaluateResponse {
    /// centipawn 评分
    score: i32,
}

/// 神经评分客户端
pub struct NeuralClient {
    config: NeuralConfig,
    client: reqwest::Client,
}

impl NeuralClient {
    /// 创建新的评分客户端
    pub fn new(config: NeuralConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    /// 使用默认配置创建客户端
    pub fn with_defaults() -> Result<Self> {
        Self::new(NeuralConfig::default())
    }

    /// 检查评分服务是否可用
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context(format!("Neural service unreachable ({})", self.config.base_url))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            anyhow::bail!("Neural service returned status {}", resp.status())
        }
    }

    /// 获取当前配置
    pub fn config(&self) -> &NeuralConfig {
        &self.config
    }
}

#[async_trait]
impl ScoreSource for NeuralClient {
    async fn score(&self, fen: &str) -> Result<i32, UpstreamError> {
        let url = format!("{}/evaluate", self.config.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&EvaluateRequest { fen })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        let parsed: EvaluateResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamError::MalformedResponse {
                reason: e.to_string(),
            })?;

        debug!("neural score for position: {} cp", parsed.score);
        Ok(parsed.score)
    }
}
