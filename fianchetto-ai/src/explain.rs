//! 解释服务客户端
//!
//! 调用解释服务生成合成评估：请求体携带局面 FEN 和
//! 第一步得到的神经评分（真实或中性替代值）。

use anyhow::{Context, Result};
use async_trait::async_trait;
use protocol::EvaluationResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::UpstreamError;
use crate::pipeline::ExplainSource;

/// 解释服务配置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// 服务地址，默认 http://localhost:8001
    pub base_url: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_secs: 5,
        }
    }
}

/// 解释请求体
#[derive(Serialize)]
struct ExplainRequest<'a> {
    fen: &'a str,
    fianchetto_eval: i32,
}

/// 解释服务客户端
pub struct ExplainClient {
    config: ExplainConfig,
    client: reqwest::Client,
}

impl ExplainClient {
    /// 创建新的解释客户端
    pub fn new(config: ExplainConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    /// 使用默认配置创建客户端
    pub fn with_defaults() -> Result<Self> {
        Self::new(ExplainConfig::default())
    }

    /// 检查解释服务是否可用
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context(format!("Explain service unreachable ({})", self.config.base_url))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            anyhow::bail!("Explain service returned status {}", resp.status())
        }
    }

    /// 获取当前配置
    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }
}

#[async_trait]
impl ExplainSource for ExplainClient {
    async fn explain(&self, fen: &str, fianchetto_eval: i32) -> Result<EvaluationResult, UpstreamError> {
        let url = format!("{}/explain", self.config.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&ExplainRequest {
                fen,
                fianchetto_eval,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        let parsed: EvaluationResult =
            serde_json::from_str(&body).map_err(|e| UpstreamError::MalformedResponse {
                reason: e.to_string(),
            })?;

        debug!(
            "explanation received: classification={:?}, themes={}",
            parsed.classification,
            parsed.themes.len()
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExplainConfig::default();
        assert_eq!(config.base_url, "http://localhost:8001");
    }

    #[test]
    fn test_client_creation() {
        assert!(ExplainClient::with_defaults().is_ok());
    }
}
