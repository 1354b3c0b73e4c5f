//! 引擎走法获取
//!
//! 主路径调用外部走法服务；调用失败时回退为本地随机合法走法。
//! 活性优先于棋力：可选后端宕机不能让对局停滞。回退路径在日志
//! 中明确标记，便于与真实引擎回复区分。

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use protocol::{MoveCode, MoveError, Position, ProvideMove, Rules};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::UpstreamError;

/// 走法来源
#[async_trait]
pub trait MoveSource: Send + Sync {
    /// 请求外部引擎的最佳走法（紧凑编码）
    ///
    /// `Ok(None)` 表示服务认为局面无可走之着。
    async fn best_move(&self, fen: &str, depth: u8) -> Result<Option<String>, UpstreamError>;
}

/// 走法服务配置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveConfig {
    /// 服务地址，默认 http://localhost:8080
    pub base_url: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 5,
        }
    }
}

/// 走法请求体
#[derive(Serialize)]
struct MoveRequest<'a> {
    fen: &'a str,
    depth: u8,
}

/// 走法响应体
#[derive(Deserialize)]
struct MoveResponse {
    #[serde(rename = "move")]
    mv: Option<String>,
}

/// 走法服务客户端
pub struct MoveClient {
    config: MoveConfig,
    client: reqwest::Client,
}

impl MoveClient {
    /// 创建新的走法客户端
    pub fn new(config: MoveConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    /// 使用默认配置创建客户端
    pub fn with_defaults() -> Result<Self> {
        Self::new(MoveConfig::default())
    }

    /// 检查走法服务是否可用
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context(format!("Move service unreachable ({})", self.config.base_url))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            anyhow::bail!("Move service returned status {}", resp.status())
        }
    }

    /// 获取当前配置
    pub fn config(&self) -> &MoveConfig {
        &self.config
    }
}

#[async_trait]
impl MoveSource for MoveClient {
    async fn best_move(&self, fen: &str, depth: u8) -> Result<Option<String>, UpstreamError> {
        let url = format!("{}/move", self.config.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&MoveRequest { fen, depth })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        let parsed: MoveResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamError::MalformedResponse {
                reason: e.to_string(),
            })?;

        Ok(parsed.mv)
    }
}

/// 引擎走法提供者
///
/// 合法性校验不在此处做：主服务的回复原样传出，由会话的
/// 统一应用路径判定；语义非法的回复在那里成为会话故障。
pub struct EngineMoveProvider<M> {
    source: M,
    rules: Arc<dyn Rules>,
}

impl<M> EngineMoveProvider<M> {
    pub fn new(source: M, rules: Arc<dyn Rules>) -> Self {
        Self { source, rules }
    }
}

#[async_trait]
impl<M> ProvideMove for EngineMoveProvider<M>
where
    M: MoveSource,
{
    async fn next_move(&self, position: &Position, depth: u8) -> Result<MoveCode, MoveError> {
        // 无论主服务如何回答，零合法走法的局面都是 NoLegalMoves
        let legal = self.rules.legal_moves(position);
        if legal.is_empty() {
            return Err(MoveError::NoLegalMoves);
        }

        let fen = position.fen();
        match self.source.best_move(&fen, depth).await {
            Ok(Some(raw)) => match MoveCode::parse(&raw) {
                Ok(code) => {
                    info!("engine reply: {}", code);
                    return Ok(code);
                }
                Err(e) => {
                    warn!("engine service returned unparseable move {:?}: {}", raw, e);
                }
            },
            Ok(None) => {
                warn!("engine service returned no move for a position with legal moves");
            }
            Err(e) => {
                warn!("engine service request failed: {}", e);
            }
        }

        // 降级路径：均匀随机挑一个合法走法
        let mv = legal
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(MoveError::NoLegalMoves)?;
        warn!("falling back to random legal move: {}", mv.san);
        Ok(mv.code())
    }
}
