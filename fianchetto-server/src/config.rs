//! 服务配置
//!
//! 上游服务地址从环境变量读取（与部署环境解耦），
//! 未设置时使用本地默认端口。

use serde::{Deserialize, Serialize};

/// 网关配置
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 神经评分服务地址
    pub neural_url: String,
    /// 解释服务地址
    pub explain_url: String,
    /// 走法服务地址
    pub engine_url: String,
    /// 未指定时的默认搜索深度
    pub default_depth: u8,
    /// 上游请求超时（秒）
    pub upstream_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            neural_url: "http://localhost:8000".to_string(),
            explain_url: "http://localhost:8001".to_string(),
            engine_url: "http://localhost:8080".to_string(),
            default_depth: 5,
            upstream_timeout_secs: 5,
        }
    }
}

impl ServerConfig {
    /// 从环境变量构建配置
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("FIANCHETTO_HOST", defaults.host),
            port: env_parsed("FIANCHETTO_PORT", defaults.port),
            neural_url: env_or("NEURAL_URL", defaults.neural_url),
            explain_url: env_or("EXPLAIN_URL", defaults.explain_url),
            engine_url: env_or("ENGINE_URL", defaults.engine_url),
            default_depth: env_parsed("FIANCHETTO_DEPTH", defaults.default_depth),
            upstream_timeout_secs: env_parsed(
                "FIANCHETTO_UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout_secs,
            ),
        }
    }

    /// 监听地址字符串
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
