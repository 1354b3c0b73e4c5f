//! 上游调用错误

use thiserror::Error;

/// 单次上游 HTTP 调用的失败原因
///
/// 超时和网络错误都归入 [`UpstreamError::Request`]。
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// 请求失败（连接、超时等）
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 服务返回非 2xx 状态
    #[error("service returned status {status}")]
    BadStatus { status: u16 },

    /// 响应体无法解析
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}
