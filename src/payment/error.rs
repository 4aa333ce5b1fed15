// ==========================================
// Marmita Express - 支付层错误类型
// ==========================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("支付渠道凭证未配置: {0}")]
    MissingCredentials(&'static str),

    #[error("支付请求无效: {0}")]
    InvalidRequest(String),

    /// 渠道返回非 2xx
    #[error("支付渠道拒绝: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP 错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("支付渠道响应无法解析: {0}")]
    InvalidResponse(String),
}

pub type PaymentResult<T> = Result<T, PaymentError>;
