// ==========================================
// Marmita Express - 消息层错误类型
// ==========================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("消息通道未配置: {0}")]
    NotConfigured(&'static str),

    #[error("消息 API 错误: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP 错误: {0}")]
    Http(#[from] reqwest::Error),
}

pub type MessagingResult<T> = Result<T, MessagingError>;
