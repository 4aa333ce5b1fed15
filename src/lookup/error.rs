// ==========================================
// Marmita Express - 地址查询错误类型
// ==========================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("查询输入无效: {0}")]
    InvalidInput(String),

    #[error("查询服务返回错误状态: {0}")]
    Status(u16),

    #[error("HTTP 错误: {0}")]
    Http(#[from] reqwest::Error),
}

pub type LookupResult<T> = Result<T, LookupError>;
