// ==========================================
// Marmita Express - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把各层技术错误转换为用户可读的错误消息
// 说明: 本层不依赖 HTTP 框架，状态码由 status_code() 给出
// ==========================================

use crate::engine::error::DraftError;
use crate::lookup::error::LookupError;
use crate::messaging::error::MessagingError;
use crate::payment::error::PaymentError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("草稿操作失败: {0}")]
    Draft(#[from] DraftError),

    /// 结账前校验失败（带全部违规字段）
    #[error("结账校验失败: {reason}")]
    CheckoutValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    // ==========================================
    // 外部服务错误
    // ==========================================
    #[error("支付渠道凭证未配置: {0}")]
    MissingCredentials(String),

    /// 支付会话创建失败（不重试）
    #[error("创建支付失败: status={status}, message={message}")]
    PaymentSessionFailed { status: u16, message: String },

    #[error("回调转发失败: {0}")]
    RelayFailed(String),

    #[error("地址查询失败: {0}")]
    LookupFailed(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Draft(DraftError::StageLocked(_)) | ApiError::Draft(DraftError::NotStarted) => 409,
            ApiError::Draft(_) => 400,
            ApiError::CheckoutValidationError { .. } => 422,
            ApiError::MissingCredentials(_) => 500,
            ApiError::PaymentSessionFailed { status, .. } if (400..600).contains(status) => *status,
            ApiError::PaymentSessionFailed { .. } => 502,
            ApiError::RelayFailed(_) | ApiError::LookupFailed(_) => 502,
            ApiError::InternalError(_) | ApiError::Other(_) => 500,
        }
    }

    /// 面向用户的消息键（None 表示直接使用错误文本）
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            ApiError::CheckoutValidationError { .. } => Some("validation.summary"),
            ApiError::MissingCredentials(_) => Some("payment.missing_credentials"),
            ApiError::RelayFailed(_) => Some("webhook.relay_failed"),
            ApiError::InternalError(_) | ApiError::Other(_) => Some("common.internal_error"),
            _ => None,
        }
    }
}

// ==========================================
// 从 PaymentError 转换
// ==========================================
impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::MissingCredentials(which) => ApiError::MissingCredentials(which.to_string()),
            PaymentError::InvalidRequest(msg) => ApiError::InvalidInput(msg),
            PaymentError::Rejected { status, message } => {
                ApiError::PaymentSessionFailed { status, message }
            }
            PaymentError::Http(e) => ApiError::PaymentSessionFailed {
                status: 502,
                message: e.to_string(),
            },
            PaymentError::InvalidResponse(msg) => ApiError::PaymentSessionFailed {
                status: 502,
                message: msg,
            },
        }
    }
}

impl From<MessagingError> for ApiError {
    fn from(err: MessagingError) -> Self {
        ApiError::RelayFailed(err.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            other => ApiError::LookupFailed(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 结账表单字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    Items,
    Name,
    PostalCode,
    Street,
    Number,
    Phone,
    TaxId,
}

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub field: CheckoutField,
    /// 已翻译的提示
    pub reason: String,
}
