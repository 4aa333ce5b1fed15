// ==========================================
// Marmita Express - API 层
// ==========================================
// 职责: 结账校验、支付会话创建、地址查询，供 HTTP 处理器与前端渲染层调用
// ==========================================

pub mod address_api;
pub mod checkout_api;
pub mod error;
pub mod validator;

// 重导出核心类型
pub use address_api::AddressApi;
pub use checkout_api::{
    CheckoutApi, CheckoutGateway, HttpCheckoutGateway, CREATE_PAYMENT_PATH, PAYMENT_WEBHOOK_PATH,
};
pub use error::{ApiError, ApiResult, CheckoutField, ValidationViolation};
pub use validator::{is_valid_brazilian_phone, is_valid_cpf, CheckoutValidator};
