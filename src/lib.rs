// ==========================================
// Marmita Express - 核心库
// ==========================================
// 技术栈: axum + tokio + reqwest
// 系统定位: 促销套餐下单配置器 + 支付/消息网关
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 草稿、目录与类型
pub mod domain;

// 引擎层 - 选择/定价/阶段可见性
pub mod engine;

// 配置层 - 服务配置与定价参数
pub mod config;

// 支付层 - 支付渠道
pub mod payment;

// 消息层 - 支付回调转发
pub mod messaging;

// 地址查询层 - 邮编/反向地理编码
pub mod lookup;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 结账与地址查询
pub mod api;

// 应用层 - HTTP 服务
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{PaymentProviderKind, PostalCodeIssue, ProviderEnvironment, Stage};

// 领域实体
pub use domain::{Catalog, ContactInfo, DeliveryAddress, Money, OrderDraft, RegionCatalog};

// 引擎
pub use engine::{DraftSnapshot, OrderConfigurator, OrderIntent, PricingEngine, StageVisibility};

// API
pub use api::{AddressApi, CheckoutApi, CheckoutValidator};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Marmita Express";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "Marmita Express");
    }
}
