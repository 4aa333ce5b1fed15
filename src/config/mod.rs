// ==========================================
// Marmita Express - 配置层
// ==========================================
// 职责: 服务配置、支付/消息凭据、套餐定价参数
// 来源: 环境变量 > JSON 配置文件 > 默认值
// ==========================================

pub mod config_manager;
pub mod pricing_profile;

// 重导出核心配置管理器
pub use config_manager::{config_keys, get_default_config_path, ConfigError, ConfigManager, ConfigResult};
pub use pricing_profile::PricingProfile;
