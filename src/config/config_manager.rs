// ==========================================
// Marmita Express - 配置管理器
// ==========================================
// 职责: 配置加载、查询、默认值管理
// 来源优先级: 环境变量 > 配置文件(JSON) > 内置默认值
// ==========================================

use crate::config::pricing_profile::PricingProfile;
use crate::domain::types::{PaymentProviderKind, ProviderEnvironment};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置层错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: path={path}, {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置值无效: key={key}, value={value}, {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    values: HashMap<String, String>,
    use_env: bool,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 从默认位置加载配置
    ///
    /// # 位置
    /// - MARMITA_CONFIG 环境变量指定的文件
    /// - 否则 {config_dir}/marmita-express/config.json（不存在时仅使用默认值）
    pub fn new() -> ConfigResult<Self> {
        match std::env::var("MARMITA_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => {
                let path = get_default_config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    tracing::info!("配置文件不存在，使用默认值: {}", path.display());
                    Ok(Self {
                        values: HashMap::new(),
                        use_env: true,
                        source_path: None,
                    })
                }
            }
        }
    }

    /// 从指定 JSON 文件加载（文件必须存在）
    ///
    /// # 格式
    /// 顶层 JSON 对象；字符串值原样保存，其他值保存其 JSON 文本
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)?;
        let values = parsed
            .into_iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect();

        tracing::info!("已加载配置文件: {}", path.display());

        Ok(Self {
            values,
            use_env: true,
            source_path: Some(path.to_path_buf()),
        })
    }

    /// 从内存键值构造（不读取环境变量，供测试与嵌入使用）
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            use_env: false,
            source_path: None,
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// 读取配置值
    ///
    /// # 查找顺序
    /// 1. 环境变量（键名大写、'.' 替换为 '_'，如 payment.provider → PAYMENT_PROVIDER）
    /// 2. 历史环境变量别名（如 DLOCAL_API_KEY）
    /// 3. 配置文件
    fn get_config_value(&self, key: &str) -> Option<String> {
        if self.use_env {
            let env_key = key.to_uppercase().replace('.', "_");
            if let Ok(v) = std::env::var(&env_key) {
                return Some(v);
            }
            if let Some(alias) = config_keys::legacy_env_alias(key) {
                if let Ok(v) = std::env::var(alias) {
                    return Some(v);
                }
            }
        }
        self.values.get(key).cloned()
    }

    /// 读取配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Option<String> {
        self.get_config_value(key)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// 可选的非空配置值（密钥类）
    fn get_optional(&self, key: &str) -> Option<String> {
        self.get_config_value(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key).filter(|v| !v.trim().is_empty()) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// 获取所有配置的快照（JSON格式，密钥类字段脱敏）
    ///
    /// # 用途
    /// - 启动日志中输出生效配置
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let mut snapshot: BTreeMap<&str, String> = BTreeMap::new();
        for key in config_keys::ALL {
            if let Some(value) = self.get_config_value(key) {
                let shown = if config_keys::is_secret(key) {
                    "***".to_string()
                } else {
                    value
                };
                snapshot.insert(key, shown);
            }
        }
        Ok(serde_json::to_string(&json!(snapshot))?)
    }

    // ===== 服务 =====

    /// HTTP 监听地址
    ///
    /// # 默认值
    /// - 0.0.0.0:8888
    pub fn get_bind_addr(&self) -> String {
        self.get_config_or_default(config_keys::SERVER_BIND_ADDR, "0.0.0.0:8888")
    }

    /// 对外访问的站点根地址（用于拼接回调地址）
    pub fn get_public_base_url(&self) -> String {
        self.get_config_or_default(config_keys::PUBLIC_BASE_URL, "http://localhost:8888")
            .trim_end_matches('/')
            .to_string()
    }

    /// 默认语言
    pub fn get_default_locale(&self) -> String {
        self.get_config_or_default(config_keys::DEFAULT_LOCALE, "pt-BR")
    }

    // ===== 支付 =====

    /// 支付渠道
    ///
    /// # 默认值
    /// - dlocal_go
    pub fn get_payment_provider(&self) -> ConfigResult<PaymentProviderKind> {
        self.get_parsed(config_keys::PAYMENT_PROVIDER, PaymentProviderKind::DlocalGo)
    }

    /// 支付渠道环境（sandbox / production）
    pub fn get_payment_environment(&self) -> ProviderEnvironment {
        ProviderEnvironment::parse(&self.get_config_or_default(config_keys::PAYMENT_ENV, "production"))
    }

    pub fn get_dlocal_api_key(&self) -> Option<String> {
        self.get_optional(config_keys::DLOCAL_API_KEY)
    }

    pub fn get_dlocal_api_secret(&self) -> Option<String> {
        self.get_optional(config_keys::DLOCAL_API_SECRET)
    }

    pub fn get_mercadopago_access_token(&self) -> Option<String> {
        self.get_optional(config_keys::MERCADOPAGO_ACCESS_TOKEN)
    }

    /// 支付渠道 API 地址覆盖（测试/代理场景）
    pub fn get_payment_base_url(&self) -> Option<String> {
        self.get_optional(config_keys::PAYMENT_BASE_URL)
    }

    pub fn get_success_url(&self) -> String {
        self.get_config_or_default(config_keys::SUCCESS_URL, "https://example.com/success")
    }

    pub fn get_back_url(&self) -> String {
        self.get_config_or_default(config_keys::BACK_URL, "https://example.com/")
    }

    pub fn get_currency(&self) -> String {
        self.get_config_or_default(config_keys::CURRENCY, "BRL")
    }

    pub fn get_country(&self) -> String {
        self.get_config_or_default(config_keys::COUNTRY, "BR")
    }

    /// 店铺名称（用于支付描述）
    pub fn get_store_name(&self) -> String {
        self.get_config_or_default(config_keys::STORE_NAME, "Marmitaria Express")
    }

    /// 出站 HTTP 超时（毫秒）
    ///
    /// # 默认值
    /// - 10000
    pub fn get_http_timeout_ms(&self) -> ConfigResult<u64> {
        self.get_parsed(config_keys::HTTP_TIMEOUT_MS, 10_000)
    }

    // ===== 消息通知 =====

    pub fn get_messaging_api_url(&self) -> Option<String> {
        self.get_optional(config_keys::MESSAGING_API_URL)
    }

    pub fn get_messaging_api_token(&self) -> Option<String> {
        self.get_optional(config_keys::MESSAGING_API_TOKEN)
    }

    /// 接收通知的 WhatsApp 号码（含国家码）
    pub fn get_notify_number(&self) -> Option<String> {
        self.get_optional(config_keys::NOTIFY_NUMBER)
    }

    // ===== 地址查询 =====

    pub fn get_postal_lookup_base_url(&self) -> String {
        self.get_config_or_default(config_keys::POSTAL_LOOKUP_BASE_URL, "https://viacep.com.br/ws")
    }

    pub fn get_geocoder_base_url(&self) -> String {
        self.get_config_or_default(
            config_keys::GEOCODER_BASE_URL,
            "https://nominatim.openstreetmap.org",
        )
    }

    pub fn get_ip_locator_url(&self) -> String {
        self.get_config_or_default(config_keys::IP_LOCATOR_URL, "https://ipapi.co/json/")
    }

    // ===== 目录 =====

    /// 州/城市目录文件；未配置时使用内置目录
    pub fn get_regions_path(&self) -> Option<PathBuf> {
        self.get_optional(config_keys::REGIONS_PATH).map(PathBuf::from)
    }

    // ===== 定价 =====

    /// 获取套餐定价参数
    ///
    /// # 说明
    /// 配置格式为 JSON: {"unit_price": 2490, "tiers": {"3": 6490, "4": 8490}, "dessert_price": 290}
    /// 如果配置不存在，返回内置促销价
    pub fn get_pricing_profile(&self) -> ConfigResult<PricingProfile> {
        match self.get_optional(config_keys::PRICING_PROFILE) {
            None => Ok(PricingProfile::default()),
            Some(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }
}

/// 默认配置文件路径
pub fn get_default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marmita-express")
        .join("config.json")
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 服务
    pub const SERVER_BIND_ADDR: &str = "server.bind_addr";
    pub const PUBLIC_BASE_URL: &str = "server.public_base_url";
    pub const DEFAULT_LOCALE: &str = "server.default_locale";
    pub const HTTP_TIMEOUT_MS: &str = "http.timeout_ms";

    // 支付
    pub const PAYMENT_PROVIDER: &str = "payment.provider";
    pub const PAYMENT_ENV: &str = "payment.env";
    pub const PAYMENT_BASE_URL: &str = "payment.base_url";
    pub const DLOCAL_API_KEY: &str = "payment.dlocal.api_key";
    pub const DLOCAL_API_SECRET: &str = "payment.dlocal.api_secret";
    pub const MERCADOPAGO_ACCESS_TOKEN: &str = "payment.mercadopago.access_token";
    pub const SUCCESS_URL: &str = "payment.success_url";
    pub const BACK_URL: &str = "payment.back_url";
    pub const CURRENCY: &str = "payment.currency";
    pub const COUNTRY: &str = "payment.country";
    pub const STORE_NAME: &str = "store.name";

    // 消息通知
    pub const MESSAGING_API_URL: &str = "messaging.api_url";
    pub const MESSAGING_API_TOKEN: &str = "messaging.api_token";
    pub const NOTIFY_NUMBER: &str = "messaging.notify_number";

    // 地址查询
    pub const POSTAL_LOOKUP_BASE_URL: &str = "lookup.postal_base_url";
    pub const GEOCODER_BASE_URL: &str = "lookup.geocoder_base_url";
    pub const IP_LOCATOR_URL: &str = "lookup.ip_locator_url";

    // 目录
    pub const REGIONS_PATH: &str = "catalog.regions_path"; // 州/城市目录 JSON 文件

    // 定价
    pub const PRICING_PROFILE: &str = "pricing_profile"; // 套餐定价 (JSON)

    pub const ALL: &[&str] = &[
        SERVER_BIND_ADDR,
        PUBLIC_BASE_URL,
        DEFAULT_LOCALE,
        HTTP_TIMEOUT_MS,
        PAYMENT_PROVIDER,
        PAYMENT_ENV,
        PAYMENT_BASE_URL,
        DLOCAL_API_KEY,
        DLOCAL_API_SECRET,
        MERCADOPAGO_ACCESS_TOKEN,
        SUCCESS_URL,
        BACK_URL,
        CURRENCY,
        COUNTRY,
        STORE_NAME,
        MESSAGING_API_URL,
        MESSAGING_API_TOKEN,
        NOTIFY_NUMBER,
        POSTAL_LOOKUP_BASE_URL,
        GEOCODER_BASE_URL,
        IP_LOCATOR_URL,
        REGIONS_PATH,
        PRICING_PROFILE,
    ];

    /// 历史部署使用的环境变量名
    pub fn legacy_env_alias(key: &str) -> Option<&'static str> {
        match key {
            DLOCAL_API_KEY => Some("DLOCAL_API_KEY"),
            DLOCAL_API_SECRET => Some("DLOCAL_API_SECRET"),
            PAYMENT_ENV => Some("DLOCAL_ENV"),
            SUCCESS_URL => Some("SUCCESS_URL"),
            BACK_URL => Some("BACK_URL"),
            _ => None,
        }
    }

    /// 快照中需脱敏的键
    pub fn is_secret(key: &str) -> bool {
        key.ends_with("api_key")
            || key.ends_with("api_secret")
            || key.ends_with("access_token")
            || key.ends_with("api_token")
    }
}
