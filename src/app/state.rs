// ==========================================
// Marmita Express - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和服务实例
// 说明: 所有字段只读，通过 Arc 在请求间共享
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use crate::api::AddressApi;
use crate::config::config_manager::ConfigManager;
use crate::domain::catalog::Catalog;
use crate::domain::region::RegionCatalog;
use crate::lookup::{IpApiClient, IpLocator, LocationService, NominatimClient, ViaCepClient};
use crate::messaging::WebhookRelay;
use crate::payment::PaymentService;

/// 内置州/城市目录
const EMBEDDED_REGIONS: &str = include_str!("../../assets/regions.json");

/// 应用状态
///
/// 包含所有服务实例和共享资源
#[derive(Clone)]
pub struct AppState {
    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 菜单目录（含定价参数）
    pub catalog: Arc<Catalog>,

    /// 州/城市目录
    pub regions: Arc<RegionCatalog>,

    /// 支付服务
    pub payment_service: Arc<PaymentService>,

    /// 支付回调转发
    pub webhook_relay: Arc<WebhookRelay>,

    /// 地址查询
    pub address_api: Arc<AddressApi>,

    /// 响应文案语言
    pub locale: String,
}

impl AppState {
    /// 按配置创建AppState
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 创建共享的 HTTP 客户端
    /// 2. 加载菜单定价与州/城市目录
    /// 3. 创建支付、消息、地址查询服务
    pub fn new(config: ConfigManager) -> Result<Self, String> {
        let timeout_ms = config
            .get_http_timeout_ms()
            .map_err(|e| format!("无法读取HTTP超时配置: {}", e))?;
        let http = build_http_client(timeout_ms)
            .map_err(|e| format!("无法创建HTTP客户端: {}", e))?;

        // ==========================================
        // 目录
        // ==========================================
        let pricing = config
            .get_pricing_profile()
            .map_err(|e| format!("定价参数无效: {}", e))?;
        let catalog = Arc::new(Catalog::with_pricing(pricing));
        let regions = Arc::new(load_regions(&config)?);
        tracing::info!("州/城市目录已加载: {}个州", regions.regions.len());

        // ==========================================
        // 外部服务
        // ==========================================
        let payment_service = Arc::new(
            PaymentService::from_config(&config, http.clone())
                .map_err(|e| format!("无法创建PaymentService: {}", e))?,
        );
        let webhook_relay = Arc::new(WebhookRelay::from_config(&config, http.clone()));

        let ip_locator: Arc<dyn IpLocator> =
            Arc::new(IpApiClient::new(http.clone(), config.get_ip_locator_url()));
        let location = LocationService::new(
            Arc::new(NominatimClient::new(http.clone(), config.get_geocoder_base_url())),
            Some(ip_locator),
        );
        let address_api = Arc::new(AddressApi::new(
            Arc::new(ViaCepClient::new(http, config.get_postal_lookup_base_url())),
            location,
            regions.clone(),
        ));

        let locale = config.get_default_locale();
        tracing::info!("AppState初始化完成");

        Ok(Self {
            config: Arc::new(config),
            catalog,
            regions,
            payment_service,
            webhook_relay,
            address_api,
            locale,
        })
    }

    /// 替换支付服务（测试或自定义渠道）
    pub fn with_payment_service(mut self, payment_service: PaymentService) -> Self {
        self.payment_service = Arc::new(payment_service);
        self
    }

    /// 替换回调转发
    pub fn with_webhook_relay(mut self, webhook_relay: WebhookRelay) -> Self {
        self.webhook_relay = Arc::new(webhook_relay);
        self
    }

    /// 替换地址查询
    pub fn with_address_api(mut self, address_api: AddressApi) -> Self {
        self.address_api = Arc::new(address_api);
        self
    }
}

/// 创建共享的出站 HTTP 客户端
pub fn build_http_client(timeout_ms: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .user_agent(format!("marmita-express/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// 加载州/城市目录
///
/// 配置了 catalog.regions_path 时从文件读取，否则使用内置目录
pub fn load_regions(config: &ConfigManager) -> Result<RegionCatalog, String> {
    let catalog = match config.get_regions_path() {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| format!("无法读取州/城市目录 {}: {}", path.display(), e))?;
            RegionCatalog::from_json(&raw)
                .map_err(|e| format!("州/城市目录格式错误 {}: {}", path.display(), e))?
        }
        None => RegionCatalog::from_json(EMBEDDED_REGIONS)
            .map_err(|e| format!("内置州/城市目录格式错误: {}", e))?,
    };

    if catalog.is_empty() {
        tracing::warn!("州/城市目录为空，州/城市只能手工输入");
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_keys;
    use std::io::Write;

    #[test]
    fn test_embedded_regions() {
        let regions = load_regions(&ConfigManager::from_values::<_, &str, &str>([])).unwrap();
        assert_eq!(regions.regions.len(), 27);
        assert!(regions.contains_locality("SP", "Ribeirão Preto"));
    }

    #[test]
    fn test_regions_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"estados": [{{"sigla": "SE", "nome": "Sergipe", "cidades": ["Aracaju"]}}]}}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();
        let config = ConfigManager::from_values([(config_keys::REGIONS_PATH, path.as_str())]);

        let regions = load_regions(&config).unwrap();
        assert_eq!(regions.regions.len(), 1);
        assert_eq!(regions.localities_for("SE"), ["Aracaju".to_string()]);
    }

    #[test]
    fn test_state_builds_without_credentials() {
        let state = AppState::new(ConfigManager::from_values::<_, &str, &str>([])).unwrap();
        assert_eq!(state.locale, "pt-BR");
        assert!(!state.webhook_relay.is_configured());
        assert_eq!(state.catalog.items.len(), 4);
    }
}
