// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置文件加载与各项读取的正确性
// ==========================================

use std::io::Write;

use marmita_express::app::AppState;
use marmita_express::config::{config_keys, ConfigError, ConfigManager};
use marmita_express::domain::{Money, PaymentProviderKind, ProviderEnvironment};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_from_file_reads_values() {
    let file = write_config(
        r#"{
            "store.name": "Marmitaria da Praça",
            "payment.provider": "mercadopago",
            "payment.env": "sandbox",
            "payment.mercadopago.access_token": "TEST-123",
            "http.timeout_ms": 2500
        }"#,
    );

    let config = ConfigManager::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.source_path(), Some(file.path()));
    assert_eq!(config.get_store_name(), "Marmitaria da Praça");
    assert_eq!(
        config.get_payment_provider().unwrap(),
        PaymentProviderKind::MercadoPago
    );
    assert_eq!(config.get_payment_environment(), ProviderEnvironment::Sandbox);
    assert_eq!(config.get_mercadopago_access_token().as_deref(), Some("TEST-123"));
    // 非字符串值按 JSON 文本保存
    assert_eq!(config.get_http_timeout_ms().unwrap(), 2500);
}

#[test]
fn test_from_file_nested_pricing_profile() {
    let file = write_config(
        r#"{
            "pricing_profile": {
                "unit_price": 2990,
                "tiers": {"3": 7990},
                "dessert_price": 350
            }
        }"#,
    );

    let config = ConfigManager::from_file(file.path()).expect("Failed to load config");
    let profile = config.get_pricing_profile().unwrap();
    assert_eq!(profile.unit_price, Money::from_minor(2990));
    assert_eq!(profile.tier_for(3), Some(Money::from_minor(7990)));
    assert_eq!(profile.tier_for(4), None);
    assert_eq!(profile.dessert_price, Money::from_minor(350));
}

#[test]
fn test_from_file_missing_file() {
    let result = ConfigManager::from_file("/nonexistent/marmita/config.json");
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_from_file_malformed_json() {
    let file = write_config("{ not json");
    let result = ConfigManager::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_blank_secrets_are_treated_as_missing() {
    let config = ConfigManager::from_values([
        (config_keys::DLOCAL_API_KEY, "   "),
        (config_keys::DLOCAL_API_SECRET, ""),
        (config_keys::NOTIFY_NUMBER, "5516999990000"),
    ]);

    assert_eq!(config.get_dlocal_api_key(), None);
    assert_eq!(config.get_dlocal_api_secret(), None);
    assert_eq!(config.get_notify_number().as_deref(), Some("5516999990000"));
}

#[test]
fn test_invalid_timeout_is_reported() {
    let config = ConfigManager::from_values([(config_keys::HTTP_TIMEOUT_MS, "soon")]);

    match config.get_http_timeout_ms() {
        Err(ConfigError::InvalidValue { key, value, .. }) => {
            assert_eq!(key, config_keys::HTTP_TIMEOUT_MS);
            assert_eq!(value, "soon");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_app_state_uses_configured_pricing() {
    let config = ConfigManager::from_values([(
        config_keys::PRICING_PROFILE,
        r#"{"unit_price": 1990, "tiers": {}, "dessert_price": 0}"#,
    )]);

    let state = AppState::new(config).expect("Failed to build AppState");
    assert_eq!(state.catalog.pricing.unit_price, Money::from_minor(1990));
}

#[test]
fn test_app_state_rejects_invalid_pricing() {
    let config = ConfigManager::from_values([(config_keys::PRICING_PROFILE, "{]")]);
    assert!(AppState::new(config).is_err());
}
