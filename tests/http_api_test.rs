// ==========================================
// HTTP 接口 集成测试
// ==========================================
// 测试目标: 路由 → 处理器 → 服务 的完整请求链路
// 方式: tower::ServiceExt::oneshot，不占用端口
// ==========================================

mod test_helpers;

#[path = "helpers/mock_services.rs"]
mod mock_services;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use marmita_express::app::{create_router, AppState, LEGACY_CREATE_PAYMENT_PATH, LEGACY_WEBHOOK_PATH};
use marmita_express::config::{config_keys, ConfigManager};
use marmita_express::engine::OrderIntent;
use marmita_express::logging;
use marmita_express::messaging::{MessagingClient, WebhookRelay};
use marmita_express::payment::{MerchantSettings, PaymentProvider, PaymentService};
use mock_services::{MockPaymentProvider, RecordingMessaging};
use test_helpers::{apply_all, ready_configurator};

const NOTIFY_NUMBER: &str = "5516999990000";

fn test_config() -> ConfigManager {
    ConfigManager::from_values([(config_keys::STORE_NAME, "Marmitaria Express")])
}

/// 使用 Mock 渠道与消息通道的路由
fn test_router(provider: Arc<MockPaymentProvider>, messaging: Arc<RecordingMessaging>) -> Router {
    logging::init_test();
    let config = test_config();
    let provider: Arc<dyn PaymentProvider> = provider;
    let channel: Arc<dyn MessagingClient> = messaging;
    let payment_service = PaymentService::new(provider, MerchantSettings::from_config(&config));
    let relay = WebhookRelay::new(Some(channel), Some(NOTIFY_NUMBER.to_string()), "pt-BR");

    let state = AppState::new(config)
        .unwrap()
        .with_payment_service(payment_service)
        .with_webhook_relay(relay);
    create_router(state)
}

fn default_router() -> Router {
    test_router(
        Arc::new(MockPaymentProvider::accepting()),
        Arc::new(RecordingMessaging::default()),
    )
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn read_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&read_body(response).await).unwrap()
}

fn payment_body() -> Value {
    json!({
        "amount": 64.9,
        "currency": "BRL",
        "order_id": "order-1700000000123",
        "payer": {
            "name": "Maria Silva",
            "address": {"state": "SP", "city": "Ribeirão Preto", "zip_code": "14000000"}
        },
        "notification_url": "https://loja.example/api/webhooks/payment"
    })
}

// ==========================================
// 健康检查
// ==========================================

#[tokio::test]
async fn test_health() {
    let response = default_router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(read_body(response).await, b"OK");
}

// ==========================================
// 创建支付
// ==========================================

#[tokio::test]
async fn test_create_payment_returns_redirect() {
    let provider = Arc::new(MockPaymentProvider::accepting());
    let router = test_router(provider.clone(), Arc::new(RecordingMessaging::default()));

    let response = router
        .oneshot(json_request(Method::POST, "/api/create-payment", &payment_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(
        body["redirect_url"],
        "https://pay.example/order-1700000000123"
    );

    let request = provider.last_request().unwrap();
    assert_eq!(request.amount.minor_units(), 6490);
    assert_eq!(request.description, "Pedido order-1700000000123 - Marmitaria Express");
}

#[tokio::test]
async fn test_create_payment_legacy_path() {
    let response = default_router()
        .oneshot(json_request(Method::POST, LEGACY_CREATE_PAYMENT_PATH, &payment_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_json(response).await["redirect_url"].is_string());
}

#[tokio::test]
async fn test_create_payment_rejects_other_methods() {
    let response = default_router()
        .oneshot(Request::get("/api/create-payment").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(read_json(response).await["error"], "Método não permitido");
}

#[tokio::test]
async fn test_create_payment_malformed_body() {
    let provider = Arc::new(MockPaymentProvider::accepting());
    let router = test_router(provider.clone(), Arc::new(RecordingMessaging::default()));

    let response = router
        .oneshot(json_request(Method::POST, "/api/create-payment", &json!({"amount": "abc"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "Dados do pagamento inválidos");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_create_payment_forwards_provider_status() {
    let provider = Arc::new(MockPaymentProvider::rejecting(401, "Invalid credentials"));
    let router = test_router(provider.clone(), Arc::new(RecordingMessaging::default()));

    let response = router
        .oneshot(json_request(Method::POST, "/api/create-payment", &payment_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"], "Invalid credentials");
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_create_payment_without_credentials() {
    // 默认配置: dLocal Go 且未配置密钥
    let state = AppState::new(test_config()).unwrap();
    let response = create_router(state)
        .oneshot(json_request(Method::POST, "/api/create-payment", &payment_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await["error"],
        "Credenciais da API não configuradas"
    );
}

// ==========================================
// 支付回调
// ==========================================

#[tokio::test]
async fn test_webhook_relays_payload() {
    let messaging = Arc::new(RecordingMessaging::default());
    let router = test_router(Arc::new(MockPaymentProvider::accepting()), messaging.clone());

    let payload = json!({"action": "payment.updated", "data": {"id": "123"}});
    let response = router
        .oneshot(json_request(Method::POST, "/api/webhooks/payment", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["received"], true);
    assert_eq!(body["evolution"]["key"]["id"], "MSG-1");

    let sent = messaging.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, NOTIFY_NUMBER);
    assert!(sent[0].1.starts_with("WebHook recebido ! Dados: "));
    assert!(sent[0].1.contains("payment.updated"));
}

#[tokio::test]
async fn test_webhook_legacy_path() {
    let messaging = Arc::new(RecordingMessaging::default());
    let router = test_router(Arc::new(MockPaymentProvider::accepting()), messaging.clone());

    let response = router
        .oneshot(json_request(Method::POST, LEGACY_WEBHOOK_PATH, &json!({"id": 1})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(messaging.sent_count(), 1);
}

#[tokio::test]
async fn test_webhook_invalid_payload_is_not_relayed() {
    let messaging = Arc::new(RecordingMessaging::default());
    let router = test_router(Arc::new(MockPaymentProvider::accepting()), messaging.clone());

    let request = Request::post("/api/webhooks/payment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_body(response).await, b"Invalid payload");
    assert_eq!(messaging.sent_count(), 0);
}

#[tokio::test]
async fn test_webhook_rejects_other_methods() {
    let response = default_router()
        .oneshot(Request::get("/api/webhooks/payment").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(read_body(response).await, b"Method Not Allowed");
}

#[tokio::test]
async fn test_webhook_relay_failure() {
    let router = test_router(
        Arc::new(MockPaymentProvider::accepting()),
        Arc::new(RecordingMessaging::failing()),
    );

    let response = router
        .oneshot(json_request(Method::POST, "/api/webhooks/payment", &json!({"id": 7})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(read_json(response).await["error"], "Falha ao encaminhar notificação");
}

// ==========================================
// 目录与报价
// ==========================================

#[tokio::test]
async fn test_catalog_and_regions() {
    let router = default_router();

    let response = router
        .clone()
        .oneshot(Request::get("/api/catalog").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let catalog = read_json(response).await;
    assert_eq!(catalog["items"].as_array().unwrap().len(), 4);

    let response = router
        .oneshot(Request::get("/api/regions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let regions = read_json(response).await;
    assert_eq!(regions["estados"].as_array().unwrap().len(), 27);
}

#[tokio::test]
async fn test_quote_rejects_unbounded_quantity() {
    let response = default_router()
        .oneshot(json_request(
            Method::POST,
            "/api/quote",
            &json!({"combo_quantity": 100000, "selected_items": ["m1", "m2"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quote_prices_draft() {
    let mut configurator = ready_configurator();
    apply_all(&mut configurator, vec![OrderIntent::SetComboQuantity(3)]);
    let draft = serde_json::to_value(configurator.draft()).unwrap();

    let response = default_router()
        .oneshot(json_request(Method::POST, "/api/quote", &draft))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = read_json(response).await;
    assert_eq!(snapshot["combo_quantity"], 3);
    assert_eq!(snapshot["total_minor"], 6490);
    assert_eq!(snapshot["total_display"], "R$ 64,90");
}
