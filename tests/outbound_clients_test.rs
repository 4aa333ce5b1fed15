// ==========================================
// 出站客户端 集成测试
// ==========================================
// 测试目标: dLocal Go / Mercado Pago / Evolution API 的请求格式与响应解析
// 方式: 进程内 axum 桩服务器
// ==========================================

mod test_helpers;

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use marmita_express::domain::{Money, ProviderEnvironment};
use marmita_express::messaging::{EvolutionApiClient, MessagingClient, MessagingError};
use marmita_express::payment::{
    DlocalGoProvider, MercadoPagoProvider, Payer, PaymentError, PaymentProvider,
    PaymentSessionRequest,
};
use test_helpers::spawn_stub;

/// 桩服务器记录的最近一次请求
#[derive(Clone, Default)]
struct Captured {
    inner: Arc<Mutex<Option<(HeaderMap, Value)>>>,
}

impl Captured {
    fn headers(&self) -> HeaderMap {
        self.inner.lock().unwrap().as_ref().unwrap().0.clone()
    }

    fn body(&self) -> Value {
        self.inner.lock().unwrap().as_ref().unwrap().1.clone()
    }
}

/// 启动固定响应的桩服务器
async fn stub_server(path: &str, status: StatusCode, response: Value) -> (String, Captured) {
    let captured = Captured::default();
    let router = Router::new()
        .route(
            path,
            post(
                move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                    let response = response.clone();
                    async move {
                        *captured.inner.lock().unwrap() = Some((headers, body));
                        (status, Json(response))
                    }
                },
            ),
        )
        .with_state(captured.clone());
    (spawn_stub(router).await, captured)
}

fn session_request() -> PaymentSessionRequest {
    PaymentSessionRequest {
        amount: Money::from_minor(6490),
        currency: "BRL".to_string(),
        country: "BR".to_string(),
        order_id: "order-1700000000123".to_string(),
        description: "Pedido order-1700000000123 - Marmitaria Express".to_string(),
        success_url: "https://loja.example/obrigado".to_string(),
        back_url: "https://loja.example/".to_string(),
        notification_url: Some("https://loja.example/api/webhooks/payment".to_string()),
        payer: Payer {
            name: "Maria Silva".to_string(),
            document: "52998224725".to_string(),
            ..Default::default()
        },
    }
}

// ==========================================
// dLocal Go
// ==========================================

#[tokio::test]
async fn test_dlocal_creates_session() {
    let (base_url, captured) = stub_server(
        "/v1/payments",
        StatusCode::OK,
        json!({"id": "DP-1", "redirect_url": "https://checkout.dlocalgo.com/DP-1"}),
    )
    .await;
    let provider = DlocalGoProvider::with_base_url(reqwest::Client::new(), "k", "s", base_url);

    let session = provider.create_session(&session_request()).await.unwrap();
    assert_eq!(session.redirect_url, "https://checkout.dlocalgo.com/DP-1");
    assert_eq!(session.provider_reference.as_deref(), Some("DP-1"));

    let headers = captured.headers();
    assert_eq!(headers["authorization"], "Bearer k:s");
    let body = captured.body();
    assert_eq!(body["amount"], 6490);
    assert_eq!(body["currency"], "BRL");
    assert_eq!(body["country"], "BR");
    assert_eq!(body["order_id"], "order-1700000000123");
    assert_eq!(
        body["notification_url"],
        "https://loja.example/api/webhooks/payment"
    );
    assert_eq!(body["payer"]["document"], "52998224725");
}

#[tokio::test]
async fn test_dlocal_rejection_keeps_status() {
    let (base_url, _) = stub_server(
        "/v1/payments",
        StatusCode::UNAUTHORIZED,
        json!({"code": 3001, "message": "Invalid credentials"}),
    )
    .await;
    let provider = DlocalGoProvider::with_base_url(reqwest::Client::new(), "k", "bad", base_url);

    match provider.create_session(&session_request()).await {
        Err(PaymentError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("Expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dlocal_missing_redirect_url() {
    let (base_url, _) = stub_server("/v1/payments", StatusCode::OK, json!({"id": "DP-2"})).await;
    let provider = DlocalGoProvider::with_base_url(reqwest::Client::new(), "k", "s", base_url);

    assert!(matches!(
        provider.create_session(&session_request()).await,
        Err(PaymentError::InvalidResponse(_))
    ));
}

// ==========================================
// Mercado Pago
// ==========================================

#[tokio::test]
async fn test_mercadopago_sandbox_uses_sandbox_init_point() {
    let (base_url, captured) = stub_server(
        "/checkout/preferences",
        StatusCode::CREATED,
        json!({
            "id": "PREF-1",
            "init_point": "https://www.mercadopago.com.br/checkout/PREF-1",
            "sandbox_init_point": "https://sandbox.mercadopago.com.br/checkout/PREF-1"
        }),
    )
    .await;
    let provider = MercadoPagoProvider::with_base_url(
        reqwest::Client::new(),
        "TEST-token",
        ProviderEnvironment::Sandbox,
        base_url,
    );

    let session = provider.create_session(&session_request()).await.unwrap();
    assert_eq!(
        session.redirect_url,
        "https://sandbox.mercadopago.com.br/checkout/PREF-1"
    );

    assert_eq!(captured.headers()["authorization"], "Bearer TEST-token");
    let body = captured.body();
    assert_eq!(body["items"][0]["unit_price"], 64.9);
    assert_eq!(body["items"][0]["quantity"], 1);
    assert_eq!(body["external_reference"], "order-1700000000123");
    assert_eq!(body["payer"]["identification"]["number"], "52998224725");
}

#[tokio::test]
async fn test_mercadopago_production_uses_init_point() {
    let (base_url, _) = stub_server(
        "/checkout/preferences",
        StatusCode::CREATED,
        json!({
            "id": "PREF-2",
            "init_point": "https://www.mercadopago.com.br/checkout/PREF-2",
            "sandbox_init_point": "https://sandbox.mercadopago.com.br/checkout/PREF-2"
        }),
    )
    .await;
    let provider = MercadoPagoProvider::with_base_url(
        reqwest::Client::new(),
        "APP_USR-token",
        ProviderEnvironment::Production,
        base_url,
    );

    let session = provider.create_session(&session_request()).await.unwrap();
    assert_eq!(
        session.redirect_url,
        "https://www.mercadopago.com.br/checkout/PREF-2"
    );
}

// ==========================================
// Evolution API
// ==========================================

#[tokio::test]
async fn test_evolution_send_text() {
    let (base_url, captured) = stub_server(
        "/message/sendText/loja",
        StatusCode::CREATED,
        json!({"key": {"id": "3EB0"}, "status": "PENDING"}),
    )
    .await;
    let client = EvolutionApiClient::new(
        reqwest::Client::new(),
        format!("{}/message/sendText/loja", base_url),
        "secret-token",
    );

    let result = client
        .send_text("5516999990000", "WebHook recebido ! Dados: \n{}")
        .await
        .unwrap();
    assert_eq!(result["key"]["id"], "3EB0");

    assert_eq!(captured.headers()["apikey"], "secret-token");
    let body = captured.body();
    assert_eq!(body["number"], "5516999990000");
    assert_eq!(body["options"]["presence"], "composing");
    assert_eq!(body["textMessage"]["text"], "WebHook recebido ! Dados: \n{}");
}

#[tokio::test]
async fn test_evolution_error_status() {
    let (base_url, _) = stub_server(
        "/message/sendText/loja",
        StatusCode::NOT_FOUND,
        json!({"status": 404, "message": "instance not found"}),
    )
    .await;
    let client = EvolutionApiClient::new(
        reqwest::Client::new(),
        format!("{}/message/sendText/loja", base_url),
        "secret-token",
    );

    match client.send_text("5516999990000", "oi").await {
        Err(MessagingError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "instance not found");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}
