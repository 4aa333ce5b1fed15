// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的目录、配置器、桩服务器等
// ==========================================

#![allow(dead_code)]

use std::sync::Arc;

use marmita_express::domain::{Catalog, RegionCatalog};
use marmita_express::engine::{OrderConfigurator, OrderIntent};

/// 测试用州/城市目录
pub fn test_regions() -> Arc<RegionCatalog> {
    Arc::new(
        RegionCatalog::from_json(
            r#"{"estados": [
                {"sigla": "SP", "nome": "São Paulo", "cidades": ["São Paulo", "Ribeirão Preto", "Campinas"]},
                {"sigla": "RJ", "nome": "Rio de Janeiro", "cidades": ["Rio de Janeiro", "Niterói"]}
            ]}"#,
        )
        .expect("测试目录格式错误"),
    )
}

/// 已开始下单的配置器（默认菜单与定价）
pub fn started_configurator() -> OrderConfigurator {
    let mut configurator = OrderConfigurator::new(Arc::new(Catalog::default()), test_regions());
    configurator.start_order();
    configurator
}

/// 依次分发意图，任一失败即 panic
pub fn apply_all(configurator: &mut OrderConfigurator, intents: Vec<OrderIntent>) {
    for intent in intents {
        configurator
            .dispatch(intent.clone())
            .unwrap_or_else(|e| panic!("意图 {:?} 失败: {}", intent, e));
    }
}

/// 可直接结账的配置器
///
/// 两份餐 m1 + m2，份数 1，联系人与地址齐全
pub fn ready_configurator() -> OrderConfigurator {
    let mut configurator = started_configurator();
    apply_all(
        &mut configurator,
        vec![
            OrderIntent::ToggleItem("m1".into()),
            OrderIntent::ToggleItem("m2".into()),
            OrderIntent::SetContactName("Maria Silva".into()),
            OrderIntent::SetPhone("16991234567".into()),
            OrderIntent::SelectRegion("SP".into()),
            OrderIntent::SelectLocality("Ribeirão Preto".into()),
            OrderIntent::SetPostalCode("14000000".into()),
            OrderIntent::SetStreet("Rua Duque de Caxias".into()),
            OrderIntent::SetNumber("120".into()),
        ],
    );
    configurator
}

/// 启动进程内桩服务器（127.0.0.1 随机端口），返回 base url
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("无法绑定桩服务器端口");
    let addr = listener.local_addr().expect("无法获取桩服务器地址");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("桩服务器异常退出");
    });
    format!("http://{}", addr)
}
