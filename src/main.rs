// ==========================================
// Marmita Express - 服务主入口
// ==========================================
// 流程: 日志 → 配置 → 语言 → AppState → 监听
// ==========================================

use anyhow::Context;
use marmita_express::app::{create_router, AppState};
use marmita_express::config::ConfigManager;
use marmita_express::{i18n, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 下单与支付网关", marmita_express::APP_NAME);
    tracing::info!("系统版本: {}", marmita_express::VERSION);
    tracing::info!("==================================================");

    let config = ConfigManager::new().context("无法加载配置")?;
    match config.source_path() {
        Some(path) => tracing::info!("配置文件: {}", path.display()),
        None => tracing::info!("未找到配置文件，使用环境变量与默认值"),
    }
    tracing::debug!("生效配置: {}", config.get_config_snapshot()?);

    i18n::set_locale(&config.get_default_locale());
    let bind_addr = config.get_bind_addr();

    tracing::info!("正在初始化AppState...");
    let state = AppState::new(config).map_err(anyhow::Error::msg)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", bind_addr))?;
    tracing::info!("HTTP 服务已启动: {}", bind_addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听退出信号: {}", e);
    }
    tracing::info!("收到退出信号，正在关闭...");
}
