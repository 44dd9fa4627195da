use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use gold_proxy::{AppState, config::Config, middleware::RateLimiter, router::create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env();
    if config.gold_api_key.is_none() {
        tracing::warn!("GOLD_API_KEY is not set, /gold will serve fallback values only");
    }

    // 设置应用状态
    let state = AppState::new(config.clone());

    // 设置限流器，后台定期清理过期的客户端记录
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_window(),
        config.rate_limit_requests,
    ));
    let sweeper = Arc::clone(&rate_limiter);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            sweeper.sweep();
            tracing::debug!("rate limiter tracking {} clients", sweeper.tracked_clients());
        }
    });

    let app = create_router(state.clone(), rate_limiter);

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Currency & Gold server listening on {}", addr);
    tracing::info!(
        "cache durations: rates {}s, gold {}s",
        state.config.rates_cache_secs,
        state.config.gold_cache_secs
    );
    tracing::info!(
        "rate limit: {} requests per {}s",
        state.config.rate_limit_requests,
        state.config.rate_limit_window_secs
    );

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
