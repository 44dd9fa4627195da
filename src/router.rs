use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    middleware::{RateLimiter, log_errors, rate_limit},
    routes,
};

// 行情相关的路由
pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/rates", get(routes::rates::latest_rates))
        .route("/gold", get(routes::gold::gold_prices))
        .route("/gold/history", get(routes::gold::gold_history))
}

// 创建主路由：限流在最外层，被拒绝的请求到不了 handler，也就不会触发缓存刷新
pub fn create_router(state: AppState, limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(market_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn_with_state(limiter, rate_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
