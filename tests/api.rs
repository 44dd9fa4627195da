use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use gold_proxy::routes::gold::model::{ConversionRates, GoldResponse, price_coins};
use gold_proxy::routes::rates::model::RatesPayload;
use gold_proxy::{AppState, config::Config, middleware::RateLimiter, router::create_router};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

// Upstream URLs point at an unroutable local port so every fetch fails fast,
// which is exactly the degraded mode these tests exercise.
fn offline_config(temp_dir: &TempDir) -> Config {
    Config {
        gold_api_key: None,
        server_host: "127.0.0.1".into(),
        server_port: 0,
        rates_cache_secs: 300,
        gold_cache_secs: 600,
        rate_limit_window_secs: 60,
        rate_limit_requests: 30,
        history_file: temp_dir.path().join("gold_history.json"),
        rates_api_url: "http://127.0.0.1:9".into(),
        gold_api_url: "http://127.0.0.1:9/XAU/USD".into(),
    }
}

fn build_app(config: Config) -> (Router, AppState) {
    let state = AppState::new(config);
    let limiter = Arc::new(RateLimiter::new(
        state.config.rate_limit_window(),
        state.config.rate_limit_requests,
    ));
    (create_router(state.clone(), limiter), state)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    get_as(app, uri, None).await
}

async fn get_as(app: &Router, uri: &str, client_ip: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(ip) = client_ip {
        builder = builder.header("x-real-ip", ip);
    }
    let request = builder.body(Body::empty()).expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

#[tokio::test]
async fn health_returns_ok_with_all_upstreams_down() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (app, _state) = build_app(offline_config(&temp_dir));

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn gold_with_empty_cache_serves_synthetic_fallback() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (app, _state) = build_app(offline_config(&temp_dir));

    let (status, body) = get(&app, "/gold").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], true);
    assert!(body.get("cached").is_none());
    assert!(body.get("stale").is_none());

    // 31.1035g × 24/24 × $59/g at rate 1
    let kruger = &body["coins"]["Krügerrand (1 oz)"];
    assert_eq!(kruger["USD"]["spot"], 1835.11);
    assert_eq!(kruger["USD"]["dealer"], 1908.51);

    // 22 karat purity
    let ceyrek = &body["coins"]["Çeyrek Altın"];
    assert_eq!(ceyrek["USD"]["spot"], 94.65);
    assert_eq!(ceyrek["karat"], 22);
}

#[tokio::test]
async fn gold_prefers_stale_cache_over_synthetic_fallback() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = offline_config(&temp_dir);
    config.gold_cache_secs = 0; // every entry is immediately stale
    let (app, state) = build_app(config);

    let cached = GoldResponse::fresh(price_coins(100.0, &ConversionRates::FALLBACK));
    state.gold_cache.set(cached.clone());

    let (status, body) = get(&app, "/gold").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stale"], true);
    assert!(body.get("fallback").is_none());

    // previously cached values are served unchanged
    assert_eq!(body["coins"]["Gramm"]["USD"]["spot"], 100.0);
    assert_eq!(body["timestamp"], cached.timestamp.as_str());
}

#[tokio::test]
async fn gold_fresh_cache_is_served_without_refetch() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (app, state) = build_app(offline_config(&temp_dir));

    let cached = GoldResponse::fresh(price_coins(100.0, &ConversionRates::FALLBACK));
    state.gold_cache.set(cached);

    let (status, body) = get(&app, "/gold").await;
    assert_eq!(status, StatusCode::OK);
    // served from cache: payload keeps its cached:false tag, no degradation flags
    assert_eq!(body["cached"], false);
    assert!(body.get("stale").is_none());
    assert!(body.get("fallback").is_none());
    assert_eq!(body["coins"]["Gramm"]["USD"]["dealer"], 104.0);
}

#[tokio::test]
async fn rates_with_empty_cache_serves_hardcoded_defaults() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (app, _state) = build_app(offline_config(&temp_dir));

    let (status, body) = get(&app, "/rates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "EUR");
    assert_eq!(body["rates"]["USD"], 1.1);
    assert_eq!(body["rates"]["GBP"], 0.85);
    assert_eq!(body["rates"]["TRY"], 32.0);
    assert_eq!(body["rates"]["EUR"], 1.0);
}

#[tokio::test]
async fn rates_stale_cache_beats_hardcoded_defaults() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = offline_config(&temp_dir);
    config.rates_cache_secs = 0;
    let (app, state) = build_app(config);

    let mut payload = RatesPayload::fallback();
    payload.rates.insert("USD".to_string(), 42.0);
    state.rates_cache.set(payload);

    let (status, body) = get(&app, "/rates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rates"]["USD"], 42.0);
}

#[tokio::test]
async fn rate_limit_denies_request_over_capacity() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = offline_config(&temp_dir);
    config.rate_limit_requests = 2;
    let (app, _state) = build_app(config);

    for _ in 0..2 {
        let (status, _) = get_as(&app, "/health", Some("1.2.3.4")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get_as(&app, "/health", Some("1.2.3.4")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");
    let retry_after = body["retryAfter"].as_u64().expect("retryAfter");
    assert!(retry_after >= 1 && retry_after <= 60);

    // a different client is unaffected
    let (status, _) = get_as(&app, "/health", Some("5.6.7.8")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn requests_without_client_address_share_one_key() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = offline_config(&temp_dir);
    config.rate_limit_requests = 1;
    let (app, _state) = build_app(config);

    // no ConnectInfo and no headers in oneshot requests: both land on "unknown"
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn gold_history_returns_last_n_entries() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = offline_config(&temp_dir);

    let entries = serde_json::json!([
        {"date": "2024-01-01", "priceUSD": 58.11},
        {"date": "2024-01-02", "priceUSD": 59.02},
        {"date": "2024-01-03", "priceUSD": 60.35}
    ]);
    std::fs::write(&config.history_file, entries.to_string()).expect("seed history");

    let (app, _state) = build_app(config);

    let (status, body) = get(&app, "/gold/history?days=2").await;
    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().expect("array");
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2024-01-02");
    assert_eq!(days[1]["priceUSD"], 60.35);

    // default window is 30 days, more than we stored
    let (_, body) = get(&app, "/gold/history").await;
    assert_eq!(body.as_array().expect("array").len(), 3);

    let (_, body) = get(&app, "/gold/history?days=0").await;
    assert!(body.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn gold_history_with_missing_file_is_empty() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (app, _state) = build_app(offline_config(&temp_dir));

    let (status, body) = get(&app, "/gold/history").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn history_file_path_comes_from_config() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = offline_config(&temp_dir);
    let (_, state) = build_app(config.clone());

    state.history.append_today(59.0).expect("append");
    assert!(config.history_file.exists());
}
