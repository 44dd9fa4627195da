use axum::{Json, extract::State};

use crate::AppState;

use super::model::RatesPayload;

#[axum::debug_handler]
pub async fn latest_rates(State(state): State<AppState>) -> Json<RatesPayload> {
    // 先查缓存
    if let Some(cached) = state.rates_cache.get_fresh() {
        tracing::debug!("serving rates from cache");
        return Json(cached);
    }

    tracing::info!("fetching fresh rates data");
    match state.upstream.fetch_latest_rates().await {
        Ok(payload) => {
            state.rates_cache.set(payload.clone());
            Json(payload)
        }
        Err(e) => {
            tracing::error!("rates fetch failed: {}", e);

            if let Some(stale) = state.rates_cache.get_stale() {
                tracing::warn!("using stale rates cache as fallback");
                return Json(stale);
            }
            Json(RatesPayload::fallback())
        }
    }
}
