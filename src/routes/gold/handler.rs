use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{AppState, error::AppError, history::HistoryEntry};

use super::model::{ConversionRates, GRAMS_PER_TROY_OUNCE, GoldResponse, price_coins};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<i64>,
}

#[axum::debug_handler]
pub async fn gold_prices(State(state): State<AppState>) -> Json<GoldResponse> {
    // 先查缓存
    if let Some(cached) = state.gold_cache.get_fresh() {
        tracing::debug!("serving gold data from cache");
        return Json(cached);
    }

    match fetch_gold(&state).await {
        Ok(response) => {
            state.gold_cache.set(response.clone());
            Json(response)
        }
        Err(e) => {
            tracing::error!("gold fetch failed: {}", e);

            // 降级：过期缓存优先，其次合成保底值
            if let Some(mut stale) = state.gold_cache.get_stale() {
                tracing::warn!("using stale gold cache as fallback");
                stale.stale = Some(true);
                Json(stale)
            } else {
                tracing::warn!("using synthetic fallback values");
                Json(GoldResponse::fallback())
            }
        }
    }
}

async fn fetch_gold(state: &AppState) -> Result<GoldResponse, AppError> {
    tracing::info!("fetching fresh gold data");
    let price_per_oz_usd = state.upstream.fetch_spot_price_oz().await?;
    let price_per_gram_usd = price_per_oz_usd / GRAMS_PER_TROY_OUNCE;

    // 历史记录尽力而为，失败只记日志
    if let Err(e) = state.history.append_today(price_per_gram_usd) {
        tracing::error!("failed to store gold history: {}", e);
    }

    // 汇率失败不致命，换用固定替代值
    let rates = match state.upstream.fetch_usd_rates().await {
        Ok(rates) => rates,
        Err(e) => {
            tracing::warn!("rate fetch failed, using default conversion rates: {}", e);
            ConversionRates::FALLBACK
        }
    };

    Ok(GoldResponse::fresh(price_coins(price_per_gram_usd, &rates)))
}

#[axum::debug_handler]
pub async fn gold_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    Json(state.history.recent(query.days.unwrap_or(30)))
}
