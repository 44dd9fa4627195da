use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::error::AppError;
use crate::routes::gold::model::ConversionRates;
use crate::routes::rates::model::RatesPayload;

/// 两个上游服务的 HTTP 客户端：汇率源（免费无鉴权）和金价源（token 鉴权）
#[derive(Clone)]
pub struct Upstream {
    http: reqwest::Client,
    rates_api_url: String,
    gold_api_url: String,
    gold_api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoldApiQuote {
    price: Option<f64>,
}

impl Upstream {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            rates_api_url: config.rates_api_url.clone(),
            gold_api_url: config.gold_api_url.clone(),
            gold_api_key: config.gold_api_key.clone(),
        }
    }

    /// `/rates` 用的完整汇率表
    pub async fn fetch_latest_rates(&self) -> Result<RatesPayload, AppError> {
        let url = format!("{}/latest", self.rates_api_url);
        let payload = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<RatesPayload>()
            .await?;
        Ok(payload)
    }

    /// USD -> EUR,TRY 换算汇率；应答里缺某个字段时按字段给固定替代值
    pub async fn fetch_usd_rates(&self) -> Result<ConversionRates, AppError> {
        let url = format!("{}/latest?from=USD&to=EUR,TRY", self.rates_api_url);
        let payload = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<RatesPayload>()
            .await?;

        Ok(ConversionRates {
            usd: 1.0,
            eur: payload.rates.get("EUR").copied().unwrap_or(0.93),
            try_lira: payload.rates.get("TRY").copied().unwrap_or(32.0),
        })
    }

    /// 现货金价，美元/金衡盎司。没配 API key 直接报 ConfigMissing
    pub async fn fetch_spot_price_oz(&self) -> Result<f64, AppError> {
        let key = self.gold_api_key.as_deref().ok_or(AppError::ConfigMissing)?;

        let quote = self
            .http
            .get(&self.gold_api_url)
            .header("x-access-token", key)
            .send()
            .await?
            .error_for_status()?
            .json::<GoldApiQuote>()
            .await?;

        match quote.price {
            Some(price) if price > 0.0 => Ok(price),
            _ => Err(AppError::UpstreamMalformed("price")),
        }
    }
}
