use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::now_iso;

pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;
pub const PREMIUM_PERCENT: f64 = 4.0;

/// 上游全挂时合成响应用的保底克价（美元）
pub const FALLBACK_PRICE_PER_GRAM_USD: f64 = 59.0;

/// 币种定义：名称 -> (克重, 成色)
pub const COINS: &[(&str, f64, u32)] = &[
    ("Gramm", 1.0, 24),
    ("Kilogramm", 1000.0, 24),
    ("Krügerrand (1 oz)", 31.1035, 24),
    ("Maple Leaf (1 oz)", 31.1035, 24),
    ("Philharmoniker (1 oz)", 31.1035, 24),
    ("Cumhuriyet Altını", 7.21, 22),
    ("Ata Altını", 7.21, 22),
    ("Çeyrek Altın", 1.75, 22),
    ("Yarim Altın", 3.5, 22),
    ("Tam Altın (Ziynet)", 7.01, 22),
    ("Reşat Altını", 7.21, 22),
    ("Gremse Altını", 17.5, 22),
    ("22 Ayar Bilezik", 1.0, 22),
];

/// USD 基准的换算汇率
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRates {
    pub usd: f64,
    pub eur: f64,
    pub try_lira: f64,
}

impl ConversionRates {
    /// 汇率源失败时的固定替代值
    pub const FALLBACK: ConversionRates = ConversionRates {
        usd: 1.0,
        eur: 0.93,
        try_lira: 32.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePair {
    pub spot: f64,
    pub dealer: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinQuote {
    pub weight: f64,
    pub karat: u32,
    #[serde(rename = "USD")]
    pub usd: PricePair,
    #[serde(rename = "EUR")]
    pub eur: PricePair,
    #[serde(rename = "TRY")]
    pub try_lira: PricePair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldResponse {
    pub coins: BTreeMap<String, CoinQuote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    pub timestamp: String,
}

impl GoldResponse {
    /// 新鲜抓取的结果，缓存里存的就是这个形态
    pub fn fresh(coins: BTreeMap<String, CoinQuote>) -> Self {
        Self {
            coins,
            cached: Some(false),
            stale: None,
            fallback: None,
            timestamp: now_iso(),
        }
    }

    /// 第三级降级：只用进程内常量合成，永远不会失败
    pub fn fallback() -> Self {
        Self {
            coins: price_coins(FALLBACK_PRICE_PER_GRAM_USD, &ConversionRates::FALLBACK),
            cached: None,
            stale: None,
            fallback: Some(true),
            timestamp: now_iso(),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn quote(spot_usd: f64, rate: f64) -> PricePair {
    let spot = spot_usd * rate;
    // dealer 加价基于未舍入的 spot
    PricePair {
        spot: round2(spot),
        dealer: round2(spot * (1.0 + PREMIUM_PERCENT / 100.0)),
    }
}

/// 按克价和汇率对全部币种定价
pub fn price_coins(price_per_gram_usd: f64, rates: &ConversionRates) -> BTreeMap<String, CoinQuote> {
    COINS
        .iter()
        .map(|&(name, weight, karat)| {
            let purity = karat as f64 / 24.0;
            let spot_usd = weight * purity * price_per_gram_usd;
            (
                name.to_string(),
                CoinQuote {
                    weight,
                    karat,
                    usd: quote(spot_usd, rates.usd),
                    eur: quote(spot_usd, rates.eur),
                    try_lira: quote(spot_usd, rates.try_lira),
                },
            )
        })
        .collect()
}
