use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `/rates` 的应答，同时也是上游 latest 接口的解码目标（多余字段忽略）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesPayload {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
}

impl RatesPayload {
    /// 无缓存可用时的固定保底汇率
    pub fn fallback() -> Self {
        Self {
            base: "EUR".to_string(),
            rates: BTreeMap::from([
                ("USD".to_string(), 1.1),
                ("GBP".to_string(), 0.85),
                ("TRY".to_string(), 32.0),
                ("EUR".to_string(), 1.0),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_rates_are_eur_based() {
        let payload = RatesPayload::fallback();
        assert_eq!(payload.base, "EUR");
        assert_eq!(payload.rates["USD"], 1.1);
        assert_eq!(payload.rates["GBP"], 0.85);
        assert_eq!(payload.rates["TRY"], 32.0);
        assert_eq!(payload.rates["EUR"], 1.0);
    }

    #[test]
    fn test_decodes_upstream_payload_with_extra_fields() {
        let raw = r#"{"amount":1.0,"base":"EUR","date":"2024-05-03","rates":{"USD":1.07}}"#;
        let payload: RatesPayload = serde_json::from_str(raw).expect("decode");
        assert_eq!(payload.base, "EUR");
        assert_eq!(payload.rates["USD"], 1.07);
    }
}
