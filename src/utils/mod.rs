use chrono::{SecondsFormat, Utc};

/// ISO-8601 (毫秒精度, UTC) 时间戳，响应里统一用这个格式
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
