use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

struct RateRecord {
    count: u32,
    reset_at: Instant,
}

/// 按客户端 IP 的固定窗口限流器（窗口从首个请求起算，过期后重开）
pub struct RateLimiter {
    records: Mutex<HashMap<String, RateRecord>>,
    window: Duration,
    capacity: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, capacity: u32) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            window,
            capacity,
        }
    }

    /// 放行返回 Ok，超额返回 Err(重试秒数)
    pub fn check(&self, client: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut records = self.records.lock().unwrap();

        match records.get_mut(client) {
            None => {
                records.insert(
                    client.to_string(),
                    RateRecord {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Ok(())
            }
            Some(record) => {
                if now > record.reset_at {
                    // 窗口已过，重新计数
                    record.count = 1;
                    record.reset_at = now + self.window;
                    Ok(())
                } else {
                    record.count += 1;
                    if record.count > self.capacity {
                        let retry_after =
                            record.reset_at.duration_since(now).as_secs_f64().ceil() as u64;
                        Err(retry_after)
                    } else {
                        Ok(())
                    }
                }
            }
        }
    }

    /// 丢弃窗口已过期的客户端记录，防止 map 随客户端数量无界增长
    pub fn sweep(&self) {
        let now = Instant::now();
        let mut records = self.records.lock().unwrap();
        records.retain(|_, record| now <= record.reset_at);
    }

    pub fn tracked_clients(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // 从连接信息获取原始IP
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    // 从请求头中获取IP，拿不到地址时退到共享的 "unknown" 键而不是拒绝请求
    let ip = req
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or_else(|| remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string();

    match limiter.check(&ip) {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::warn!("rate limit exceeded for {}, retry after {}s", ip, retry_after);
            AppError::RateLimited { retry_after }.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_exactly_capacity_plus_one_is_denied() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 30);
        for i in 1..=30 {
            assert!(limiter.check("10.0.0.1").is_ok(), "request {} should pass", i);
        }
        let retry_after = limiter.check("10.0.0.1").expect_err("31st request should be denied");
        assert!(retry_after >= 1 && retry_after <= 60);
    }

    #[test]
    fn test_clients_are_counted_independently() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_err());
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn test_window_expiry_restarts_count() {
        let limiter = RateLimiter::new(Duration::from_millis(20), 1);
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_err());

        thread::sleep(Duration::from_millis(40));
        assert!(limiter.check("10.0.0.1").is_ok(), "new window should admit again");
        assert!(limiter.check("10.0.0.1").is_err());
    }

    #[test]
    fn test_sweep_drops_expired_records_only() {
        let limiter = RateLimiter::new(Duration::from_millis(20), 30);
        limiter.check("10.0.0.1").unwrap();
        thread::sleep(Duration::from_millis(40));
        limiter.check("10.0.0.2").unwrap();

        limiter.sweep();
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
