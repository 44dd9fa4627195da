use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub gold_api_key: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub rates_cache_secs: u64,
    pub gold_cache_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub history_file: PathBuf,
    pub rates_api_url: String,
    pub gold_api_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        // GOLD_API_KEY 缺失时服务仍然启动，/gold 走降级路径
        let gold_api_key = env::var("GOLD_API_KEY").ok().filter(|k| !k.is_empty());

        Config {
            gold_api_key,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            rates_cache_secs: env::var("RATES_CACHE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5 * 60),
            gold_cache_secs: env::var("GOLD_CACHE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 60),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            history_file: env::var("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("gold_history.json")),
            rates_api_url: env::var("RATES_API_URL")
                .unwrap_or_else(|_| "https://api.frankfurter.app".into()),
            gold_api_url: env::var("GOLD_API_URL")
                .unwrap_or_else(|_| "https://www.goldapi.io/api/XAU/USD".into()),
        }
    }

    pub fn rates_cache_duration(&self) -> Duration {
        Duration::from_secs(self.rates_cache_secs)
    }

    pub fn gold_cache_duration(&self) -> Duration {
        Duration::from_secs(self.gold_cache_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}
