use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
}

/// 每日金价历史，整个序列存放在一个 JSON 文件里，每次追加整体重写。
///
/// Load failure degrades to an empty sequence and write failure is reported to
/// the caller; neither may fail a request.
pub struct HistoryStore {
    path: PathBuf,
    // 进程内串行化 read-modify-write；跨进程并发写不在保障范围内
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Vec<HistoryEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            // 文件还不存在是正常情况（首次运行）
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!("failed to read history file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("history file {:?} is corrupt: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// 当天已有记录则不写（幂等），否则追加 2 位小数的价格并重写文件
    pub fn append_today(&self, price_usd: f64) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().unwrap();

        let mut history = self.load();
        let today = Utc::now().format("%Y-%m-%d").to_string();

        if history.iter().any(|entry| entry.date == today) {
            return Ok(());
        }

        history.push(HistoryEntry {
            date: today.clone(),
            price_usd: (price_usd * 100.0).round() / 100.0,
        });

        self.save(&history)?;
        tracing::info!("stored gold price for {}", today);
        Ok(())
    }

    /// 按位置取最后 n 条；n 超过总数时全部返回，n <= 0 返回空
    pub fn recent(&self, n: i64) -> Vec<HistoryEntry> {
        if n <= 0 {
            return Vec::new();
        }
        let history = self.load();
        let skip = history.len().saturating_sub(n as usize);
        history.into_iter().skip(skip).collect()
    }

    fn save(&self, history: &[HistoryEntry]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(history)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
