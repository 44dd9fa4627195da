use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// 未配置 GOLD_API_KEY，无法请求实时金价
    #[error("GOLD_API_KEY is not configured")]
    ConfigMissing,

    #[error("upstream request failed: {0}")]
    UpstreamUnavailable(#[from] reqwest::Error),

    /// 上游返回了 2xx 但缺少预期字段
    #[error("upstream response missing field `{0}`")]
    UpstreamMalformed(&'static str),

    #[error("history persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("too many requests, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
}

#[derive(Serialize)]
struct RateLimitBody {
    error: &'static str,
    #[serde(rename = "retryAfter")]
    retry_after: u64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // 唯一会以非 200 暴露给客户端的错误
            AppError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(RateLimitBody {
                    error: "Too many requests",
                    retry_after,
                }),
            )
                .into_response(),
            // 其余错误都被降级链吸收，这里只是兜底
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
