/// 通用的响应处理
///
/// 非 2xx 响应统一转换为 `ApiError::BadResponse`，并尽量提取服务端的错误信息
use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// 读取响应体，检查状态码
pub async fn read_body(endpoint: &str, response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source,
        })?;

    debug!("{} 响应: status={}, 长度={}", endpoint, status, body.len());

    if !status.is_success() {
        return Err(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: extract_error_message(&body),
        });
    }

    Ok(body)
}

/// 读取并解析 JSON 响应，空响应体视为错误
pub async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let body = read_body(endpoint, response).await?;
    parse_json(endpoint, &body)
}

pub fn parse_json<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::EmptyResponse {
            endpoint: endpoint.to_string(),
        });
    }
    serde_json::from_str(body).map_err(|source| ApiError::JsonParseFailed {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// 从错误响应体中提取可读信息
///
/// 依次查找 `message`、`error`、`error.message`；响应不是 JSON 时返回 None
#[allow(clippy::let_and_return)]
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let candidates = [
        value.get("message"),
        value.get("error"),
        value.get("error").and_then(|e| e.get("message")),
    ];

    let found = candidates
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty());
    found
}
