/// 题库后端 API 客户端
///
/// 封装生成、创建题目、主题目录三个接口
use crate::clients::http::{parse_json, read_body, read_json};
use crate::clients::ExerciseApi;
use crate::config::Config;
use crate::error::{AppError, ApiError, Result};
use crate::models::{
    ExercisePayload, GeneratedExercise, GenerationRequest, GenerationResponse, Topic,
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const GENERATE_PATH: &str = "exercises/generate";
const EXERCISES_PATH: &str = "exercises";
const TOPICS_PATH: &str = "topics";

/// 题库后端客户端
pub struct ExerciseClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ExerciseClient {
    /// 创建新的题库客户端
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(&config.exercise_api_base_url, e))?;

        Ok(Self {
            http,
            base_url: config.exercise_api_base_url.trim_end_matches('/').to_string(),
            token: config.exercise_api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        endpoint: &str,
        builder: reqwest::RequestBuilder,
    ) -> std::result::Result<reqwest::Response, ApiError> {
        self.authorized(builder)
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}

impl ExerciseApi for ExerciseClient {
    async fn generate_exercises(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<Vec<GeneratedExercise>, ApiError> {
        debug!("调用生成接口: {:?}", request);
        let response = self
            .send(GENERATE_PATH, self.http.post(self.url(GENERATE_PATH)).json(request))
            .await?;
        let body: GenerationResponse = read_json(GENERATE_PATH, response).await?;
        Ok(body.exercises)
    }

    async fn create_exercise(
        &self,
        payload: &ExercisePayload,
    ) -> std::result::Result<Option<String>, ApiError> {
        debug!("创建题目 Payload: code={}", payload.code);
        let response = self
            .send(EXERCISES_PATH, self.http.post(self.url(EXERCISES_PATH)).json(payload))
            .await?;
        let body = read_body(EXERCISES_PATH, response).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = parse_json(EXERCISES_PATH, &body)?;
        Ok(extract_created_id(&value))
    }

    async fn list_topics(&self) -> std::result::Result<Vec<Topic>, ApiError> {
        let response = self
            .send(TOPICS_PATH, self.http.get(self.url(TOPICS_PATH)))
            .await?;
        read_json(TOPICS_PATH, response).await
    }
}

/// 提取创建结果中的 id，兼容 `{id}` 与 `{data: {id}}`
fn extract_created_id(value: &Value) -> Option<String> {
    let id = value
        .get("id")
        .or_else(|| value.get("data").and_then(|d| d.get("id")))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_trims_trailing_slash() {
        let config = Config {
            exercise_api_base_url: "http://localhost:8080/api/".to_string(),
            ..Default::default()
        };
        let client = ExerciseClient::new(&config).unwrap();
        assert_eq!(
            client.url(GENERATE_PATH),
            "http://localhost:8080/api/exercises/generate"
        );
    }

    #[test]
    fn test_extract_created_id() {
        assert_eq!(extract_created_id(&json!({"id": 42})), Some("42".to_string()));
        assert_eq!(
            extract_created_id(&json!({"data": {"id": "ex-1"}})),
            Some("ex-1".to_string())
        );
        assert_eq!(extract_created_id(&json!({"ok": true})), None);
    }
}
