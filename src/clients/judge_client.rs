/// 判题沙箱客户端（Judge0 兼容接口）
///
/// 只提供批量提交和批量查询两个能力，轮询逻辑在 `JudgeRunner` 中
use crate::clients::http::read_json;
use crate::clients::JudgeApi;
use crate::config::Config;
use crate::error::{AppError, ApiError, Result};
use crate::models::{BatchStatusResponse, JudgeSubmission, SubmissionResult, SubmissionToken};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const BATCH_PATH: &str = "submissions/batch";
const RESULT_FIELDS: &str = "token,stdout,stderr,compile_output,message,status_id,time,memory";

#[derive(Serialize)]
struct BatchRequest<'a> {
    submissions: &'a [JudgeSubmission],
}

/// 判题沙箱客户端
pub struct JudgeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl JudgeClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(&config.judge_api_base_url, e))?;

        Ok(Self {
            http,
            base_url: config.judge_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.judge_api_key.clone(),
        })
    }

    fn batch_url(&self) -> String {
        format!("{}/{}", self.base_url, BATCH_PATH)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("X-Auth-Token", key),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> std::result::Result<reqwest::Response, ApiError> {
        self.with_auth(builder)
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: BATCH_PATH.to_string(),
                source,
            })
    }
}

impl JudgeApi for JudgeClient {
    async fn submit_batch(
        &self,
        submissions: &[JudgeSubmission],
    ) -> std::result::Result<Vec<SubmissionToken>, ApiError> {
        debug!("批量提交 {} 个判题请求", submissions.len());
        let builder = self
            .http
            .post(self.batch_url())
            .query(&[("base64_encoded", "false")])
            .json(&BatchRequest { submissions });
        let response = self.send(builder).await?;
        read_json(BATCH_PATH, response).await
    }

    async fn get_batch(
        &self,
        tokens: &[String],
    ) -> std::result::Result<Vec<Option<SubmissionResult>>, ApiError> {
        let builder = self.http.get(self.batch_url()).query(&[
            ("tokens", tokens.join(",").as_str()),
            ("base64_encoded", "false"),
            ("fields", RESULT_FIELDS),
        ]);
        let response = self.send(builder).await?;
        let body: BatchStatusResponse = read_json(BATCH_PATH, response).await?;
        Ok(body.submissions)
    }
}
