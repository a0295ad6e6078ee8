//! 内存实现的外部依赖，用于测试和离线演示
//!
//! 响应按入队顺序依次返回，调用次数和请求参数都会被记录。

use crate::clients::{ExerciseApi, JudgeApi};
use crate::error::ApiError;
use crate::models::{
    ExercisePayload, GeneratedExercise, GenerationRequest, JudgeSubmission, SubmissionResult,
    SubmissionToken, Topic,
};
use crate::services::{Notice, Notifier, Sleeper};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn exhausted(endpoint: &str) -> ApiError {
    ApiError::EmptyResponse {
        endpoint: endpoint.to_string(),
    }
}

/// 题库后端的内存实现
#[derive(Default)]
pub struct FakeExerciseApi {
    generate_responses: Mutex<VecDeque<Result<Vec<GeneratedExercise>, ApiError>>>,
    create_responses: Mutex<VecDeque<Result<Option<String>, ApiError>>>,
    topics_response: Mutex<Option<Result<Vec<Topic>, ApiError>>>,
    generate_calls: AtomicUsize,
    created: Mutex<Vec<ExercisePayload>>,
    create_attempts: AtomicUsize,
}

impl FakeExerciseApi {
    pub fn push_generate(&self, response: Result<Vec<GeneratedExercise>, ApiError>) {
        self.generate_responses.lock().unwrap().push_back(response);
    }

    /// 创建接口的响应；队列为空时默认成功
    pub fn push_create(&self, response: Result<Option<String>, ApiError>) {
        self.create_responses.lock().unwrap().push_back(response);
    }

    pub fn set_topics(&self, response: Result<Vec<Topic>, ApiError>) {
        *self.topics_response.lock().unwrap() = Some(response);
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn create_attempts(&self) -> usize {
        self.create_attempts.load(Ordering::SeqCst)
    }

    /// 成功创建的请求体
    pub fn created(&self) -> Vec<ExercisePayload> {
        self.created.lock().unwrap().clone()
    }
}

impl ExerciseApi for FakeExerciseApi {
    async fn generate_exercises(
        &self,
        _request: &GenerationRequest,
    ) -> Result<Vec<GeneratedExercise>, ApiError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.generate_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("exercises/generate")))
    }

    async fn create_exercise(&self, payload: &ExercisePayload) -> Result<Option<String>, ApiError> {
        let attempt = self.create_attempts.fetch_add(1, Ordering::SeqCst);
        let response = self
            .create_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some(format!("ex-{}", attempt + 1))));
        if response.is_ok() {
            self.created.lock().unwrap().push(payload.clone());
        }
        response
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, ApiError> {
        self.topics_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// 判题沙箱的内存实现
#[derive(Default)]
pub struct FakeJudgeApi {
    submit_responses: Mutex<VecDeque<Result<Vec<SubmissionToken>, ApiError>>>,
    status_responses: Mutex<VecDeque<Result<Vec<Option<SubmissionResult>>, ApiError>>>,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
    submitted: Mutex<Vec<JudgeSubmission>>,
    last_tokens: Mutex<Vec<String>>,
}

impl FakeJudgeApi {
    pub fn push_submit(&self, response: Result<Vec<SubmissionToken>, ApiError>) {
        self.submit_responses.lock().unwrap().push_back(response);
    }

    pub fn push_status(&self, response: Result<Vec<Option<SubmissionResult>>, ApiError>) {
        self.status_responses.lock().unwrap().push_back(response);
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<JudgeSubmission> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn last_tokens(&self) -> Vec<String> {
        self.last_tokens.lock().unwrap().clone()
    }
}

impl JudgeApi for FakeJudgeApi {
    async fn submit_batch(
        &self,
        submissions: &[JudgeSubmission],
    ) -> Result<Vec<SubmissionToken>, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().extend_from_slice(submissions);
        self.submit_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("submissions/batch")))
    }

    async fn get_batch(
        &self,
        tokens: &[String],
    ) -> Result<Vec<Option<SubmissionResult>>, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_tokens.lock().unwrap() = tokens.to_vec();
        self.status_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("submissions/batch")))
    }
}

/// 只记录等待时长、不真正睡眠
#[derive(Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}

/// 记录全部提示，克隆后共享同一份记录
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
