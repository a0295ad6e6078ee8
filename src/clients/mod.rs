//! HTTP 客户端 - 基础设施层
//!
//! 每个外部服务对应一个 trait，流程层只依赖 trait，
//! 测试中用内存实现替换真实的 HTTP 客户端。

pub mod exercise_client;
pub mod http;
pub mod judge_client;

pub use exercise_client::ExerciseClient;
pub use judge_client::JudgeClient;

use crate::error::ApiError;
use crate::models::{
    ExercisePayload, GeneratedExercise, GenerationRequest, JudgeSubmission, SubmissionResult,
    SubmissionToken, Topic,
};

/// 题库后端：生成、持久化、主题目录
#[allow(async_fn_in_trait)]
pub trait ExerciseApi {
    /// 调用生成接口
    async fn generate_exercises(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedExercise>, ApiError>;

    /// 创建一道题目，返回服务端分配的 id（如果有）
    async fn create_exercise(&self, payload: &ExercisePayload) -> Result<Option<String>, ApiError>;

    /// 获取主题目录
    async fn list_topics(&self) -> Result<Vec<Topic>, ApiError>;
}

/// 判题沙箱：批量提交、按 token 批量查询
#[allow(async_fn_in_trait)]
pub trait JudgeApi {
    async fn submit_batch(
        &self,
        submissions: &[JudgeSubmission],
    ) -> Result<Vec<SubmissionToken>, ApiError>;

    /// 结果顺序与 `tokens` 一致，无效 token 对应 `None`
    async fn get_batch(&self, tokens: &[String]) -> Result<Vec<Option<SubmissionResult>>, ApiError>;
}
