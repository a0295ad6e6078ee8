//! 判题运行 - 业务能力层
//!
//! 只负责"把一个草稿的参考答案跑一遍全部测试用例"，不关心当前选中的是哪个草稿。
//!
//! ## 流程
//! 1. 本地前置检查（答案、测试用例、语言），任何一项不满足都不发请求
//! 2. 每个测试用例构建一个提交，一次批量提交
//! 3. 用全部 token 一起轮询，直到没有排队/运行中的结果，或次数用尽
//! 4. 次数用尽时以最后一次结果为准（软超时，不是错误）

use crate::clients::JudgeApi;
use crate::config::Config;
use crate::error::{AppError, JudgeError, Result, ValidationError};
use crate::models::{Draft, JudgeSubmission, RunReport, RunResult, SubmissionResult};
use crate::services::language::language_id;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 可注入的等待，测试中替换为不真正睡眠的实现
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// 基于 tokio 定时器的等待
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 轮询策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(800),
            max_attempts: 10,
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: Duration::from_millis(config.judge_poll_interval_ms),
            max_attempts: config.judge_max_poll_attempts.max(1),
        }
    }
}

/// 判题运行器
pub struct JudgeRunner<J, S = TokioSleeper> {
    api: J,
    sleeper: S,
    policy: PollPolicy,
    default_memory_limit: u64,
}

impl<J: JudgeApi> JudgeRunner<J, TokioSleeper> {
    /// 使用真实定时器创建
    pub fn new(api: J, config: &Config) -> Self {
        Self::with_sleeper(
            api,
            TokioSleeper,
            PollPolicy::from_config(config),
            config.default_memory_limit,
        )
    }
}

impl<J: JudgeApi, S: Sleeper> JudgeRunner<J, S> {
    pub fn with_sleeper(api: J, sleeper: S, policy: PollPolicy, default_memory_limit: u64) -> Self {
        Self {
            api,
            sleeper,
            policy,
            default_memory_limit,
        }
    }

    pub fn api(&self) -> &J {
        &self.api
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// 本地前置检查，通过时返回判题语言 id
    pub fn check_preconditions(draft: &Draft) -> std::result::Result<u32, ValidationError> {
        let has_solution = draft
            .solution
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_solution {
            return Err(ValidationError::MissingSolution);
        }

        if draft.test_cases.is_empty() {
            return Err(ValidationError::NoTestCases);
        }

        let language = draft.solution_language.as_deref().unwrap_or_default();
        language_id(language).ok_or_else(|| ValidationError::UnsupportedLanguage {
            language: language.to_string(),
        })
    }

    /// 每个测试用例构建一个提交
    pub fn build_submissions(&self, draft: &Draft, language_id: u32) -> Vec<JudgeSubmission> {
        let source_code = draft.solution.clone().unwrap_or_default();
        let cpu_time_limit = draft.time_limit.max(1.0);
        let memory_limit = if draft.memory > 0 {
            draft.memory
        } else {
            self.default_memory_limit
        };

        draft
            .test_cases
            .iter()
            .map(|tc| JudgeSubmission {
                language_id,
                source_code: source_code.clone(),
                stdin: tc.input.clone(),
                expected_output: tc.output.clone(),
                cpu_time_limit,
                memory_limit,
            })
            .collect()
    }

    /// 运行草稿的全部测试用例
    ///
    /// 提交失败、轮询失败、没有任何 token 都作为整次运行的失败返回，不保留部分结果
    pub async fn run(&self, draft: &Draft) -> Result<RunReport> {
        let language_id = Self::check_preconditions(draft)?;
        let submissions = self.build_submissions(draft, language_id);

        info!(
            "📤 提交判题: 草稿 {}，{} 个测试用例，语言 id {}",
            draft.code,
            submissions.len(),
            language_id
        );

        let tokens = self
            .api
            .submit_batch(&submissions)
            .await
            .map_err(JudgeError::SubmitFailed)?;

        if tokens.len() > submissions.len() {
            warn!(
                "⚠️ 判题服务返回了 {} 个 token，多于 {} 个提交，忽略多余部分",
                tokens.len(),
                submissions.len()
            );
        }

        // (测试用例下标, token)
        let indexed: Vec<(usize, String)> = tokens
            .into_iter()
            .take(submissions.len())
            .enumerate()
            .filter_map(|(idx, t)| t.token.filter(|s| !s.is_empty()).map(|s| (idx, s)))
            .collect();

        if indexed.is_empty() {
            return Err(AppError::Judge(JudgeError::NoTokens));
        }
        if indexed.len() < submissions.len() {
            warn!(
                "⚠️ 判题服务只返回了 {}/{} 个 token",
                indexed.len(),
                submissions.len()
            );
        }

        let token_list: Vec<String> = indexed.iter().map(|(_, t)| t.clone()).collect();
        let snapshot = self.poll(&token_list).await?;

        let mut results: Vec<RunResult> = draft
            .test_cases
            .iter()
            .enumerate()
            .map(|(index, tc)| RunResult {
                index,
                input: tc.input.clone(),
                expected: tc.output.clone(),
                actual_output: String::new(),
                stderr: String::new(),
                status_id: None,
                elapsed_time: None,
            })
            .collect();

        for (pos, (index, _)) in indexed.iter().enumerate() {
            if let (Some(Some(sub)), Some(result)) = (snapshot.get(pos), results.get_mut(*index)) {
                fill_result(result, sub);
            }
        }

        let report = RunReport { results };
        info!(
            "✓ 判题完成: 草稿 {}，通过 {}/{}",
            draft.code,
            report.passed(),
            report.total()
        );
        Ok(report)
    }

    /// 用全部 token 一起轮询，每次都等上一次完成后再发起
    async fn poll(
        &self,
        tokens: &[String],
    ) -> std::result::Result<Vec<Option<SubmissionResult>>, JudgeError> {
        let mut last = Vec::new();

        for attempt in 1..=self.policy.max_attempts {
            self.sleeper.sleep(self.policy.interval).await;

            let batch = self
                .api
                .get_batch(tokens)
                .await
                .map_err(JudgeError::PollFailed)?;

            let pending = batch
                .iter()
                .filter(|r| r.as_ref().map_or(true, SubmissionResult::is_pending))
                .count();
            last = batch;

            debug!(
                "轮询 {}/{}: 未完成 {}",
                attempt, self.policy.max_attempts, pending
            );

            if pending == 0 {
                return Ok(last);
            }
        }

        warn!(
            "⚠️ 轮询 {} 次后仍有未完成的提交，使用最后一次结果",
            self.policy.max_attempts
        );
        Ok(last)
    }
}

fn fill_result(result: &mut RunResult, sub: &SubmissionResult) {
    result.actual_output = sub.stdout.clone().unwrap_or_default();
    result.stderr = [&sub.stderr, &sub.compile_output, &sub.message]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .cloned()
        .unwrap_or_default();
    result.status_id = sub.status_id;
    result.elapsed_time = sub.time;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::{SubmissionToken, TestCase};
    use crate::testing::{FakeJudgeApi, RecordingSleeper};
    use tokio_test::assert_ok;

    fn draft() -> Draft {
        Draft {
            code: "ECHO".to_string(),
            solution: Some("print(input())".to_string()),
            solution_language: Some("Python".to_string()),
            time_limit: 0.5,
            memory: 0,
            test_cases: vec![
                TestCase {
                    input: "a".to_string(),
                    output: "a".to_string(),
                    ..TestCase::blank()
                },
                TestCase {
                    input: "b".to_string(),
                    output: "b".to_string(),
                    ..TestCase::blank()
                },
            ],
            ..Default::default()
        }
    }

    fn make_runner(api: FakeJudgeApi) -> JudgeRunner<FakeJudgeApi, RecordingSleeper> {
        JudgeRunner::with_sleeper(
            api,
            RecordingSleeper::default(),
            PollPolicy::default(),
            128_000,
        )
    }

    fn tokens(n: usize) -> Vec<SubmissionToken> {
        (0..n)
            .map(|i| SubmissionToken {
                token: Some(format!("tok-{}", i)),
            })
            .collect()
    }

    fn result(status: u32, stdout: &str) -> Option<SubmissionResult> {
        Some(SubmissionResult {
            status_id: Some(status),
            stdout: Some(stdout.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_preconditions() {
        let mut d = draft();
        d.solution = Some("   ".to_string());
        assert_eq!(
            JudgeRunner::<FakeJudgeApi>::check_preconditions(&d),
            Err(ValidationError::MissingSolution)
        );

        let mut d = draft();
        d.test_cases.clear();
        assert_eq!(
            JudgeRunner::<FakeJudgeApi>::check_preconditions(&d),
            Err(ValidationError::NoTestCases)
        );

        let mut d = draft();
        d.solution_language = Some("COBOL".to_string());
        assert_eq!(
            JudgeRunner::<FakeJudgeApi>::check_preconditions(&d),
            Err(ValidationError::UnsupportedLanguage {
                language: "COBOL".to_string()
            })
        );

        assert_eq!(JudgeRunner::<FakeJudgeApi>::check_preconditions(&draft()), Ok(71));
    }

    #[test]
    fn test_build_submissions_limits() {
        let runner = make_runner(FakeJudgeApi::default());
        let mut d = draft();
        let subs = runner.build_submissions(&d, 71);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].cpu_time_limit, 1.0);
        assert_eq!(subs[0].memory_limit, 128_000);
        assert_eq!(subs[1].stdin, "b");

        d.time_limit = 3.0;
        d.memory = 256_000;
        let subs = runner.build_submissions(&d, 71);
        assert_eq!(subs[0].cpu_time_limit, 3.0);
        assert_eq!(subs[0].memory_limit, 256_000);
    }

    #[tokio::test]
    async fn test_missing_solution_never_calls_service() {
        let runner = make_runner(FakeJudgeApi::default());
        let mut d = draft();
        d.solution = None;

        let err = runner.run(&d).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingSolution)
        ));
        assert_eq!(runner.api().submit_calls(), 0);
        assert_eq!(runner.api().status_calls(), 0);
    }

    #[tokio::test]
    async fn test_polls_until_complete() {
        let api = FakeJudgeApi::default();
        api.push_submit(Ok(tokens(2)));
        for _ in 0..3 {
            api.push_status(Ok(vec![result(1, ""), result(2, "")]));
        }
        api.push_status(Ok(vec![result(3, "a\n"), result(4, "x")]));
        // 不应被读取
        api.push_status(Ok(vec![result(3, "a"), result(3, "b")]));

        let runner = make_runner(api);
        let report = assert_ok!(runner.run(&draft()).await);

        assert_eq!(runner.api().status_calls(), 4);
        assert_eq!(runner.sleeper().calls().len(), 4);
        assert_eq!(runner.sleeper().calls()[0], Duration::from_millis(800));
        assert_eq!(report.total(), 2);
        assert!(report.results[0].is_passed());
        assert!(!report.results[1].is_passed());
        assert_eq!(runner.api().last_tokens(), vec!["tok-0", "tok-1"]);
    }

    #[tokio::test]
    async fn test_soft_timeout_uses_last_snapshot() {
        let api = FakeJudgeApi::default();
        api.push_submit(Ok(tokens(2)));
        for _ in 0..9 {
            api.push_status(Ok(vec![result(2, ""), result(2, "")]));
        }
        api.push_status(Ok(vec![result(3, "a"), result(2, "")]));

        let runner = make_runner(api);
        let report = assert_ok!(runner.run(&draft()).await);

        assert_eq!(runner.api().status_calls(), 10);
        assert!(report.results[0].is_passed());
        assert!(!report.results[1].is_passed());
        assert!(report.results[1].verdict().is_pending());
    }

    #[tokio::test]
    async fn test_no_tokens_is_failure() {
        let api = FakeJudgeApi::default();
        api.push_submit(Ok(vec![SubmissionToken { token: None }, SubmissionToken { token: None }]));

        let runner = make_runner(api);
        let err = runner.run(&draft()).await.unwrap_err();
        assert!(matches!(err, AppError::Judge(JudgeError::NoTokens)));
        assert_eq!(runner.api().status_calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_and_poll_failures() {
        let api = FakeJudgeApi::default();
        api.push_submit(Err(ApiError::BadResponse {
            endpoint: "submissions/batch".to_string(),
            status: 503,
            message: None,
        }));
        let runner = make_runner(api);
        let err = runner.run(&draft()).await.unwrap_err();
        assert!(matches!(err, AppError::Judge(JudgeError::SubmitFailed(_))));

        let api = FakeJudgeApi::default();
        api.push_submit(Ok(tokens(2)));
        api.push_status(Ok(vec![result(1, ""), result(1, "")]));
        api.push_status(Err(ApiError::EmptyResponse {
            endpoint: "submissions/batch".to_string(),
        }));
        let runner = make_runner(api);
        let err = runner.run(&draft()).await.unwrap_err();
        assert!(matches!(err, AppError::Judge(JudgeError::PollFailed(_))));
        assert_eq!(runner.api().status_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_leaves_case_unresolved() {
        let api = FakeJudgeApi::default();
        api.push_submit(Ok(vec![
            SubmissionToken { token: None },
            SubmissionToken {
                token: Some("tok-1".to_string()),
            },
        ]));
        api.push_status(Ok(vec![result(3, "b")]));

        let runner = make_runner(api);
        let report = assert_ok!(runner.run(&draft()).await);
        assert_eq!(runner.api().last_tokens(), vec!["tok-1"]);
        assert_eq!(report.results[0].status_id, None);
        assert!(report.results[1].is_passed());
        assert_eq!(report.passed(), 1);
    }

    #[tokio::test]
    async fn test_extra_tokens_are_ignored() {
        let api = FakeJudgeApi::default();
        api.push_submit(Ok(tokens(3)));
        api.push_status(Ok(vec![result(3, "a"), result(3, "b")]));

        let runner = make_runner(api);
        let report = assert_ok!(runner.run(&draft()).await);
        assert_eq!(runner.api().last_tokens(), vec!["tok-0", "tok-1"]);
        assert_eq!(report.total(), 2);
        assert!(report.all_passed());

        let api = FakeJudgeApi::default();
        api.push_submit(Ok(tokens(2)));
        api.push_status(Ok(vec![result(3, "a"), result(3, "b")]));
        let mut single = draft();
        single.test_cases.truncate(1);

        let runner = make_runner(api);
        let report = assert_ok!(runner.run(&single).await);
        assert_eq!(runner.api().last_tokens(), vec!["tok-0"]);
        assert_eq!(report.total(), 1);
        assert!(report.results[0].is_passed());
    }
}
