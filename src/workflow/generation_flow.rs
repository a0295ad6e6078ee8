//! 题目生成流程 - 流程层
//!
//! 核心职责：驱动"一次生成"的完整流程
//!
//! 流程顺序：
//! 1. 填写参数 → 调用生成接口 → 进入预览
//! 2. 预览中编辑草稿、运行判题
//! 3. 提交单个或全部草稿 → 回到填写参数
//!
//! 所有失败都通过 `Notifier` 提示，流程本身不会因为单次失败而中断。

use thiserror::Error;
use tracing::{error, info, warn};

use crate::clients::{ExerciseApi, JudgeApi};
use crate::error::{AppError, Result, ValidationError};
use crate::models::{Draft, GenerationRequest, RunReport};
use crate::services::{JudgeRunner, Notice, Notifier, Sleeper, TokioSleeper, UndoHandle};
use crate::utils::logging::{log_run_report, truncate_text};
use crate::workflow::workflow_ctx::{RunTicket, Step, WorkflowCtx};

/// 生成结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// 生成了 N 道草稿，已进入预览
    Generated(usize),
    /// 服务端没有返回任何题目，停留在填写参数步骤
    Empty,
}

/// 批量提交失败
#[derive(Debug, Error)]
pub enum CommitAllError {
    /// 没有发出任何请求
    #[error(transparent)]
    Rejected(AppError),
    /// 中途失败，之前已提交的题目不会回滚
    #[error("已提交 {committed} 道题目，{code} 提交失败: {source}")]
    Partial {
        committed: usize,
        code: String,
        #[source]
        source: AppError,
    },
}

impl CommitAllError {
    /// 失败前已成功提交的数量
    pub fn committed(&self) -> usize {
        match self {
            CommitAllError::Rejected(_) => 0,
            CommitAllError::Partial { committed, .. } => *committed,
        }
    }
}

/// 题目生成流程
///
/// - 持有工作流上下文和外部服务
/// - 决定何时校验、何时调用接口、何时切换步骤
pub struct GenerationFlow<A, J, S = TokioSleeper> {
    ctx: WorkflowCtx,
    exercise_api: A,
    judge: JudgeRunner<J, S>,
    notifier: Box<dyn Notifier>,
    verbose_logging: bool,
}

impl<A: ExerciseApi, J: JudgeApi, S: Sleeper> GenerationFlow<A, J, S> {
    pub fn new(exercise_api: A, judge: JudgeRunner<J, S>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            ctx: WorkflowCtx::new(),
            exercise_api,
            judge,
            notifier,
            verbose_logging: false,
        }
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    pub fn ctx(&self) -> &WorkflowCtx {
        &self.ctx
    }

    /// 编辑操作直接在上下文上进行
    pub fn ctx_mut(&mut self) -> &mut WorkflowCtx {
        &mut self.ctx
    }

    pub fn exercise_api(&self) -> &A {
        &self.exercise_api
    }

    pub fn judge(&self) -> &JudgeRunner<J, S> {
        &self.judge
    }

    // ========== 主题目录 ==========

    /// 加载主题目录，失败时保留原有缓存
    pub async fn load_topics(&mut self) -> Result<usize> {
        match self.exercise_api.list_topics().await {
            Ok(topics) => {
                let count = topics.len();
                info!("✓ 已加载 {} 个主题", count);
                self.ctx.set_topics(topics);
                Ok(count)
            }
            Err(e) => Err(self.report(AppError::Api(e))),
        }
    }

    // ========== 生成 ==========

    pub async fn generate(&mut self, request: &GenerationRequest) -> Result<GenerateOutcome> {
        if self.ctx.step() != Step::Configuring {
            return Err(self.report(ValidationError::WrongStep { action: "generate" }.into()));
        }
        if let Err(e) = request.validate() {
            return Err(self.report(e.into()));
        }

        info!(
            "🤖 正在生成题目: 主题 {}, 数量 {}, 每题 {} 个测试用例",
            request.topic,
            request.number_of_exercise,
            request.total_test_cases_per_exercise()
        );

        let exercises = match self.exercise_api.generate_exercises(request).await {
            Ok(exercises) => exercises,
            Err(e) => return Err(self.report(AppError::Api(e))),
        };

        if exercises.is_empty() {
            warn!("⚠️ 生成接口没有返回任何题目");
            self.notifier.notify(Notice::warning("没有生成任何题目，请调整参数后重试"));
            return Ok(GenerateOutcome::Empty);
        }

        let mut stripped_total = 0;
        let drafts: Vec<Draft> = exercises
            .into_iter()
            .map(|exercise| {
                let (draft, stripped) = exercise.into_draft();
                stripped_total += stripped;
                draft
            })
            .collect();

        if stripped_total > 0 {
            info!("已丢弃 {} 个服务端测试用例 id", stripped_total);
        }

        let count = drafts.len();
        for (idx, draft) in drafts.iter().enumerate() {
            info!(
                "[草稿 {}] {} | {} | {} 个测试用例",
                idx + 1,
                draft.code,
                truncate_text(&draft.title, 40),
                draft.test_cases.len()
            );
        }

        self.ctx.enter_preview(drafts);
        self.notifier
            .notify(Notice::success(format!("已生成 {} 道题目", count)));
        Ok(GenerateOutcome::Generated(count))
    }

    /// 放弃当前草稿，回到填写参数
    pub fn discard(&mut self) {
        if self.ctx.step() == Step::Previewing {
            info!("放弃 {} 道未提交的草稿", self.ctx.drafts().len());
        }
        self.ctx.reset();
    }

    // ========== 选中、删除、撤销 ==========

    pub fn select_active(&mut self, index: usize) {
        self.ctx.select_active(index);
    }

    /// 删除草稿并发出带撤销按钮的提示
    pub fn delete_draft(&mut self, index: usize) -> UndoHandle {
        let code = self.ctx.draft(index).code.clone();
        let handle = self.ctx.delete_draft(index);
        self.notifier
            .notify(Notice::undoable(format!("已删除草稿 {}", code), handle));
        handle
    }

    pub fn undo_delete(&mut self, handle: UndoHandle) -> bool {
        let restored = self.ctx.undo_delete(handle);
        if restored {
            self.notifier.notify(Notice::info("已恢复草稿"));
        }
        restored
    }

    pub fn dismiss_undo(&mut self, handle: UndoHandle) {
        self.ctx.dismiss_undo(handle);
    }

    // ========== 判题 ==========

    /// 运行选中的草稿
    ///
    /// 前置检查失败时不改变运行状态，也不会请求判题服务
    pub async fn run_active(&mut self) -> Result<RunReport> {
        let (ticket, draft) = self.begin_run()?;
        let outcome = self.judge.run(&draft).await;
        self.finish_run(ticket, outcome)
    }

    /// 开始运行选中的草稿，返回凭据和草稿快照
    ///
    /// 与 `finish_run` 配合使用时，调用方可以在两者之间切换选中的草稿，
    /// 过期的结果会在 `finish_run` 中被丢弃
    pub fn begin_run(&mut self) -> Result<(RunTicket, Draft)> {
        let draft = match self.ctx.active_draft() {
            Some(draft) => draft,
            None => return Err(self.report(ValidationError::NoActiveDraft.into())),
        };
        if let Err(e) = JudgeRunner::<J, S>::check_preconditions(draft) {
            return Err(self.report(e.into()));
        }

        self.ctx.begin_run().map_err(|e| self.report(e.into()))
    }

    /// 写回运行结果并提示；凭据过期时只记录日志，不覆盖当前状态
    pub fn finish_run(
        &mut self,
        ticket: RunTicket,
        outcome: Result<RunReport>,
    ) -> Result<RunReport> {
        let recorded = match &outcome {
            Ok(report) => Ok(report.clone()),
            Err(e) => Err(e.user_message()),
        };
        if !self.ctx.finish_run(ticket, recorded) {
            warn!("[草稿 {}] 选中的草稿已变化，丢弃运行结果", ticket.draft_index + 1);
            return outcome;
        }

        match outcome {
            Ok(report) => {
                log_run_report(ticket.draft_index + 1, &report, self.verbose_logging);
                let notice = format!("通过 {}/{} 个测试用例", report.passed(), report.total());
                if report.all_passed() {
                    self.notifier.notify(Notice::success(notice));
                } else {
                    self.notifier.notify(Notice::warning(notice));
                }
                Ok(report)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    // ========== 提交 ==========

    /// 提交单个草稿，成功后从列表中移除；列表清空时回到填写参数
    pub async fn commit_one(&mut self, index: usize) -> Result<Option<String>> {
        let payload = self.ctx.draft(index).to_payload();
        info!("[草稿 {}] 📤 正在提交 {}...", index + 1, payload.code);

        match self.exercise_api.create_exercise(&payload).await {
            Ok(id) => {
                self.ctx.remove_committed(index);
                info!("[草稿 {}] ✓ 提交成功, id={:?}", index + 1, id);
                self.notifier
                    .notify(Notice::success(format!("题目 {} 已保存", payload.code)));
                if self.ctx.drafts().is_empty() {
                    self.ctx.reset();
                }
                Ok(id)
            }
            Err(e) => Err(self.report(AppError::Api(e))),
        }
    }

    /// 依次提交全部草稿，遇到第一个失败即停止，不重试
    pub async fn commit_all(&mut self) -> std::result::Result<usize, CommitAllError> {
        if self.ctx.step() != Step::Previewing {
            let err = ValidationError::WrongStep { action: "commit" };
            return Err(CommitAllError::Rejected(self.report(err.into())));
        }
        if self.ctx.drafts().is_empty() {
            let err = ValidationError::NoDrafts;
            return Err(CommitAllError::Rejected(self.report(err.into())));
        }

        let total = self.ctx.drafts().len();
        let mut committed = 0;

        // 每次成功都会移除队首，所以始终提交下标 0
        while let Some(draft) = self.ctx.drafts().first() {
            let payload = draft.to_payload();
            info!(
                "[草稿 {}/{}] 📤 正在提交 {}...",
                committed + 1,
                total,
                payload.code
            );

            match self.exercise_api.create_exercise(&payload).await {
                Ok(_) => {
                    self.ctx.remove_committed(0);
                    committed += 1;
                }
                Err(e) => {
                    let source = AppError::Api(e);
                    error!(
                        "[草稿 {}/{}] ❌ 提交失败: {}",
                        committed + 1,
                        total,
                        source
                    );
                    self.notifier.notify(Notice::error(format!(
                        "已提交 {} 道题目，{} 提交失败: {}",
                        committed,
                        payload.code,
                        source.user_message()
                    )));
                    return Err(CommitAllError::Partial {
                        committed,
                        code: payload.code,
                        source,
                    });
                }
            }
        }

        info!("✓ 全部提交完成: {}/{}", committed, total);
        self.notifier
            .notify(Notice::success(format!("已提交 {} 道题目", committed)));
        self.ctx.reset();
        Ok(committed)
    }

    /// 记录并提示错误，原样返回便于 `return Err(...)`
    fn report(&self, err: AppError) -> AppError {
        match &err {
            AppError::Validation(_) => {
                warn!("⚠️ {}", err);
                self.notifier.notify(Notice::warning(err.user_message()));
            }
            _ => {
                error!("❌ {}", err);
                self.notifier.notify(Notice::error(err.user_message()));
            }
        }
        err
    }
}
