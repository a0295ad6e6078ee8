//! 工作流上下文
//!
//! 持有生成流程的全部可变状态：当前步骤、草稿列表、选中下标、运行状态、撤销槽。
//! 所有修改都在这里完成，异步调用只发生在 `GenerationFlow` 中的 await 点之间。

use crate::error::ValidationError;
use crate::models::{Draft, RunReport, Topic};
use crate::services::{DraftEditor, DraftField, TestCaseField, UndoHandle};

/// 流程步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    /// 填写生成参数
    #[default]
    Configuring,
    /// 预览、编辑生成的草稿
    Previewing,
}

impl Step {
    pub fn index(self) -> usize {
        match self {
            Step::Configuring => 0,
            Step::Previewing => 1,
        }
    }
}

/// 选中草稿的运行状态，只保存当前选中草稿的一次结果
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Finished(RunReport),
    Failed(String),
}

/// 一次运行的凭据，结果回来时用 epoch 判断是否已过期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    epoch: u64,
    pub draft_index: usize,
}

#[derive(Debug, Clone)]
struct DeletedDraft {
    handle: UndoHandle,
    draft: Draft,
    original_index: usize,
}

/// 工作流上下文
#[derive(Debug, Default)]
pub struct WorkflowCtx {
    step: Step,
    drafts: Vec<Draft>,
    active: usize,
    run: RunState,
    /// 选中草稿或其测试用例结构变化时递增
    run_epoch: u64,
    undo: Option<DeletedDraft>,
    next_undo_id: u64,
    topics: Vec<Topic>,
}

impl WorkflowCtx {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 只读访问 ==========

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    /// 下标越界直接 panic
    pub fn draft(&self, index: usize) -> &Draft {
        self.check_index(index);
        &self.drafts[index]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_draft(&self) -> Option<&Draft> {
        self.drafts.get(self.active)
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn is_running(&self) -> bool {
        matches!(self.run, RunState::Running)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn topic_name(&self, id: &str) -> Option<&str> {
        self.topics
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }

    pub fn pending_undo(&self) -> Option<UndoHandle> {
        self.undo.as_ref().map(|d| d.handle)
    }

    // ========== 步骤切换 ==========

    /// 生成成功：整体替换草稿列表，进入预览
    pub fn enter_preview(&mut self, drafts: Vec<Draft>) {
        self.drafts = drafts;
        self.active = 0;
        self.undo = None;
        self.step = Step::Previewing;
        self.invalidate_run();
    }

    /// 回到填写参数步骤，丢弃所有未提交的草稿
    pub fn reset(&mut self) {
        self.drafts.clear();
        self.active = 0;
        self.undo = None;
        self.step = Step::Configuring;
        self.invalidate_run();
    }

    pub fn set_topics(&mut self, topics: Vec<Topic>) {
        self.topics = topics;
    }

    // ========== 选中与删除 ==========

    /// 设置选中下标（钳制到合法范围），切换时清空运行状态
    pub fn select_active(&mut self, index: usize) {
        let clamped = index.min(self.drafts.len().saturating_sub(1));
        if clamped != self.active {
            self.active = clamped;
            self.invalidate_run();
        }
    }

    /// 删除草稿并放入撤销槽；新的删除会顶替上一条撤销
    pub fn delete_draft(&mut self, index: usize) -> UndoHandle {
        self.check_index(index);
        let draft = self.drafts.remove(index);

        self.next_undo_id += 1;
        let handle = UndoHandle(self.next_undo_id);
        self.undo = Some(DeletedDraft {
            handle,
            draft,
            original_index: index,
        });

        self.clamp_active();
        self.invalidate_run();
        handle
    }

    /// 撤销删除，插回 `min(原下标, 当前长度)`；凭据已失效时返回 false
    pub fn undo_delete(&mut self, handle: UndoHandle) -> bool {
        if self.pending_undo() != Some(handle) {
            return false;
        }
        let Some(deleted) = self.undo.take() else {
            return false;
        };

        let position = deleted.original_index.min(self.drafts.len());
        self.drafts.insert(position, deleted.draft);
        self.clamp_active();
        self.invalidate_run();
        true
    }

    /// 提示被关闭，撤销不再可用
    pub fn dismiss_undo(&mut self, handle: UndoHandle) {
        if self.pending_undo() == Some(handle) {
            self.undo = None;
        }
    }

    /// 提交成功后移除草稿
    pub fn remove_committed(&mut self, index: usize) -> Draft {
        self.check_index(index);
        let draft = self.drafts.remove(index);
        self.clamp_active();
        self.invalidate_run();
        draft
    }

    // ========== 编辑 ==========

    pub fn begin_edit(&mut self, index: usize) {
        DraftEditor::begin_edit(self.draft_mut(index));
    }

    pub fn end_edit(&mut self, index: usize) {
        DraftEditor::end_edit(self.draft_mut(index));
    }

    pub fn update_field(&mut self, index: usize, field: DraftField) {
        DraftEditor::update_field(self.draft_mut(index), field);
    }

    pub fn update_test_case(&mut self, index: usize, case_index: usize, field: TestCaseField) {
        DraftEditor::update_test_case(self.draft_mut(index), case_index, field);
    }

    /// 新增测试用例，结构变化会清空运行状态
    pub fn add_test_case(&mut self, index: usize) -> usize {
        let case_index = DraftEditor::add_test_case(self.draft_mut(index));
        self.invalidate_run();
        case_index
    }

    /// 删除测试用例，已有结果的下标失效，清空运行状态
    pub fn delete_test_case(&mut self, index: usize, case_index: usize) {
        DraftEditor::delete_test_case(self.draft_mut(index), case_index);
        self.invalidate_run();
    }

    fn draft_mut(&mut self, index: usize) -> &mut Draft {
        self.check_index(index);
        &mut self.drafts[index]
    }

    // ========== 运行状态 ==========

    /// 开始运行选中的草稿，返回凭据和草稿快照
    pub fn begin_run(&mut self) -> Result<(RunTicket, Draft), ValidationError> {
        if self.is_running() {
            return Err(ValidationError::RunInProgress);
        }
        if self.step != Step::Previewing {
            return Err(ValidationError::WrongStep { action: "run" });
        }
        let draft = self
            .drafts
            .get(self.active)
            .cloned()
            .ok_or(ValidationError::NoActiveDraft)?;

        self.run = RunState::Running;
        let ticket = RunTicket {
            epoch: self.run_epoch,
            draft_index: self.active,
        };
        Ok((ticket, draft))
    }

    /// 写回运行结果；凭据过期（选中草稿已变）时丢弃并返回 false
    pub fn finish_run(&mut self, ticket: RunTicket, outcome: Result<RunReport, String>) -> bool {
        if ticket.epoch != self.run_epoch {
            return false;
        }
        self.run = match outcome {
            Ok(report) => RunState::Finished(report),
            Err(message) => RunState::Failed(message),
        };
        true
    }

    fn invalidate_run(&mut self) {
        self.run_epoch += 1;
        self.run = RunState::Idle;
    }

    fn clamp_active(&mut self) {
        self.active = self.active.min(self.drafts.len().saturating_sub(1));
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.drafts.len(),
            "草稿下标 {} 超出范围 (共 {} 个)",
            index,
            self.drafts.len()
        );
    }
}
