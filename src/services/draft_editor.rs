//! 草稿编辑 - 业务能力层
//!
//! 只负责修改单个草稿，不做校验，不关心流程。
//! 下标越界说明界面状态和数据不同步，直接 panic。

use crate::models::{Difficulty, Draft, TestCase, Visibility};
use std::collections::BTreeSet;

/// 草稿的单个字段，整体替换
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Code(String),
    Title(String),
    Description(String),
    Prompt(Option<String>),
    Solution(Option<String>),
    SolutionLanguage(Option<String>),
    Difficulty(Difficulty),
    Visibility(Option<Visibility>),
    TopicIds(BTreeSet<String>),
    TimeLimit(f64),
    Memory(u64),
}

/// 测试用例的单个字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestCaseField {
    Input(String),
    Output(String),
    Note(String),
    IsPublic(bool),
}

/// 草稿编辑器
pub struct DraftEditor;

impl DraftEditor {
    /// 进入编辑模式
    pub fn begin_edit(draft: &mut Draft) {
        draft.editing = true;
    }

    /// 退出编辑模式，不做任何校验
    pub fn end_edit(draft: &mut Draft) {
        draft.editing = false;
    }

    /// 替换单个字段
    pub fn update_field(draft: &mut Draft, field: DraftField) {
        match field {
            DraftField::Code(v) => draft.code = v,
            DraftField::Title(v) => draft.title = v,
            DraftField::Description(v) => draft.description = v,
            DraftField::Prompt(v) => draft.prompt = v,
            DraftField::Solution(v) => draft.solution = v,
            DraftField::SolutionLanguage(v) => draft.solution_language = v,
            DraftField::Difficulty(v) => draft.difficulty = v,
            DraftField::Visibility(v) => draft.visibility = v,
            DraftField::TopicIds(v) => draft.topic_ids = v,
            DraftField::TimeLimit(v) => draft.time_limit = v,
            DraftField::Memory(v) => draft.memory = v,
        }
    }

    /// 追加一个空白测试用例，返回其下标
    pub fn add_test_case(draft: &mut Draft) -> usize {
        draft.test_cases.push(TestCase::blank());
        draft.test_cases.len() - 1
    }

    pub fn update_test_case(draft: &mut Draft, index: usize, field: TestCaseField) {
        let len = draft.test_cases.len();
        let Some(test_case) = draft.test_cases.get_mut(index) else {
            panic!("测试用例下标 {} 超出范围 (共 {} 个)", index, len);
        };

        match field {
            TestCaseField::Input(v) => test_case.input = v,
            TestCaseField::Output(v) => test_case.output = v,
            TestCaseField::Note(v) => test_case.note = v,
            TestCaseField::IsPublic(v) => test_case.is_public = v,
        }
    }

    /// 删除测试用例，后续下标整体前移
    pub fn delete_test_case(draft: &mut Draft, index: usize) -> TestCase {
        assert!(
            index < draft.test_cases.len(),
            "测试用例下标 {} 超出范围 (共 {} 个)",
            index,
            draft.test_cases.len()
        );
        draft.test_cases.remove(index)
    }
}
