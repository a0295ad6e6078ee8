//! 草稿数据模型
//!
//! `Draft` 是生成接口返回、尚未持久化的题目候选。编辑阶段不做任何校验，
//! 提交时由后端负责校验。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 难度
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// 可见性，提交时缺省为 `Draft`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    #[default]
    Draft,
    Private,
    Public,
}

/// 测试用例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    /// 期望输出
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

impl TestCase {
    /// 新增的空白用例：输入输出为空，默认公开
    pub fn blank() -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            note: String::new(),
            is_public: true,
        }
    }
}

impl Default for TestCase {
    fn default() -> Self {
        Self::blank()
    }
}

/// 生成的题目草稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// 题目编号，提交前不保证唯一
    pub code: String,
    pub title: String,
    pub description: String,
    pub prompt: Option<String>,
    pub solution: Option<String>,
    pub solution_language: Option<String>,
    pub difficulty: Difficulty,
    pub visibility: Option<Visibility>,
    pub topic_ids: BTreeSet<String>,
    /// 时间限制（秒）
    pub time_limit: f64,
    /// 内存限制，0 表示未设置
    pub memory: u64,
    pub test_cases: Vec<TestCase>,
    /// 是否处于编辑模式（纯界面状态，不参与序列化）
    #[serde(skip)]
    pub editing: bool,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            code: String::new(),
            title: String::new(),
            description: String::new(),
            prompt: None,
            solution: None,
            solution_language: None,
            difficulty: Difficulty::default(),
            visibility: None,
            topic_ids: BTreeSet::new(),
            time_limit: 1.0,
            memory: 0,
            test_cases: Vec::new(),
            editing: false,
        }
    }
}

impl Draft {
    /// 构建持久化接口的请求体
    ///
    /// 主题集合展开为数组，可见性缺省为 `Draft`，最大提交次数固定为 0（不限）。
    pub fn to_payload(&self) -> ExercisePayload {
        ExercisePayload {
            code: self.code.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            prompt: self.prompt.clone(),
            solution: self.solution.clone(),
            solution_language: self.solution_language.clone(),
            difficulty: self.difficulty,
            visibility: self.visibility.unwrap_or_default(),
            topic_ids: self.topic_ids.iter().cloned().collect(),
            time_limit: self.time_limit,
            memory: self.memory,
            max_submissions: 0,
            test_cases: self.test_cases.clone(),
        }
    }
}

/// 持久化接口请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePayload {
    pub code: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_language: Option<String>,
    pub difficulty: Difficulty,
    pub visibility: Visibility,
    pub topic_ids: Vec<String>,
    pub time_limit: f64,
    pub memory: u64,
    pub max_submissions: u32,
    pub test_cases: Vec<TestCase>,
}

/// 生成接口返回的测试用例，可能带有服务端分配的 id
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedTestCase {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(flatten)]
    pub case: TestCase,
}

/// 生成接口返回的题目
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedExercise {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub solution_language: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub topic_ids: BTreeSet<String>,
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub test_cases: Vec<GeneratedTestCase>,
}

fn default_time_limit() -> f64 {
    1.0
}

impl GeneratedExercise {
    /// 转换为本地草稿，丢弃测试用例上的服务端 id
    ///
    /// 返回草稿和被丢弃的 id 数量
    pub fn into_draft(self) -> (Draft, usize) {
        let stripped = self.test_cases.iter().filter(|tc| tc.id.is_some()).count();
        let draft = Draft {
            code: self.code,
            title: self.title,
            description: self.description,
            prompt: self.prompt,
            solution: self.solution,
            solution_language: self.solution_language,
            difficulty: self.difficulty,
            visibility: self.visibility,
            topic_ids: self.topic_ids,
            time_limit: self.time_limit,
            memory: self.memory,
            test_cases: self.test_cases.into_iter().map(|tc| tc.case).collect(),
            editing: false,
        };
        (draft, stripped)
    }
}
