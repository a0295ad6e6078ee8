use crate::error::ValidationError;
use crate::models::draft::{Difficulty, GeneratedExercise, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 单次生成允许的题目数量上限
pub const MAX_EXERCISES_PER_REQUEST: u32 = 10;

/// 生成参数，只在提交时使用一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub topic: String,
    pub levels: BTreeSet<Difficulty>,
    pub number_of_exercise: u32,
    pub number_of_public_test_cases: u32,
    pub number_of_private_test_cases: u32,
    pub solution_language: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl GenerationRequest {
    /// 校验请求字段，任何一项不合法都不会发出网络请求
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        if self.levels.is_empty() {
            return Err(ValidationError::NoLevels);
        }
        if !(1..=MAX_EXERCISES_PER_REQUEST).contains(&self.number_of_exercise) {
            return Err(ValidationError::ExerciseCountOutOfRange {
                count: self.number_of_exercise,
            });
        }
        if self.number_of_public_test_cases < 1 {
            return Err(ValidationError::NotEnoughPublicTestCases);
        }
        if self.number_of_private_test_cases < 1 {
            return Err(ValidationError::NotEnoughPrivateTestCases);
        }
        Ok(())
    }

    /// 每道题的测试用例总数（仅用于展示，不校验返回结果）
    pub fn total_test_cases_per_exercise(&self) -> u32 {
        self.number_of_public_test_cases + self.number_of_private_test_cases
    }
}

/// 生成接口响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub exercises: Vec<GeneratedExercise>,
}
