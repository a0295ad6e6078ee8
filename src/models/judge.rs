//! 判题沙箱的数据结构
//!
//! 字段名与 Judge0 批量接口保持一致（snake_case）。

use serde::{Deserialize, Serialize};

/// 排队中
pub const STATUS_IN_QUEUE: u32 = 1;
/// 运行中
pub const STATUS_PROCESSING: u32 = 2;
/// 通过
pub const STATUS_ACCEPTED: u32 = 3;

/// 单个测试用例的判题提交
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeSubmission {
    pub language_id: u32,
    pub source_code: String,
    pub stdin: String,
    pub expected_output: String,
    pub cpu_time_limit: f64,
    pub memory_limit: u64,
}

/// 批量提交返回的 token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionToken {
    #[serde(default)]
    pub token: Option<String>,
}

/// 批量查询返回的单条结果
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_id: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_time")]
    pub time: Option<f64>,
    #[serde(default)]
    pub memory: Option<u64>,
}

impl SubmissionResult {
    /// 是否仍在排队或运行（缺少状态也视为未完成）
    pub fn is_pending(&self) -> bool {
        self.status_id.map_or(true, |id| id <= STATUS_PROCESSING)
    }
}

/// 批量查询响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchStatusResponse {
    #[serde(default)]
    pub submissions: Vec<Option<SubmissionResult>>,
}

// Judge0 的 time 字段是字符串形式的秒数，部分部署返回数字
fn deserialize_time<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct TimeVisitor;

    impl<'de> Visitor<'de> for TimeVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number of seconds, as string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.trim().parse::<f64>().ok())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(TimeVisitor)
}

/// 判题结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    InQueue,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    RuntimeError,
    InternalError,
    ExecFormatError,
    /// 未知状态或缺少状态
    Unknown,
}

impl Verdict {
    /// 从 Judge0 状态码解析
    pub fn from_status_id(status_id: Option<u32>) -> Self {
        match status_id {
            Some(1) => Verdict::InQueue,
            Some(2) => Verdict::Processing,
            Some(3) => Verdict::Accepted,
            Some(4) => Verdict::WrongAnswer,
            Some(5) => Verdict::TimeLimitExceeded,
            Some(6) => Verdict::CompilationError,
            Some(7..=12) => Verdict::RuntimeError,
            Some(13) => Verdict::InternalError,
            Some(14) => Verdict::ExecFormatError,
            _ => Verdict::Unknown,
        }
    }

    /// 显示名称
    pub fn name(self) -> &'static str {
        match self {
            Verdict::InQueue => "排队中",
            Verdict::Processing => "运行中",
            Verdict::Accepted => "通过",
            Verdict::WrongAnswer => "答案错误",
            Verdict::TimeLimitExceeded => "超时",
            Verdict::CompilationError => "编译错误",
            Verdict::RuntimeError => "运行错误",
            Verdict::InternalError => "内部错误",
            Verdict::ExecFormatError => "格式错误",
            Verdict::Unknown => "未知",
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Verdict::InQueue | Verdict::Processing | Verdict::Unknown)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 通过判定：状态为 Accepted，且去掉首尾空白后输出与期望完全一致
pub fn is_passed(status_id: Option<u32>, actual_output: &str, expected: &str) -> bool {
    status_id == Some(STATUS_ACCEPTED) && actual_output.trim() == expected.trim()
}

/// 单个测试用例的运行结果
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// 测试用例下标
    pub index: usize,
    pub input: String,
    pub expected: String,
    pub actual_output: String,
    pub stderr: String,
    pub status_id: Option<u32>,
    /// 耗时（秒）
    pub elapsed_time: Option<f64>,
}

impl RunResult {
    pub fn is_passed(&self) -> bool {
        is_passed(self.status_id, &self.actual_output, &self.expected)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_status_id(self.status_id)
    }
}

/// 一次运行的汇总
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    pub results: Vec<RunResult>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.is_passed()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn all_passed(&self) -> bool {
        !self.results.is_empty() && self.passed() == self.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_passed_requires_accepted_and_trimmed_match() {
        assert!(is_passed(Some(STATUS_ACCEPTED), "3\n", "3"));
        assert!(is_passed(Some(STATUS_ACCEPTED), "  1 2\n", "1 2  "));
        // 内部空白不做归一化
        assert!(!is_passed(Some(STATUS_ACCEPTED), "1  2", "1 2"));
        assert!(!is_passed(Some(STATUS_ACCEPTED), "4", "3"));
        assert!(!is_passed(Some(4), "3", "3"));
        assert!(!is_passed(Some(STATUS_PROCESSING), "3", "3"));
        assert!(!is_passed(None, "3", "3"));
    }

    #[test]
    fn test_submission_result_time_formats() {
        let results: BatchStatusResponse = serde_json::from_str(
            r#"{"submissions": [
                {"token": "a", "status_id": 3, "stdout": "3\n", "time": "0.012"},
                {"token": "b", "status_id": 2, "time": null},
                {"token": "c", "status_id": 5, "time": 1.5},
                null
            ]}"#,
        )
        .unwrap();

        let subs = &results.submissions;
        assert_eq!(subs[0].as_ref().unwrap().time, Some(0.012));
        assert_eq!(subs[1].as_ref().unwrap().time, None);
        assert_eq!(subs[2].as_ref().unwrap().time, Some(1.5));
        assert!(subs[3].is_none());
        assert!(subs[1].as_ref().unwrap().is_pending());
        assert!(!subs[2].as_ref().unwrap().is_pending());
    }

    #[test]
    fn test_verdict_mapping() {
        assert_eq!(Verdict::from_status_id(Some(3)), Verdict::Accepted);
        assert_eq!(Verdict::from_status_id(Some(11)), Verdict::RuntimeError);
        assert_eq!(Verdict::from_status_id(None), Verdict::Unknown);
        assert!(Verdict::from_status_id(Some(1)).is_pending());
    }

    #[test]
    fn test_report_counts() {
        let make = |status: u32, out: &str| RunResult {
            index: 0,
            input: String::new(),
            expected: "ok".to_string(),
            actual_output: out.to_string(),
            stderr: String::new(),
            status_id: Some(status),
            elapsed_time: None,
        };
        let report = RunReport {
            results: vec![make(3, "ok"), make(3, "no"), make(6, "")],
        };
        assert_eq!(report.passed(), 1);
        assert_eq!(report.total(), 3);
        assert!(!report.all_passed());
    }
}
