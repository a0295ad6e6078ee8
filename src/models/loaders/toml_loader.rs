use crate::error::{AppError, FileError, Result};
use crate::models::generation::GenerationRequest;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载生成参数
///
/// 只负责读取和解析，字段校验由 `GenerationRequest::validate` 完成
pub async fn load_generation_request(toml_file_path: &Path) -> Result<GenerationRequest> {
    let display = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&display, e))?;

    let request: GenerationRequest = toml::from_str(&content).map_err(|source| {
        AppError::File(FileError::TomlParseFailed {
            path: display.clone(),
            source,
        })
    })?;

    tracing::info!(
        "成功加载生成参数: 主题 {}, 题目数量 {}",
        request.topic,
        request.number_of_exercise
    );

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    #[tokio::test]
    async fn test_load_generation_request() {
        let path = std::env::temp_dir().join("exercise_forge_request_test.toml");
        std::fs::write(
            &path,
            r#"
topic = "字符串"
levels = ["EASY", "MEDIUM"]
numberOfExercise = 2
numberOfPublicTestCases = 1
numberOfPrivateTestCases = 2
solutionLanguage = "Java"
"#,
        )
        .unwrap();

        let request = load_generation_request(&path).await.unwrap();
        assert_eq!(request.topic, "字符串");
        assert!(request.levels.contains(&Difficulty::Medium));
        assert_eq!(request.total_test_cases_per_exercise(), 3);
        assert_eq!(request.validate(), Ok(()));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_file_error() {
        let path = std::env::temp_dir().join("exercise_forge_missing_request.toml");
        let err = load_generation_request(&path).await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::ReadFailed { .. })));
    }
}
