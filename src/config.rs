use crate::error::{AppError, ConfigError, FileError, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 题库后端 API 配置 ---
    pub exercise_api_base_url: String,
    pub exercise_api_token: Option<String>,
    // --- 判题沙箱配置 ---
    pub judge_api_base_url: String,
    pub judge_api_key: Option<String>,
    /// 轮询间隔（毫秒）
    pub judge_poll_interval_ms: u64,
    /// 最大轮询次数，用尽后以最后一次结果为准
    pub judge_max_poll_attempts: u32,
    /// 草稿未设置内存限制时使用的默认值
    pub default_memory_limit: u64,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 生成参数 TOML 文件
    pub request_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行完成后是否自动提交全部草稿
    pub auto_commit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exercise_api_base_url: "http://localhost:8080/api".to_string(),
            exercise_api_token: None,
            judge_api_base_url: "http://localhost:2358".to_string(),
            judge_api_key: None,
            judge_poll_interval_ms: 800,
            judge_max_poll_attempts: 10,
            default_memory_limit: 128_000,
            request_timeout_secs: 30,
            request_file: "generation_request.toml".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            auto_commit: false,
        }
    }
}

impl Config {
    /// 加载配置：先读 `CONFIG_PATH` 指向的 TOML（可选），再用环境变量覆盖
    pub fn load() -> Result<Self> {
        let base = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 只使用默认值 + 环境变量
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取，缺失的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(&display, e))?;
        toml::from_str(&content).map_err(|source| {
            AppError::File(FileError::TomlParseFailed {
                path: display,
                source,
            })
        })
    }

    fn with_env_overrides(self) -> Result<Self> {
        Ok(Self {
            exercise_api_base_url: env_string("EXERCISE_API_BASE_URL")
                .unwrap_or(self.exercise_api_base_url),
            exercise_api_token: env_string("EXERCISE_API_TOKEN").or(self.exercise_api_token),
            judge_api_base_url: env_string("JUDGE_API_BASE_URL").unwrap_or(self.judge_api_base_url),
            judge_api_key: env_string("JUDGE_API_KEY").or(self.judge_api_key),
            judge_poll_interval_ms: env_parse("JUDGE_POLL_INTERVAL_MS", "u64")?
                .unwrap_or(self.judge_poll_interval_ms),
            judge_max_poll_attempts: env_parse("JUDGE_MAX_POLL_ATTEMPTS", "u32")?
                .unwrap_or(self.judge_max_poll_attempts),
            default_memory_limit: env_parse("DEFAULT_MEMORY_LIMIT", "u64")?
                .unwrap_or(self.default_memory_limit),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            request_file: env_string("REQUEST_FILE").unwrap_or(self.request_file),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            auto_commit: env_parse("AUTO_COMMIT", "bool")?.unwrap_or(self.auto_commit),
        })
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
        }),
    }
}
