use thiserror::Error;

/// 用户可见的兜底错误提示
pub const FALLBACK_MESSAGE: &str = "操作失败，请稍后重试";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 本地校验错误（不会产生网络请求）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 判题服务错误
    #[error("判题错误: {0}")]
    Judge(#[from] JudgeError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 本地校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("主题不能为空")]
    EmptyTopic,
    #[error("至少需要选择一个难度")]
    NoLevels,
    #[error("题目数量 {count} 超出范围 [1, 10]")]
    ExerciseCountOutOfRange { count: u32 },
    #[error("公开测试用例数量至少为 1")]
    NotEnoughPublicTestCases,
    #[error("私有测试用例数量至少为 1")]
    NotEnoughPrivateTestCases,
    #[error("参考答案为空，无法运行")]
    MissingSolution,
    #[error("没有测试用例，无法运行")]
    NoTestCases,
    #[error("不支持的语言: {language}")]
    UnsupportedLanguage { language: String },
    #[error("已有运行正在进行中")]
    RunInProgress,
    #[error("没有选中的草稿")]
    NoActiveDraft,
    #[error("没有可提交的草稿")]
    NoDrafts,
    #[error("当前步骤不允许该操作: {action}")]
    WrongStep { action: &'static str },
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// API 返回空结果
    #[error("API返回空结果: {endpoint}")]
    EmptyResponse { endpoint: String },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 判题服务错误，每一种都是整次运行的终止失败
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("提交判题失败: {0}")]
    SubmitFailed(#[source] ApiError),
    #[error("轮询判题结果失败: {0}")]
    PollFailed(#[source] ApiError),
    #[error("判题服务没有返回任何 token")]
    NoTokens,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 面向用户的提示文本
    ///
    /// 服务端返回了 message 时优先使用，否则本地校验错误用自身描述，
    /// 其余错误统一使用兜底文案。
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Api(e) => e.server_message().unwrap_or(FALLBACK_MESSAGE).to_string(),
            AppError::Judge(JudgeError::SubmitFailed(e) | JudgeError::PollFailed(e)) => {
                e.server_message().unwrap_or(FALLBACK_MESSAGE).to_string()
            }
            AppError::Judge(JudgeError::NoTokens) => JudgeError::NoTokens.to_string(),
            AppError::Config(_) | AppError::File(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl ApiError {
    /// 服务端提供的可读错误信息
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::BadResponse {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => Some(msg.as_str()),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, AppError>;
