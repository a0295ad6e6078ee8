//! 日志初始化
//!
//! - `RUST_LOG` 控制过滤级别，默认 `info`
//! - `LOG_FORMAT=compact` 使用紧凑格式，否则使用默认格式

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,exercise_forge=info,reqwest=warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // 重复初始化（例如测试中）直接忽略
    let _ = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("compact") => builder.compact().try_init(),
        _ => builder.try_init(),
    };
}
