use crate::config::Config;
use crate::error::{AppError, FileError, Result};
use crate::models::{RunReport, Verdict};
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::{info, warn};

/// 初始化日志文件，写入带时间的标题
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题目生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| {
        AppError::File(FileError::WriteFailed {
            path: log_file_path.to_string(),
            source: e,
        })
    })
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题目生成模式");
    info!("🌐 题库服务: {}", config.exercise_api_base_url);
    info!("⚖️ 判题服务: {}", config.judge_api_base_url);
    info!(
        "⏱️ 轮询间隔 {}ms，最多 {} 次",
        config.judge_poll_interval_ms, config.judge_max_poll_attempts
    );
    info!("{}", "=".repeat(60));
}

/// 记录一次运行的结果
///
/// # 参数
/// - `draft_no`: 草稿编号（从 1 开始）
/// - `report`: 运行结果
/// - `verbose`: 是否逐条输出测试用例
pub fn log_run_report(draft_no: usize, report: &RunReport, verbose: bool) {
    info!(
        "[草稿 {}] 📊 通过 {}/{}",
        draft_no,
        report.passed(),
        report.total()
    );
    if !verbose {
        return;
    }

    for result in &report.results {
        let verdict = result.verdict();
        if result.is_passed() {
            info!("  ✓ #{} {}", result.index + 1, verdict);
            continue;
        }
        warn!(
            "  ✗ #{} {} | 期望: {} | 实际: {}",
            result.index + 1,
            verdict,
            truncate_text(result.expected.trim(), 40),
            truncate_text(result.actual_output.trim(), 40)
        );
        if !result.stderr.is_empty() && verdict != Verdict::Accepted {
            warn!("    {}", truncate_text(result.stderr.trim(), 120));
        }
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `committed`: 已提交数量
/// - `total`: 生成总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(committed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已提交: {}/{}", committed, total);
    info!("📝 未提交: {}", total - committed.min(total));
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("两数之和", 10), "两数之和");
        assert_eq!(truncate_text("两数之和", 2), "两数...");
        assert_eq!(truncate_text("", 2), "");
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let path = std::env::temp_dir().join("exercise_forge_log_header_test.txt");
        let path_str = path.to_string_lossy().to_string();

        init_log_file(&path_str).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("题目生成日志"));
        fs::remove_file(&path).ok();
    }
}
