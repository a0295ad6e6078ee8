//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 把一次命令行运行串成完整的生成流程：
//!
//! 1. **应用初始化**：写日志文件标题、创建题库和判题客户端
//! 2. **加载参数**：读取生成参数 TOML 和主题目录
//! 3. **生成草稿**：调用生成接口，进入预览
//! 4. **逐个运行**：依次选中每个草稿并运行判题
//! 5. **提交**：开启 `auto_commit` 时提交全部草稿
//!
//! 编排层不做业务判断，只调度 `GenerationFlow` 并输出统计。

use crate::clients::{ExerciseClient, JudgeClient};
use crate::config::Config;
use crate::models::load_generation_request;
use crate::services::{JudgeRunner, LogNotifier};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::{GenerateOutcome, GenerationFlow};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

/// 一次运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub generated: usize,
    pub all_passed: usize,
    pub committed: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    flow: GenerationFlow<ExerciseClient, JudgeClient>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let exercise_client = ExerciseClient::new(&config)?;
        let judge = JudgeRunner::new(JudgeClient::new(&config)?, &config);
        let notifier = LogNotifier::with_path(config.output_log_file.clone());

        let flow = GenerationFlow::new(exercise_client, judge, Box::new(notifier))
            .with_verbose_logging(config.verbose_logging);

        Ok(Self { config, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<RunSummary> {
        let request_path = Path::new(&self.config.request_file);
        info!("\n📁 正在读取生成参数: {}", request_path.display());
        let request = load_generation_request(request_path)
            .await
            .with_context(|| format!("无法读取生成参数: {}", request_path.display()))?;

        // 主题目录只用于展示，失败不影响生成
        if let Err(e) = self.flow.load_topics().await {
            warn!("⚠️ 主题目录加载失败，继续生成: {}", e);
        }

        let mut summary = RunSummary::default();

        match self.flow.generate(&request).await? {
            GenerateOutcome::Empty => {
                warn!("⚠️ 没有生成任何题目，程序结束");
                return Ok(summary);
            }
            GenerateOutcome::Generated(count) => summary.generated = count,
        }

        for index in 0..summary.generated {
            self.flow.select_active(index);
            match self.flow.run_active().await {
                Ok(report) if report.all_passed() => summary.all_passed += 1,
                Ok(_) => {}
                Err(e) => error!("[草稿 {}] ❌ 运行失败: {}", index + 1, e),
            }
        }

        if self.config.auto_commit {
            summary.committed = match self.flow.commit_all().await {
                Ok(committed) => committed,
                Err(e) => {
                    error!("❌ {}", e);
                    e.committed()
                }
            };
        } else {
            info!(
                "💡 未开启 auto_commit，{} 道草稿未提交",
                self.flow.ctx().drafts().len()
            );
        }

        print_final_stats(
            summary.committed,
            summary.generated,
            &self.config.output_log_file,
        );
        info!("✓ 全部通过的草稿: {}/{}", summary.all_passed, summary.generated);

        Ok(summary)
    }
}
