//! # Exercise Forge
//!
//! 一个用于生成、校验并提交编程练习题的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 外部服务的 HTTP 客户端，只暴露能力
//! - `ExerciseApi` / `ExerciseClient` - 题库后端（生成、创建、主题目录）
//! - `JudgeApi` / `JudgeClient` - Judge0 批量判题
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个草稿
//! - `DraftEditor` - 草稿字段和测试用例编辑
//! - `JudgeRunner` - 批量提交、轮询、判定
//! - `Notifier` - 提示输出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次生成"的完整流程
//! - `WorkflowCtx` - 步骤、草稿列表、运行状态、撤销槽
//! - `GenerationFlow` - 流程编排（generate → run → commit）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 命令行入口，管理客户端和整体统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod testing;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ExerciseApi, ExerciseClient, JudgeApi, JudgeClient};
pub use config::Config;
pub use error::{AppError, Result};
pub use models::{Draft, GenerationRequest, RunReport, TestCase};
pub use orchestrator::{App, RunSummary};
pub use services::{DraftEditor, JudgeRunner, Notice, Notifier};
pub use workflow::{GenerateOutcome, GenerationFlow, RunState, Step, WorkflowCtx};
