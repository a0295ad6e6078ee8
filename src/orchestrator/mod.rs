//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (一次命令行运行)
//!     ↓
//! workflow::GenerationFlow (生成 → 运行 → 提交)
//!     ↓
//! services (能力层：编辑 / 判题 / 提示)
//!     ↓
//! clients (外部服务：题库后端 / 判题沙箱)
//! ```
//!
//! 只有编排层创建真实的 HTTP 客户端，下层都通过 trait 使用它们。

pub mod app;

pub use app::{App, RunSummary};
