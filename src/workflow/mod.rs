//! 流程层（Workflow）
//!
//! - `WorkflowCtx` - 全部可变状态（步骤、草稿、选中、运行状态、撤销槽）
//! - `GenerationFlow` - 流程编排（生成 → 预览/编辑/运行 → 提交）

pub mod generation_flow;
pub mod workflow_ctx;

pub use generation_flow::{CommitAllError, GenerateOutcome, GenerationFlow};
pub use workflow_ctx::{RunState, RunTicket, Step, WorkflowCtx};
