//! 提示服务 - 业务能力层
//!
//! 相当于界面上的 toast：发出即忘，不等待、不保证送达

use std::fs::OpenOptions;
use std::io::Write;
use tracing::{error, info, warn};

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// 删除草稿后可撤销的凭据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UndoHandle(pub u64);

/// 一条提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// 带撤销按钮的提示
    pub undo: Option<UndoHandle>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn undoable(message: impl Into<String>, handle: UndoHandle) -> Self {
        Self {
            undo: Some(handle),
            ..Self::new(NoticeLevel::Info, message)
        }
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            undo: None,
        }
    }
}

/// 提示出口
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// 写日志的提示出口，可选追加到文本文件
pub struct LogNotifier {
    log_file_path: Option<String>,
}

impl LogNotifier {
    /// 只输出到 tracing
    pub fn new() -> Self {
        Self {
            log_file_path: None,
        }
    }

    /// 同时追加到指定文件
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            log_file_path: Some(path.into()),
        }
    }

    fn append(&self, notice: &Notice) {
        let Some(path) = &self.log_file_path else {
            return;
        };

        let line = format!(
            "[{}] {:?} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            notice.level,
            notice.message
        );

        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = written {
            warn!("写入提示日志失败 ({}): {}", path, e);
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!("✅ {}", notice.message),
            NoticeLevel::Info => info!("💡 {}", notice.message),
            NoticeLevel::Warning => warn!("⚠️ {}", notice.message),
            NoticeLevel::Error => error!("❌ {}", notice.message),
        }
        self.append(&notice);
    }
}
