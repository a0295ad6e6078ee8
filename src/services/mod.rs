pub mod draft_editor;
pub mod judge_runner;
pub mod language;
pub mod notifier;

pub use draft_editor::{DraftEditor, DraftField, TestCaseField};
pub use judge_runner::{JudgeRunner, PollPolicy, Sleeper, TokioSleeper};
pub use language::language_id;
pub use notifier::{LogNotifier, Notice, NoticeLevel, Notifier, UndoHandle};
