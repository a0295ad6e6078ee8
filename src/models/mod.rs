pub mod draft;
pub mod generation;
pub mod judge;
pub mod loaders;
pub mod topic;

pub use draft::{Difficulty, Draft, ExercisePayload, GeneratedExercise, TestCase, Visibility};
pub use generation::{GenerationRequest, GenerationResponse};
pub use judge::{
    is_passed, BatchStatusResponse, JudgeSubmission, RunReport, RunResult, SubmissionResult,
    SubmissionToken, Verdict,
};
pub use loaders::load_generation_request;
pub use topic::Topic;
