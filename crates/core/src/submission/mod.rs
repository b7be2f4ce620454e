//! Submission boundary used by the UI to save an edit.

mod submission_model;
mod submission_service;
mod validation;

pub use submission_model::*;
pub use submission_service::SubmissionService;
pub use validation::validate_submission;
