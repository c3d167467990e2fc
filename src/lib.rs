//! Balanced mock exam drawing for categorized multiple-choice question banks.

pub mod bank;
pub mod db;
pub mod error;
pub mod exam;
pub mod question;
pub mod sampler;

pub use bank::QuestionBank;
pub use error::{Error, Result};
pub use exam::{MockExam, MockExamConfig};
pub use question::{Difficulty, Question};
pub use sampler::{allocate, sample_balanced, sample_balanced_default};
