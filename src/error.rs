use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("requested question count cannot be negative (got {0})")]
    NegativeCount(i32),
    #[error("category '{0}' is listed more than once")]
    DuplicateCategory(String),

    #[error("question id {0} appears more than once in the bank")]
    DuplicateQuestionId(u32),
    #[error("question {id} uses category '{category}' which the bank does not declare")]
    UndeclaredCategory { id: u32, category: String },
    #[error("bank declares category '{0}' more than once")]
    DuplicateDeclaredCategory(String),
    #[error("question {0} has no options")]
    NoOptions(u32),
    #[error("question {id} marks option {answer} as correct but only has {options} options")]
    AnswerOutOfRange { id: u32, answer: usize, options: usize },
    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),
    #[error("invalid exam config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl Error {
    /// True for errors caused by arguments the caller passed to the sampler.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::NegativeCount(_) | Error::DuplicateCategory(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
