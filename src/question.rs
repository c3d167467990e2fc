use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Basic,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Basic => "basic",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(Difficulty::Basic),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(Error::UnknownDifficulty(other.to_string())),
        }
    }
}

/// A single multiple-choice question as it appears in a bank file.
///
/// Only `id` and `category` matter to the sampler; the rest is carried
/// through untouched for whoever renders the exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub category: String,
    pub difficulty: Difficulty,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Question {
    pub fn validate(&self) -> Result<()> {
        if self.options.is_empty() {
            return Err(Error::NoOptions(self.id));
        }
        if self.correct_answer >= self.options.len() {
            return Err(Error::AnswerOutOfRange {
                id: self.id,
                answer: self.correct_answer,
                options: self.options.len(),
            });
        }
        Ok(())
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }

    /// Options in random order, along with where the correct one ended up.
    ///
    /// `None` when `correct_answer` does not point at an option.
    pub fn options_shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(Vec<&str>, usize)> {
        let mut order: Vec<usize> = (0..self.options.len()).collect();
        order.shuffle(rng);
        let index = order.iter().position(|&i| i == self.correct_answer)?;
        let opts = order.iter().map(|&i| self.options[i].as_str()).collect();
        Some((opts, index))
    }
}

#[cfg(test)]
pub(crate) fn question(id: u32, category: &str) -> Question {
    Question {
        id,
        category: category.to_string(),
        difficulty: Difficulty::Basic,
        question: format!("Question {id}?"),
        options: vec![
            "First".to_string(),
            "Second".to_string(),
            "Third".to_string(),
            "Fourth".to_string(),
        ],
        correct_answer: 1,
        explanation: String::from("Because."),
        section: None,
        topic: None,
    }
}
