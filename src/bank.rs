use crate::error::{Error, Result};
use crate::question::{Difficulty, Question};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

/// A read-only collection of questions together with the closed set of
/// categories they may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    categories: Vec<String>,
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct BankJson {
    categories: Vec<String>,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(categories: Vec<String>, questions: Vec<Question>) -> Result<QuestionBank> {
        let mut declared = HashSet::with_capacity(categories.len());
        for name in &categories {
            if !declared.insert(name.as_str()) {
                return Err(Error::DuplicateDeclaredCategory(name.clone()));
            }
        }

        let mut ids = HashSet::with_capacity(questions.len());
        for q in &questions {
            if !ids.insert(q.id) {
                return Err(Error::DuplicateQuestionId(q.id));
            }
            if !declared.contains(q.category.as_str()) {
                return Err(Error::UndeclaredCategory {
                    id: q.id,
                    category: q.category.clone(),
                });
            }
            q.validate()?;
        }

        debug!(
            "[Bank] Validated {} questions in {} categories.",
            questions.len(),
            categories.len()
        );
        Ok(QuestionBank {
            categories,
            questions,
        })
    }

    pub fn from_json_str(json: &str) -> Result<QuestionBank> {
        let raw: BankJson = serde_json::from_str(json)?;
        Self::new(raw.categories, raw.questions)
    }

    pub fn from_json_file(path: &Path) -> Result<QuestionBank> {
        let now = Instant::now();
        let json = std::fs::read_to_string(path)?;
        let bank = Self::from_json_str(&json)?;
        info!(
            "[Bank] Loaded {:?} ({} questions) in {} ms.",
            path,
            bank.len(),
            now.elapsed().as_millis()
        );
        Ok(bank)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn declares(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions in `category`, in bank order.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions.iter().filter(move |q| q.category == category)
    }

    pub fn count_in(&self, category: &str) -> usize {
        self.in_category(category).count()
    }

    pub fn difficulty_breakdown(&self, category: &str) -> [(Difficulty, usize); 3] {
        Difficulty::ALL.map(|d| {
            (
                d,
                self.in_category(category)
                    .filter(|q| q.difficulty == d)
                    .count(),
            )
        })
    }
}
