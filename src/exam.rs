use crate::bank::QuestionBank;
use crate::error::{Error, Result};
use crate::question::Question;
use crate::sampler::sample_balanced;
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_QUESTION_COUNT: u32 = 20;

fn default_question_count() -> u32 {
    DEFAULT_QUESTION_COUNT
}

/// How a mock exam is put together from a bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockExamConfig {
    pub exam_id: String,
    pub exam_title: String,
    #[serde(default = "default_question_count")]
    pub total_questions: u32,
    /// Seconds.
    pub time_limit: u32,
    /// Percentage of correct answers needed to pass.
    pub pass_threshold: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_path: Option<String>,
    pub categories: Vec<String>,
}

impl MockExamConfig {
    pub fn from_json_str(json: &str) -> Result<MockExamConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<MockExamConfig> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self, bank: &QuestionBank) -> Result<()> {
        if self.total_questions == 0 {
            return Err(Error::InvalidConfig(format!(
                "{}: totalQuestions must be at least 1",
                self.exam_id
            )));
        }
        if self.pass_threshold > 100 {
            return Err(Error::InvalidConfig(format!(
                "{}: passThreshold {} is over 100",
                self.exam_id, self.pass_threshold
            )));
        }
        if self.categories.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "{}: no categories",
                self.exam_id
            )));
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.as_str()) {
                return Err(Error::DuplicateCategory(category.clone()));
            }
            if !bank.declares(category) {
                return Err(Error::InvalidConfig(format!(
                    "{}: category '{}' is not in the bank",
                    self.exam_id, category
                )));
            }
        }
        Ok(())
    }
}

/// A drawn exam, ready to be handed to whatever presents it.
#[derive(Debug, Clone)]
pub struct MockExam {
    pub config: MockExamConfig,
    pub requested: u32,
    pub questions: Vec<Question>,
}

impl MockExam {
    pub fn draw<R: Rng + ?Sized>(
        bank: &QuestionBank,
        config: &MockExamConfig,
        count_override: Option<u32>,
        rng: &mut R,
    ) -> Result<MockExam> {
        config.validate(bank)?;
        let requested = count_override.unwrap_or(config.total_questions);
        let count = i32::try_from(requested).map_err(|_| {
            Error::InvalidConfig(format!("{} questions is too many", requested))
        })?;

        let questions = sample_balanced(bank, count, &config.categories, rng)?;
        debug!(
            "[Setup] Drew {} questions for '{}'.",
            questions.len(),
            config.exam_id
        );
        if questions.len() < requested as usize {
            warn!(
                "[Setup] '{}' asked for {} questions but the bank only has {}.",
                config.exam_id,
                requested,
                questions.len()
            );
        }

        Ok(MockExam {
            config: config.clone(),
            requested,
            questions,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_short(&self) -> bool {
        self.questions.len() < self.requested as usize
    }

    /// Correct answers needed to pass, rounded up.
    pub fn pass_mark(&self) -> usize {
        (self.questions.len() * self.config.pass_threshold as usize).div_ceil(100)
    }

    pub fn category_counts(&self) -> Vec<(&str, usize)> {
        self.config
            .categories
            .iter()
            .map(|c| {
                (
                    c.as_str(),
                    self.questions.iter().filter(|q| &q.category == c).count(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::question;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const IPAF_CONFIG: &str = r#"{
        "examId": "ipaf-scaffold",
        "examTitle": "IPAF Mobile Scaffold Mock Examination",
        "totalQuestions": 20,
        "timeLimit": 1800,
        "passThreshold": 80,
        "exitPath": "/study-centre/general-upskilling/ipaf-module-6",
        "categories": ["Legislation", "Tower Types", "Assembly", "Inspection", "Hazards"]
    }"#;

    fn ipaf_bank(per_category: &[u32]) -> QuestionBank {
        let names = ["Legislation", "Tower Types", "Assembly", "Inspection", "Hazards"];
        let mut questions = Vec::new();
        let mut id = 1;
        for (name, n) in names.iter().zip(per_category) {
            for _ in 0..*n {
                questions.push(question(id, name));
                id += 1;
            }
        }
        QuestionBank::new(names.iter().map(|s| s.to_string()).collect(), questions).unwrap()
    }

    #[test]
    fn parses_config() {
        let config = MockExamConfig::from_json_str(IPAF_CONFIG).unwrap();
        assert_eq!(config.total_questions, 20);
        assert_eq!(config.time_limit, 1800);
        assert_eq!(config.categories.len(), 5);
        assert_eq!(config.categories[1], "Tower Types");
    }

    #[test]
    fn missing_total_defaults_to_twenty() {
        let config = MockExamConfig::from_json_str(
            r#"{"examId":"x","examTitle":"X","timeLimit":60,"passThreshold":70,"categories":["A"]}"#,
        )
        .unwrap();
        assert_eq!(config.total_questions, DEFAULT_QUESTION_COUNT);
        assert!(config.exit_path.is_none());
    }

    #[test]
    fn draws_balanced_exam() {
        let bank = ipaf_bank(&[40, 40, 40, 40, 40]);
        let config = MockExamConfig::from_json_str(IPAF_CONFIG).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let exam = MockExam::draw(&bank, &config, None, &mut rng).unwrap();
        assert_eq!(exam.len(), 20);
        assert!(!exam.is_short());
        assert!(exam.category_counts().iter().all(|(_, n)| *n == 4));
        assert_eq!(exam.pass_mark(), 16);
    }

    #[test]
    fn short_exam_is_accepted() {
        let bank = ipaf_bank(&[2, 0, 1, 0, 3]);
        let config = MockExamConfig::from_json_str(IPAF_CONFIG).unwrap();
        let mut rng = StdRng::seed_from_u64(10);
        let exam = MockExam::draw(&bank, &config, None, &mut rng).unwrap();
        assert_eq!(exam.len(), 6);
        assert!(exam.is_short());
        // 80% of 6 is 4.8
        assert_eq!(exam.pass_mark(), 5);
    }

    #[test]
    fn override_changes_count() {
        let bank = ipaf_bank(&[40, 40, 40, 40, 40]);
        let config = MockExamConfig::from_json_str(IPAF_CONFIG).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        let exam = MockExam::draw(&bank, &config, Some(7), &mut rng).unwrap();
        assert_eq!(exam.len(), 7);
        let counts: Vec<usize> = exam.category_counts().into_iter().map(|(_, n)| n).collect();
        assert_eq!(counts, vec![2, 2, 1, 1, 1]);
    }

    #[test]
    fn rejects_bad_configs() {
        let bank = ipaf_bank(&[1, 1, 1, 1, 1]);
        let good = MockExamConfig::from_json_str(IPAF_CONFIG).unwrap();

        let mut config = good.clone();
        config.total_questions = 0;
        assert!(matches!(config.validate(&bank), Err(Error::InvalidConfig(_))));

        let mut config = good.clone();
        config.pass_threshold = 101;
        assert!(matches!(config.validate(&bank), Err(Error::InvalidConfig(_))));

        let mut config = good.clone();
        config.categories.push("Rescue".to_string());
        assert!(matches!(config.validate(&bank), Err(Error::InvalidConfig(_))));

        let mut config = good.clone();
        config.categories.push("Hazards".to_string());
        assert!(matches!(
            config.validate(&bank),
            Err(Error::DuplicateCategory(_))
        ));

        let mut config = good;
        config.categories.clear();
        assert!(matches!(config.validate(&bank), Err(Error::InvalidConfig(_))));
    }
}
