//! crates/quiz_core/src/quiz.rs
//!
//! The questionnaire answers and the threshold function that turns an average
//! score into one of the four DISC-style classifications.

use std::fmt;

use crate::domain::ValidationError;

pub const QUESTION_COUNT: usize = 20;
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classification {
    Dominance,
    Influence,
    Steadiness,
    Conscientiousness,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Self::Dominance,
        Self::Influence,
        Self::Steadiness,
        Self::Conscientiousness,
    ];

    /// Short type name, e.g. `D형`.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Dominance => "D형",
            Self::Influence => "I형",
            Self::Steadiness => "S형",
            Self::Conscientiousness => "C형",
        }
    }

    /// The label stored with a result, e.g. `D형 (지배형)`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dominance => "D형 (지배형)",
            Self::Influence => "I형 (사교형)",
            Self::Steadiness => "S형 (안정형)",
            Self::Conscientiousness => "C형 (신중형)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Dominance => "당신은 도전적이고 리더십이 강한 D형입니다!",
            Self::Influence => "당신은 활발하고 사람을 좋아하는 I형입니다!",
            Self::Steadiness => "당신은 따뜻하고 성실한 S형입니다!",
            Self::Conscientiousness => "당신은 분석적이고 꼼꼼한 C형입니다!",
        }
    }

    /// The `type=` value for the ranking endpoint.
    pub fn code(self) -> &'static str {
        match self {
            Self::Dominance => "D",
            Self::Influence => "I",
            Self::Steadiness => "S",
            Self::Conscientiousness => "C",
        }
    }

    /// Parses any label whose first letter names the type (`D`, `D형`, `D형 (지배형)`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().chars().next()?.to_ascii_uppercase() {
            'D' => Some(Self::Dominance),
            'I' => Some(Self::Influence),
            'S' => Some(Self::Steadiness),
            'C' => Some(Self::Conscientiousness),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps an average answer score to a classification.
///
/// `avg >= 4` is D, `[3, 4)` is I, `[2, 3)` is S, anything lower is C.
pub fn classify(average: f64) -> Classification {
    if average >= 4.0 {
        Classification::Dominance
    } else if average >= 3.0 {
        Classification::Influence
    } else if average >= 2.0 {
        Classification::Steadiness
    } else {
        Classification::Conscientiousness
    }
}

/// Answers for an in-progress quiz, one optional score per question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizAnswers {
    scores: [Option<u8>; QUESTION_COUNT],
}

impl QuizAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question: usize, score: u8) -> Result<(), ValidationError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(ValidationError::ScoreOutOfRange(score));
        }
        let slot = self
            .scores
            .get_mut(question)
            .ok_or(ValidationError::QuestionOutOfRange(question))?;
        *slot = Some(score);
        Ok(())
    }

    pub fn get(&self, question: usize) -> Option<u8> {
        self.scores.get(question).copied().flatten()
    }

    pub fn answered(&self) -> usize {
        self.scores.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.answered() == QUESTION_COUNT
    }

    /// Sum of recorded scores over the full question count.
    pub fn average(&self) -> f64 {
        let total: u32 = self.scores.iter().flatten().map(|&s| u32::from(s)).sum();
        f64::from(total) / QUESTION_COUNT as f64
    }

    /// Classifies a finished quiz. Incomplete answers are rejected.
    pub fn classify(&self) -> Result<Classification, ValidationError> {
        if !self.is_complete() {
            return Err(ValidationError::Incomplete {
                answered: self.answered(),
                total: QUESTION_COUNT,
            });
        }
        Ok(classify(self.average()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_at_exact_boundaries() {
        assert_eq!(classify(4.0), Classification::Dominance);
        assert_eq!(classify(3.0), Classification::Influence);
        assert_eq!(classify(2.0), Classification::Steadiness);
    }

    #[test]
    fn thresholds_just_below_boundaries() {
        assert_eq!(classify(3.999), Classification::Influence);
        assert_eq!(classify(2.999), Classification::Steadiness);
        assert_eq!(classify(1.999), Classification::Conscientiousness);
    }

    #[test]
    fn labels_start_with_the_short_type() {
        assert_eq!(classify(5.0).short_label(), "D형");
        assert_eq!(classify(3.5).short_label(), "I형");
        assert_eq!(classify(2.5).short_label(), "S형");
        assert_eq!(classify(1.0).short_label(), "C형");
        for c in Classification::ALL {
            assert!(c.label().starts_with(c.short_label()));
            assert_eq!(Classification::from_label(c.label()), Some(c));
        }
        assert_eq!(Classification::from_label("외향적 리더형"), None);
    }

    #[test]
    fn answers_reject_out_of_range_input() {
        let mut answers = QuizAnswers::new();
        assert_eq!(answers.record(0, 0), Err(ValidationError::ScoreOutOfRange(0)));
        assert_eq!(answers.record(0, 6), Err(ValidationError::ScoreOutOfRange(6)));
        assert_eq!(
            answers.record(QUESTION_COUNT, 3),
            Err(ValidationError::QuestionOutOfRange(QUESTION_COUNT))
        );
    }

    #[test]
    fn complete_answers_classify_by_average() {
        let mut answers = QuizAnswers::new();
        for q in 0..QUESTION_COUNT {
            answers.record(q, if q % 2 == 0 { 4 } else { 3 }).unwrap();
        }
        assert!(answers.is_complete());
        assert_eq!(answers.average(), 3.5);
        assert_eq!(answers.classify(), Ok(Classification::Influence));
    }

    #[test]
    fn incomplete_answers_cannot_be_classified() {
        let mut answers = QuizAnswers::new();
        answers.record(3, 5).unwrap();
        assert_eq!(
            answers.classify(),
            Err(ValidationError::Incomplete {
                answered: 1,
                total: QUESTION_COUNT
            })
        );
    }
}
