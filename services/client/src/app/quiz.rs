//! services/client/src/app/quiz.rs
//!
//! Submitting a finished questionnaire: classify, save, then ask the content
//! service to generate and store recommendations for the new result.

use chrono::Utc;
use quiz_core::domain::{
    ContentCategory, Identity, NewTestResult, RecommendationSet, RecommendationSource, ResultId,
};
use quiz_core::ports::{ContentService, PortResult, TestService};
use quiz_core::quiz::{Classification, QuizAnswers};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::app::state::AppState;

/// Categories are fetched in this order once generation is done.
const FETCH_ORDER: [ContentCategory; 3] = [
    ContentCategory::Book,
    ContentCategory::Music,
    ContentCategory::Movie,
];

#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedQuiz {
    pub result_id: ResultId,
    pub classification: Classification,
    pub recommendations: RecommendationSet,
}

pub struct QuizFlow {
    tests: Arc<dyn TestService>,
    content: Arc<dyn ContentService>,
}

impl QuizFlow {
    pub fn new(app: &AppState) -> Self {
        Self {
            tests: app.tests.clone(),
            content: app.content.clone(),
        }
    }

    /// Runs every step strictly in sequence and stops at the first failure.
    #[instrument(skip(self, identity, answers), fields(user_id = %identity.id))]
    pub async fn submit(
        &self,
        identity: &Identity,
        answers: &QuizAnswers,
    ) -> PortResult<SubmittedQuiz> {
        let classification = answers.classify()?;
        let result = NewTestResult::for_classification(&identity.id, classification, Utc::now());

        let result_id = self.tests.save_result(&result).await?;
        info!(test_id = %result_id, "Saved test result as {}.", classification.short_label());

        self.content.request_recommendation(&result_id).await?;

        let mut recommendations =
            RecommendationSet::new(RecommendationSource::Result(result_id.clone()));
        for category in FETCH_ORDER {
            let items = self
                .content
                .category_recommendations(&result_id, category)
                .await?;
            recommendations = recommendations.with_category(category, items);
        }
        info!(test_id = %result_id, "Recommendations stored.");

        Ok(SubmittedQuiz {
            result_id,
            classification,
            recommendations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mirror::{read_history, MemoryMirror};
    use crate::app::testing::{app_state, DownAuth};
    use quiz_core::domain::ValidationError;
    use quiz_core::ports::{MirrorStorage, PortError};

    fn identity() -> Identity {
        Identity {
            id: "1".to_string(),
            name: "김테스트".to_string(),
            account_id: "test@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn incomplete_answers_are_rejected_before_saving() {
        let mirror: Arc<dyn MirrorStorage> = Arc::new(MemoryMirror::new());
        let flow = QuizFlow::new(&app_state(Arc::new(DownAuth), mirror.clone()));

        let mut answers = QuizAnswers::new();
        answers.record(0, 5).unwrap();

        assert!(matches!(
            flow.submit(&identity(), &answers).await,
            Err(PortError::Validation(ValidationError::Incomplete { answered: 1, total: 20 }))
        ));
        assert!(read_history(mirror.as_ref()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_falls_back_but_generation_failure_stops_the_flow() {
        let mirror: Arc<dyn MirrorStorage> = Arc::new(MemoryMirror::new());
        let flow = QuizFlow::new(&app_state(Arc::new(DownAuth), mirror.clone()));

        let mut answers = QuizAnswers::new();
        for q in 0..quiz_core::quiz::QUESTION_COUNT {
            answers.record(q, 4).unwrap();
        }

        assert!(matches!(
            flow.submit(&identity(), &answers).await,
            Err(PortError::Transport(_))
        ));
        // The result itself was kept in the mirror.
        let history = read_history(mirror.as_ref()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_type, Classification::Dominance.label());
    }
}
