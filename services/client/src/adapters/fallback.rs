//! services/client/src/adapters/fallback.rs
//!
//! Degradation wrappers around the HTTP adapters. Each one calls the primary
//! service first and, when that fails, serves the request from the local
//! mirror or the built-in catalogue with the same result shape. Mirror and
//! backend are never reconciled.

use async_trait::async_trait;
use chrono::Utc;
use quiz_core::domain::{
    ContentCategory, ContentItem, HistoryPage, HistoryQuery, NewTestResult, RankingEntry,
    RecommendationSet, ResultId, SearchParams, ShareLink, SharedResult, TestResult,
};
use quiz_core::ports::{ContentService, MirrorStorage, PortError, PortResult, TestService};
use quiz_core::quiz::Classification;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::catalogue::catalogue_or_default;
use crate::adapters::mirror::{read_history, write_history};
use crate::adapters::wire::TestResultRecord;

fn log_primary_failure(operation: &str, error: &PortError) {
    if error.is_unauthorized() {
        info!("{} needs a session; serving from the local mirror.", operation);
    } else {
        warn!("{} failed ({}); serving from the local mirror.", operation, error);
    }
}

//=========================================================================================
// Test Results
//=========================================================================================

/// A `TestService` that falls back to the `dev-test-history` mirror.
pub struct MirroredTestService<S> {
    primary: S,
    mirror: Arc<dyn MirrorStorage>,
}

impl<S: TestService> MirroredTestService<S> {
    pub fn new(primary: S, mirror: Arc<dyn MirrorStorage>) -> Self {
        Self { primary, mirror }
    }

    /// Saves into the mirror under a wall-clock id, newest first.
    fn save_locally(&self, result: &NewTestResult) -> PortResult<ResultId> {
        let mut history = read_history(self.mirror.as_ref())?;

        // Millisecond clock, bumped past the newest mirrored id so ids stay unique.
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let newest = history.iter().filter_map(|r| r.id.parse::<u64>().ok()).max();
        let id = match newest {
            Some(newest) if newest >= now => newest + 1,
            _ => now,
        };
        let id = ResultId::new(id.to_string());

        history.insert(0, TestResultRecord::from_new(&id, result));
        write_history(self.mirror.as_ref(), &history)?;
        Ok(id)
    }
}

#[async_trait]
impl<S: TestService> TestService for MirroredTestService<S> {
    async fn save_result(&self, result: &NewTestResult) -> PortResult<ResultId> {
        match self.primary.save_result(result).await {
            Ok(id) => Ok(id),
            Err(e) => {
                log_primary_failure("Saving the test result", &e);
                self.save_locally(result)
            }
        }
    }

    async fn history(&self, user_id: &str) -> PortResult<Vec<TestResult>> {
        match self.primary.history(user_id).await {
            Ok(history) => Ok(history),
            Err(e) => {
                log_primary_failure("Fetching test history", &e);
                Ok(read_history(self.mirror.as_ref())?
                    .into_iter()
                    .filter(|r| r.user_id.as_deref() == Some(user_id))
                    .map(TestResultRecord::to_domain)
                    .collect())
            }
        }
    }
}

//=========================================================================================
// Recommendations
//=========================================================================================

/// A `ContentService` whose classification read falls back to the built-in
/// catalogue. Every other call goes straight to the primary.
pub struct CatalogueContentService<C> {
    primary: C,
}

impl<C: ContentService> CatalogueContentService<C> {
    pub fn new(primary: C) -> Self {
        Self { primary }
    }
}

#[async_trait]
impl<C: ContentService> ContentService for CatalogueContentService<C> {
    async fn request_recommendation(&self, test_id: &ResultId) -> PortResult<()> {
        self.primary.request_recommendation(test_id).await
    }

    async fn category_recommendations(
        &self,
        test_id: &ResultId,
        category: ContentCategory,
    ) -> PortResult<Vec<ContentItem>> {
        self.primary.category_recommendations(test_id, category).await
    }

    async fn recommendations_for(
        &self,
        classification: Classification,
    ) -> PortResult<RecommendationSet> {
        match self.primary.recommendations_for(classification).await {
            Ok(set) => Ok(set),
            Err(e) => {
                log_primary_failure("Fetching recommendations", &e);
                Ok(catalogue_or_default(classification))
            }
        }
    }

    async fn search(&self, params: &SearchParams) -> PortResult<Vec<ContentItem>> {
        self.primary.search(params).await
    }

    async fn response_history(&self, query: &HistoryQuery) -> PortResult<HistoryPage> {
        self.primary.response_history(query).await
    }

    async fn ranking(
        &self,
        classification: Classification,
        size: u32,
    ) -> PortResult<Vec<RankingEntry>> {
        self.primary.ranking(classification, size).await
    }

    async fn issue_share(&self, test_id: &ResultId, name: &str) -> PortResult<ShareLink> {
        self.primary.issue_share(test_id, name).await
    }

    async fn resolve_share(&self, value: &str) -> PortResult<SharedResult> {
        self.primary.resolve_share(value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mirror::MemoryMirror;
    use chrono::TimeZone;
    use quiz_core::domain::RecommendationSource;

    struct Unreachable;

    #[async_trait]
    impl TestService for Unreachable {
        async fn save_result(&self, _: &NewTestResult) -> PortResult<ResultId> {
            Err(PortError::Transport("connection refused".to_string()))
        }

        async fn history(&self, _: &str) -> PortResult<Vec<TestResult>> {
            Err(PortError::Unauthorized)
        }
    }

    fn new_result(user_id: &str, classification: Classification) -> NewTestResult {
        NewTestResult::for_classification(
            user_id,
            classification,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn failed_save_lands_in_the_mirror_newest_first() {
        let mirror: Arc<dyn MirrorStorage> = Arc::new(MemoryMirror::new());
        let service = MirroredTestService::new(Unreachable, mirror.clone());

        let first = service
            .save_result(&new_result("1", Classification::Dominance))
            .await
            .unwrap();
        let second = service
            .save_result(&new_result("1", Classification::Steadiness))
            .await
            .unwrap();
        assert!(second > first);

        let stored = read_history(mirror.as_ref()).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, second.as_str());
        assert_eq!(stored[0].user_type, Classification::Steadiness.label());
    }

    #[tokio::test]
    async fn mirrored_history_only_returns_the_requested_identity() {
        let mirror: Arc<dyn MirrorStorage> = Arc::new(MemoryMirror::new());
        let service = MirroredTestService::new(Unreachable, mirror.clone());

        service
            .save_result(&new_result("1", Classification::Dominance))
            .await
            .unwrap();
        service
            .save_result(&new_result("2", Classification::Conscientiousness))
            .await
            .unwrap();

        let history = service.history("2").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_id, "2");
        assert_eq!(
            history[0].classification(),
            Some(Classification::Conscientiousness)
        );
        assert!(service.history("3").await.unwrap().is_empty());
    }

    struct NoRecommendations;

    #[async_trait]
    impl ContentService for NoRecommendations {
        async fn request_recommendation(&self, _: &ResultId) -> PortResult<()> {
            Ok(())
        }

        async fn category_recommendations(
            &self,
            _: &ResultId,
            _: ContentCategory,
        ) -> PortResult<Vec<ContentItem>> {
            Ok(Vec::new())
        }

        async fn recommendations_for(&self, _: Classification) -> PortResult<RecommendationSet> {
            Err(PortError::Http {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        }

        async fn search(&self, _: &SearchParams) -> PortResult<Vec<ContentItem>> {
            Err(PortError::Transport("down".to_string()))
        }

        async fn response_history(&self, _: &HistoryQuery) -> PortResult<HistoryPage> {
            Err(PortError::Transport("down".to_string()))
        }

        async fn ranking(&self, _: Classification, _: u32) -> PortResult<Vec<RankingEntry>> {
            Ok(Vec::new())
        }

        async fn issue_share(&self, _: &ResultId, _: &str) -> PortResult<ShareLink> {
            Err(PortError::Transport("down".to_string()))
        }

        async fn resolve_share(&self, _: &str) -> PortResult<SharedResult> {
            Err(PortError::Transport("down".to_string()))
        }
    }

    #[tokio::test]
    async fn recommendations_fall_back_to_the_catalogue_with_the_same_shape() {
        let service = CatalogueContentService::new(NoRecommendations);

        let set = service
            .recommendations_for(Classification::Conscientiousness)
            .await
            .unwrap();
        assert_eq!(
            set.source,
            RecommendationSource::Classification(Classification::Conscientiousness)
        );
        for category in ContentCategory::ALL {
            assert!(!set.category(category).is_empty());
        }

        let missing = service
            .recommendations_for(Classification::Influence)
            .await
            .unwrap();
        assert_eq!(
            missing.source,
            RecommendationSource::Classification(Classification::Steadiness)
        );
    }

    #[tokio::test]
    async fn other_content_calls_are_not_masked() {
        let service = CatalogueContentService::new(NoRecommendations);
        let params = SearchParams {
            category: ContentCategory::Book,
            title: "데미안".to_string(),
            artist: None,
        };
        assert!(matches!(
            service.search(&params).await,
            Err(PortError::Transport(_))
        ));
    }
}
