//! services/client/src/app/results.rs
//!
//! Read-side operations behind the result, my-page and share views.

use quiz_core::domain::{
    select_latest, ContentCategory, HistoryFilter, HistoryPage, HistoryQuery, Identity,
    RankingEntry, RecommendationSet, RecommendationSource, ResultId, ShareLink, SharedResult,
    TestResult, ValidationError,
};
use quiz_core::ports::{ContentService, PortError, PortResult, TestService};
use quiz_core::quiz::Classification;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::state::AppState;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_RANKING_SIZE: u32 = 10;

pub struct ResultReader {
    tests: Arc<dyn TestService>,
    content: Arc<dyn ContentService>,
}

impl ResultReader {
    pub fn new(app: &AppState) -> Self {
        Self {
            tests: app.tests.clone(),
            content: app.content.clone(),
        }
    }

    /// The identity's latest result, chosen by identifier.
    pub async fn latest_result(&self, identity: &Identity) -> PortResult<Option<TestResult>> {
        let history = self.tests.history(&identity.id).await?;
        let Some(selection) = select_latest(&history) else {
            debug!(user_id = %identity.id, "No test results yet.");
            return Ok(None);
        };

        if selection.disagrees_with_position {
            warn!(
                test_id = %selection.result.id,
                first = %history[0].id,
                "Latest result by id is not first in the history list."
            );
        }
        if selection.disagrees_with_timestamp {
            warn!(
                test_id = %selection.result.id,
                "Latest result by id does not carry the newest completion time."
            );
        }
        Ok(Some(selection.result.clone()))
    }

    /// Recommendations generated for one saved result, every category.
    pub async fn result_recommendations(
        &self,
        test_id: &ResultId,
    ) -> PortResult<RecommendationSet> {
        let mut set = RecommendationSet::new(RecommendationSource::Result(test_id.clone()));
        for category in ContentCategory::ALL {
            let items = self
                .content
                .category_recommendations(test_id, category)
                .await?;
            set = set.with_category(category, items);
        }
        Ok(set)
    }

    /// Recommendations for the result's classification.
    pub async fn classification_recommendations(
        &self,
        result: &TestResult,
    ) -> PortResult<RecommendationSet> {
        let classification = result.classification().ok_or_else(|| {
            PortError::Decode(format!("unrecognized result type '{}'", result.user_type))
        })?;
        self.content.recommendations_for(classification).await
    }

    pub async fn response_history(
        &self,
        filter: HistoryFilter,
        page: u32,
        size: Option<u32>,
    ) -> PortResult<HistoryPage> {
        let query = HistoryQuery {
            filter,
            page,
            size: size.unwrap_or(DEFAULT_PAGE_SIZE),
        };
        self.content.response_history(&query).await
    }

    pub async fn ranking(
        &self,
        classification: Classification,
        size: Option<u32>,
    ) -> PortResult<Vec<RankingEntry>> {
        self.content
            .ranking(classification, size.unwrap_or(DEFAULT_RANKING_SIZE))
            .await
    }

    pub async fn issue_share(&self, test_id: &ResultId, name: &str) -> PortResult<ShareLink> {
        if name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        self.content.issue_share(test_id, name.trim()).await
    }

    pub async fn resolve_share(&self, value: &str) -> PortResult<SharedResult> {
        self.content.resolve_share(value).await
    }
}
