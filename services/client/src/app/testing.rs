//! Fakes shared by the application-layer unit tests.

use async_trait::async_trait;
use quiz_core::domain::{
    ContentCategory, ContentItem, HistoryPage, HistoryQuery, Identity, NewTestResult,
    RankingEntry, RecommendationSet, Registration, ResultId, SearchParams, ShareLink,
    SharedResult, TestResult,
};
use quiz_core::ports::{
    AuthService, ContentService, MirrorStorage, PortError, PortResult, TestService,
};
use quiz_core::quiz::Classification;
use std::sync::Arc;

use crate::adapters::{CatalogueContentService, MirroredTestService};
use crate::app::state::AppState;

fn refused() -> PortError {
    PortError::Transport("connection refused".to_string())
}

/// An auth backend with no session that cannot be reached for anything else.
pub struct DownAuth;

#[async_trait]
impl AuthService for DownAuth {
    async fn login(&self, _: &str, _: &str) -> PortResult<Identity> {
        Err(refused())
    }
    async fn join(&self, _: &Registration) -> PortResult<()> {
        Err(refused())
    }
    async fn logout(&self) -> PortResult<()> {
        Err(refused())
    }
    async fn current_user(&self) -> PortResult<Identity> {
        Err(PortError::Unauthorized)
    }
    async fn validate_session(&self) -> PortResult<bool> {
        Ok(false)
    }
    async fn is_account_available(&self, _: &str) -> PortResult<bool> {
        Err(refused())
    }
}

pub struct DownTests;

#[async_trait]
impl TestService for DownTests {
    async fn save_result(&self, _: &NewTestResult) -> PortResult<ResultId> {
        Err(refused())
    }
    async fn history(&self, _: &str) -> PortResult<Vec<TestResult>> {
        Err(refused())
    }
}

pub struct DownContent;

#[async_trait]
impl ContentService for DownContent {
    async fn request_recommendation(&self, _: &ResultId) -> PortResult<()> {
        Err(refused())
    }
    async fn category_recommendations(
        &self,
        _: &ResultId,
        _: ContentCategory,
    ) -> PortResult<Vec<ContentItem>> {
        Err(refused())
    }
    async fn recommendations_for(&self, _: Classification) -> PortResult<RecommendationSet> {
        Err(refused())
    }
    async fn search(&self, _: &SearchParams) -> PortResult<Vec<ContentItem>> {
        Err(refused())
    }
    async fn response_history(&self, _: &HistoryQuery) -> PortResult<HistoryPage> {
        Err(refused())
    }
    async fn ranking(&self, _: Classification, _: u32) -> PortResult<Vec<RankingEntry>> {
        Err(refused())
    }
    async fn issue_share(&self, _: &ResultId, _: &str) -> PortResult<ShareLink> {
        Err(refused())
    }
    async fn resolve_share(&self, _: &str) -> PortResult<SharedResult> {
        Err(refused())
    }
}

/// State with every backend down and the fallbacks wired in, as the binary does.
pub fn app_state(auth: Arc<dyn AuthService>, mirror: Arc<dyn MirrorStorage>) -> AppState {
    AppState {
        auth,
        tests: Arc::new(MirroredTestService::new(DownTests, mirror.clone())),
        content: Arc::new(CatalogueContentService::new(DownContent)),
        mirror,
    }
}
