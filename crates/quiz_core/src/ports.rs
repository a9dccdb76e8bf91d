//! crates/quiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client core depends on.
//! HTTP adapters, mirror-backed fallbacks and test fakes all implement these,
//! so the application layer never sees a concrete transport.

use async_trait::async_trait;

use crate::domain::{
    ContentCategory, ContentItem, HistoryPage, HistoryQuery, Identity, NewTestResult,
    RankingEntry, RecommendationSet, Registration, ResultId, SearchParams, ShareLink,
    SharedResult, TestResult, ValidationError,
};
use crate::quiz::Classification;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the network and local storage.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A 401 from any backend. Callers treat it as "not logged in".
    #[error("Unauthorized")]
    Unauthorized,
    #[error("HTTP error! status: {status}, message: {message}")]
    Http { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Local storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortError::Unauthorized)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PortError::Unauthorized => Some(401),
            PortError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Authenticates and returns the signed-in identity.
    async fn login(&self, account_id: &str, password: &str) -> PortResult<Identity>;

    async fn join(&self, registration: &Registration) -> PortResult<()>;

    async fn logout(&self) -> PortResult<()>;

    /// The identity behind the current session cookie. `Unauthorized` when there is none.
    async fn current_user(&self) -> PortResult<Identity>;

    async fn validate_session(&self) -> PortResult<bool>;

    /// `true` when the account id is still free to register.
    async fn is_account_available(&self, account_id: &str) -> PortResult<bool>;
}

#[async_trait]
pub trait TestService: Send + Sync {
    async fn save_result(&self, result: &NewTestResult) -> PortResult<ResultId>;

    async fn history(&self, user_id: &str) -> PortResult<Vec<TestResult>>;
}

#[async_trait]
pub trait ContentService: Send + Sync {
    /// Asks the backend to generate recommendations for a saved result.
    async fn request_recommendation(&self, test_id: &ResultId) -> PortResult<()>;

    async fn category_recommendations(
        &self,
        test_id: &ResultId,
        category: ContentCategory,
    ) -> PortResult<Vec<ContentItem>>;

    async fn recommendations_for(
        &self,
        classification: Classification,
    ) -> PortResult<RecommendationSet>;

    async fn search(&self, params: &SearchParams) -> PortResult<Vec<ContentItem>>;

    async fn response_history(&self, query: &HistoryQuery) -> PortResult<HistoryPage>;

    async fn ranking(
        &self,
        classification: Classification,
        size: u32,
    ) -> PortResult<Vec<RankingEntry>>;

    async fn issue_share(&self, test_id: &ResultId, name: &str) -> PortResult<ShareLink>;

    async fn resolve_share(&self, value: &str) -> PortResult<SharedResult>;
}

/// A small key-value store standing in for browser local storage.
///
/// Accesses are synchronous read-modify-write; concurrent writers to the
/// same key are last-writer-wins.
pub trait MirrorStorage: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
    fn remove(&self, key: &str) -> PortResult<()>;
}
