//! crates/quiz_core/src/domain.rs
//!
//! Defines the pure, core data structures for the quiz client.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::quiz::Classification;

//=========================================================================================
// Identity
//=========================================================================================

/// The signed-in user, as reported by the auth service or a fallback account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub account_id: String,
}

/// Sign-up form contents. Validated client-side before any request is issued.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub account_id: String,
    pub password: String,
    pub password_confirmation: String,
}

pub const MIN_PASSWORD_LEN: usize = 6;

impl Registration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.account_id.trim().is_empty() {
            return Err(ValidationError::MissingField("account_id"));
        }
        if self.password != self.password_confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(())
    }
}

//=========================================================================================
// Validation Errors
//=========================================================================================

/// Errors caught on the client before a request is issued.
/// The display strings are the messages shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("제목을 입력해 주세요.")]
    EmptyTitle,
    #[error("음악 검색은 가수도 함께 입력해 주세요.")]
    MissingArtist,
    #[error("비밀번호가 일치하지 않습니다.")]
    PasswordMismatch,
    #[error("비밀번호는 {0}자 이상이어야 합니다.")]
    PasswordTooShort(usize),
    #[error("필수 항목이 비어 있습니다: {0}")]
    MissingField(&'static str),
    #[error("question index {0} is out of range")]
    QuestionOutOfRange(usize),
    #[error("score {0} is outside 1..=5")]
    ScoreOutOfRange(u8),
    #[error("{answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
}

//=========================================================================================
// Test Results
//=========================================================================================

/// A server-assigned result identifier.
///
/// Identifiers are opaque strings but are numeric in practice, so ordering
/// compares numerically when both sides parse as integers. Numeric ids rank
/// above non-numeric ones; two non-numeric ids compare lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultId(String);

impl ResultId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn numeric(&self) -> Option<u64> {
        self.0.trim().parse().ok()
    }
}

impl Ord for ResultId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ResultId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of a "save test result" call, before the server assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTestResult {
    pub user_id: String,
    pub user_type: String,
    pub description: String,
    pub completed_at: DateTime<Utc>,
}

impl NewTestResult {
    pub fn for_classification(
        user_id: impl Into<String>,
        classification: Classification,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_type: classification.label().to_string(),
            description: classification.description().to_string(),
            completed_at,
        }
    }

    pub fn into_result(self, id: ResultId) -> TestResult {
        TestResult {
            id,
            user_id: self.user_id,
            user_type: self.user_type,
            description: self.description,
            completed_at: self.completed_at,
        }
    }
}

/// A completed quiz, immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub id: ResultId,
    pub user_id: String,
    pub user_type: String,
    pub description: String,
    pub completed_at: DateTime<Utc>,
}

impl TestResult {
    pub fn classification(&self) -> Option<Classification> {
        Classification::from_label(&self.user_type)
    }
}

/// The outcome of picking the latest result from a history list.
///
/// The pick is always by identifier. The two flags record whether list order
/// or timestamps would have chosen a different record.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestSelection<'a> {
    pub result: &'a TestResult,
    pub disagrees_with_position: bool,
    pub disagrees_with_timestamp: bool,
}

impl LatestSelection<'_> {
    pub fn is_consistent(&self) -> bool {
        !self.disagrees_with_position && !self.disagrees_with_timestamp
    }
}

pub fn select_latest(results: &[TestResult]) -> Option<LatestSelection<'_>> {
    let by_id = results.iter().max_by(|a, b| a.id.cmp(&b.id))?;
    let by_time = results.iter().max_by_key(|r| r.completed_at)?;
    let first = results.first()?;

    Some(LatestSelection {
        result: by_id,
        disagrees_with_position: first.id != by_id.id,
        disagrees_with_timestamp: by_time.completed_at != by_id.completed_at,
    })
}

//=========================================================================================
// Content & Recommendations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentCategory {
    Movie,
    Book,
    Music,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 3] = [Self::Movie, Self::Book, Self::Music];

    /// The `content=` value the search endpoint expects.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Movie => "MOVIE",
            Self::Book => "BOOK",
            Self::Music => "MUSIC",
        }
    }

    /// The path segment under `/content/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Book => "book",
            Self::Music => "music",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Some(Self::Movie),
            "book" | "books" => Some(Self::Book),
            "music" => Some(Self::Music),
            _ => None,
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// One recommended or searched piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentItem {
    pub title: String,
    /// Artist for music, author for books.
    pub creator: Option<String>,
    pub artwork_url: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationSource {
    Result(ResultId),
    Classification(Classification),
}

/// Recommendations grouped by category. Read-only; refetched, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationSet {
    pub source: RecommendationSource,
    pub items: BTreeMap<ContentCategory, Vec<ContentItem>>,
}

impl RecommendationSet {
    pub fn new(source: RecommendationSource) -> Self {
        Self {
            source,
            items: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: ContentCategory, items: Vec<ContentItem>) -> Self {
        self.items.insert(category, items);
        self
    }

    pub fn category(&self, category: ContentCategory) -> &[ContentItem] {
        self.items.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.items.values().all(Vec::is_empty)
    }
}

//=========================================================================================
// Search
//=========================================================================================

/// A search as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub category: ContentCategory,
    pub title: String,
    pub artist: Option<String>,
}

/// A validated search, mapped to the parameters the content service takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub category: ContentCategory,
    pub title: String,
    pub artist: Option<String>,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<SearchParams, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let artist = self
            .artist
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        match self.category {
            ContentCategory::Music if artist.is_none() => Err(ValidationError::MissingArtist),
            ContentCategory::Music => Ok(SearchParams {
                category: self.category,
                title: title.to_string(),
                artist,
            }),
            // Artist is only meaningful for music.
            _ => Ok(SearchParams {
                category: self.category,
                title: title.to_string(),
                artist: None,
            }),
        }
    }
}

impl SearchParams {
    /// Query pairs for `/content/search`. Movies use `query`, the rest `title`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("content", self.category.wire_name().to_string())];
        match self.category {
            ContentCategory::Movie => pairs.push(("query", self.title.clone())),
            ContentCategory::Book => pairs.push(("title", self.title.clone())),
            ContentCategory::Music => {
                if let Some(artist) = &self.artist {
                    pairs.push(("artist", artist.clone()));
                }
                pairs.push(("title", self.title.clone()));
            }
        }
        pairs
    }
}

//=========================================================================================
// History, Ranking & Sharing
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryFilter {
    Test(ResultId),
    User(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub filter: HistoryFilter,
    pub page: u32,
    pub size: u32,
}

/// A past recommendation run shown on the "my page" view.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub test_id: ResultId,
    pub user_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub recommendations: RecommendationSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub page: u32,
    pub size: u32,
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub rank: u32,
    pub item: ContentItem,
    pub count: u64,
}

/// A share token the backend issued for a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub value: String,
}

/// A result resolved from a share token.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedResult {
    pub owner_name: String,
    pub test_id: Option<ResultId>,
    pub recommendations: Option<RecommendationSet>,
}
