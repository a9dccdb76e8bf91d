pub mod domain;
pub mod guard;
pub mod ports;
pub mod quiz;

pub use domain::{
    select_latest, ContentCategory, ContentItem, HistoryEntry, HistoryFilter, HistoryPage,
    HistoryQuery, Identity, LatestSelection, NewTestResult, RankingEntry, RecommendationSet,
    RecommendationSource, Registration, ResultId, SearchParams, SearchQuery, ShareLink,
    SharedResult, TestResult, ValidationError,
};
pub use guard::{StaleGuard, Ticket};
pub use ports::{AuthService, ContentService, MirrorStorage, PortError, PortResult, TestService};
pub use quiz::{classify, Classification, QuizAnswers, QUESTION_COUNT};
