//! services/client/src/app/search.rs
//!
//! The content search controller. Searches can overlap when the user types
//! fast or switches category mid-flight; only the most recently issued search
//! may write its results.

use quiz_core::domain::{ContentCategory, ContentItem, SearchQuery, ValidationError};
use quiz_core::guard::StaleGuard;
use quiz_core::ports::ContentService;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::app::state::AppState;

pub const SEARCH_FAILED_MESSAGE: &str = "검색 중 오류가 발생했습니다.";

/// What the view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub category: ContentCategory,
    pub title: String,
    pub artist: String,
    pub loading: bool,
    pub items: Vec<ContentItem>,
    pub error: Option<String>,
    pub has_searched: bool,
}

impl SearchSnapshot {
    fn empty(category: ContentCategory) -> Self {
        Self {
            category,
            title: String::new(),
            artist: String::new(),
            loading: false,
            items: Vec::new(),
            error: None,
            has_searched: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response (or its error) was written to the state.
    Applied,
    /// A newer search or a category switch superseded this one.
    Discarded,
    /// Rejected before any request was issued.
    Rejected(ValidationError),
}

pub struct SearchController {
    content: Arc<dyn ContentService>,
    state: Mutex<SearchSnapshot>,
    guard: StaleGuard,
}

impl SearchController {
    pub fn new(app: &AppState) -> Self {
        Self {
            content: app.content.clone(),
            state: Mutex::new(SearchSnapshot::empty(ContentCategory::Movie)),
            guard: StaleGuard::new(),
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.lock().clone()
    }

    /// Switches category, resetting the form and results. Searches still in
    /// flight are discarded when they complete.
    pub fn set_category(&self, category: ContentCategory) {
        self.guard.invalidate();
        *self.lock() = SearchSnapshot::empty(category);
    }

    pub async fn submit(&self, query: SearchQuery) -> SearchOutcome {
        {
            let mut state = self.lock();
            state.title = query.title.clone();
            state.artist = query.artist.clone().unwrap_or_default();
        }

        let params = match query.validate() {
            Ok(params) => params,
            Err(e) => {
                let mut state = self.lock();
                state.error = Some(e.to_string());
                state.has_searched = true;
                return SearchOutcome::Rejected(e);
            }
        };

        let ticket = self.guard.issue();
        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
            state.items.clear();
        }

        let result = self.content.search(&params).await;

        let applied = self.guard.apply_if_current(ticket, result, |result| {
            let mut state = self.lock();
            state.loading = false;
            state.has_searched = true;
            match result {
                Ok(items) => {
                    debug!(count = items.len(), "Search results applied.");
                    state.items = items;
                }
                Err(e) => {
                    warn!("Search failed: {}", e);
                    state.items.clear();
                    state.error = Some(SEARCH_FAILED_MESSAGE.to_string());
                }
            }
        });

        match applied {
            Some(()) => SearchOutcome::Applied,
            None => {
                debug!(ticket = ticket.token(), "Discarding a superseded search response.");
                SearchOutcome::Discarded
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
