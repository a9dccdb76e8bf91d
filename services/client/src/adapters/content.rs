//! services/client/src/adapters/content.rs
//!
//! The HTTP adapter for the content/recommendation service. It implements the
//! `ContentService` port from the `core` crate.

use async_trait::async_trait;
use quiz_core::domain::{
    ContentCategory, ContentItem, HistoryFilter, HistoryPage, HistoryQuery, RankingEntry,
    RecommendationSet, RecommendationSource, ResultId, SearchParams, ShareLink, SharedResult,
};
use quiz_core::ports::{ContentService, PortResult};
use quiz_core::quiz::Classification;
use serde_json::Value;
use std::sync::Arc;

use crate::adapters::http::{segment_path, HttpDispatcher, RequestOptions, Service};
use crate::adapters::wire::{
    decode_items, decode_list, decode_ranking, decode_recommendations, decode_share_value,
    decode_shared_result, page_meta, HistoryEntryRecord,
};

/// An adapter that implements the `ContentService` port over HTTP.
#[derive(Clone)]
pub struct HttpContentAdapter {
    http: Arc<HttpDispatcher>,
}

impl HttpContentAdapter {
    pub fn new(http: Arc<HttpDispatcher>) -> Self {
        Self { http }
    }

    async fn get(&self, path: &str, options: RequestOptions) -> PortResult<Value> {
        let response = self.http.dispatch(Service::Content, path, options).await?;
        Ok(response.data.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl ContentService for HttpContentAdapter {
    async fn request_recommendation(&self, test_id: &ResultId) -> PortResult<()> {
        self.http
            .dispatch(
                Service::Content,
                "/gemini/recommend",
                RequestOptions::post().query("testId", test_id.as_str()),
            )
            .await?;
        Ok(())
    }

    async fn category_recommendations(
        &self,
        test_id: &ResultId,
        category: ContentCategory,
    ) -> PortResult<Vec<ContentItem>> {
        let path = format!("/content/{}", category.path_segment());
        let data = self
            .get(&path, RequestOptions::get().query("testId", test_id.as_str()))
            .await?;
        decode_items(data)
    }

    async fn recommendations_for(
        &self,
        classification: Classification,
    ) -> PortResult<RecommendationSet> {
        let path = format!("/recommendations/{}", classification.code());
        let data = self.get(&path, RequestOptions::get()).await?;
        decode_recommendations(&data, RecommendationSource::Classification(classification))
    }

    async fn search(&self, params: &SearchParams) -> PortResult<Vec<ContentItem>> {
        let options = params
            .query_pairs()
            .into_iter()
            .fold(RequestOptions::get(), |opts, (key, value)| opts.query(key, value));
        let data = self.get("/content/search", options).await?;
        decode_items(data)
    }

    async fn response_history(&self, query: &HistoryQuery) -> PortResult<HistoryPage> {
        let options = match &query.filter {
            HistoryFilter::Test(test_id) => RequestOptions::get().query("testId", test_id.as_str()),
            HistoryFilter::User(user_id) => RequestOptions::get().query("userId", user_id.as_str()),
        }
        .query("page", query.page.to_string())
        .query("size", query.size.to_string());

        let data = self.get("/response/history", options).await?;
        let meta = page_meta(&data);
        let entries = decode_list::<HistoryEntryRecord>(data)?
            .into_iter()
            .map(|record| record.0)
            .collect();

        Ok(HistoryPage {
            entries,
            page: meta.page.unwrap_or(query.page),
            size: meta.size.unwrap_or(query.size),
            total_pages: meta.total_pages,
        })
    }

    async fn ranking(
        &self,
        classification: Classification,
        size: u32,
    ) -> PortResult<Vec<RankingEntry>> {
        let data = self
            .get(
                "/response/ranking",
                RequestOptions::get()
                    .query("type", classification.code())
                    .query("size", size.to_string()),
            )
            .await?;
        decode_ranking(data)
    }

    async fn issue_share(&self, test_id: &ResultId, name: &str) -> PortResult<ShareLink> {
        let path = segment_path(&["response", "share", test_id.as_str(), name])?;
        let response = self
            .http
            .dispatch(Service::Content, &path, RequestOptions::post())
            .await?;
        let value = decode_share_value(response.data, response.text)?;
        Ok(ShareLink { value })
    }

    async fn resolve_share(&self, value: &str) -> PortResult<SharedResult> {
        let data = self
            .get("/response/share", RequestOptions::get().query("value", value))
            .await?;
        decode_shared_result(data)
    }
}
