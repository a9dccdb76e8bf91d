mod support;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use client_lib::app::{QuizFlow, ResultReader};
use quiz_core::domain::{ContentCategory, HistoryFilter, Identity, RecommendationSource};
use quiz_core::quiz::{Classification, QuizAnswers, QUESTION_COUNT};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use support::{spawn_backend, wire_app};

type Calls = Arc<Mutex<Vec<String>>>;

async fn save(
    State(calls): State<Calls>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    calls.lock().unwrap().push(format!(
        "save {} {}",
        params.get("id").cloned().unwrap_or_default(),
        body["userType"].as_str().unwrap_or_default()
    ));
    Json(json!({ "testId": 42 }))
}

async fn recommend(
    State(calls): State<Calls>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    calls.lock().unwrap().push(format!(
        "recommend {}",
        params.get("testId").cloned().unwrap_or_default()
    ));
    Json(json!({ "success": true }))
}

async fn category(State(calls): State<Calls>, Path(segment): Path<String>) -> Json<Value> {
    calls.lock().unwrap().push(segment.clone());
    Json(json!({ "success": true, "data": [{ "title": format!("{} pick", segment) }] }))
}

async fn history() -> Json<Value> {
    Json(json!({
        "content": [{
            "testId": 42,
            "userType": "D형 (지배형)",
            "createdAt": "2024-03-01T09:00:00",
            "Recommend": { "books": [{ "title": "린 스타트업", "author": "에릭 리스" }] }
        }],
        "number": 0,
        "size": 10,
        "totalPages": 1
    }))
}

fn routes(calls: Calls) -> Router {
    Router::new()
        .route("/test/save", post(save))
        .route("/gemini/recommend", post(recommend))
        .route("/content/{category}", get(category))
        .route("/response/history", get(history))
        .with_state(calls)
}

fn identity() -> Identity {
    Identity {
        id: "7".to_string(),
        name: "김테스트".to_string(),
        account_id: "test@example.com".to_string(),
    }
}

#[tokio::test]
async fn submission_saves_generates_and_fetches_in_order() {
    let calls: Calls = Arc::default();
    let (app, _) = wire_app(spawn_backend(routes(calls.clone())).await);

    let mut answers = QuizAnswers::new();
    for q in 0..QUESTION_COUNT {
        answers.record(q, 5).unwrap();
    }

    let submitted = QuizFlow::new(&app).submit(&identity(), &answers).await.unwrap();
    assert_eq!(submitted.result_id.as_str(), "42");
    assert_eq!(submitted.classification, Classification::Dominance);
    assert_eq!(
        submitted.recommendations.source,
        RecommendationSource::Result(submitted.result_id.clone())
    );
    assert_eq!(
        submitted.recommendations.category(ContentCategory::Music)[0].title,
        "music pick"
    );

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "save 7 D형 (지배형)".to_string(),
            "recommend 42".to_string(),
            "book".to_string(),
            "music".to_string(),
            "movie".to_string(),
        ]
    );
}

#[tokio::test]
async fn history_pages_decode_with_their_recommendations() {
    let calls: Calls = Arc::default();
    let (app, _) = wire_app(spawn_backend(routes(calls)).await);

    let page = ResultReader::new(&app)
        .response_history(HistoryFilter::User("7".to_string()), 0, None)
        .await
        .unwrap();

    assert_eq!(page.total_pages, Some(1));
    assert_eq!(page.entries.len(), 1);
    let entry = &page.entries[0];
    assert_eq!(entry.test_id.as_str(), "42");
    assert_eq!(entry.user_type.as_deref(), Some("D형 (지배형)"));
    assert!(entry.created_at.is_some());
    assert_eq!(
        entry.recommendations.category(ContentCategory::Book)[0].creator.as_deref(),
        Some("에릭 리스")
    );
}
