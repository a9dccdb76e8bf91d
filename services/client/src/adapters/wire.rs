//! services/client/src/adapters/wire.rs
//!
//! "Impure" wire records for the backend JSON, and the decode step that turns
//! loosely shaped responses into domain types. Shape probing happens here,
//! once, so adapters and the application layer only ever see domain types.
//!
//! List responses are decoded with a fixed priority:
//! `items` > `results` > `content` > `documents` > bare array > single
//! recognizable object (wrapped in a one-element list). Anything else is an
//! empty list. A `{ "success": .., "data": .. }` envelope is unwrapped before
//! anything else, and a null `data` is an empty list.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use quiz_core::domain::{
    ContentCategory, ContentItem, HistoryEntry, Identity, NewTestResult, RankingEntry,
    RecommendationSet, RecommendationSource, ResultId, SharedResult, TestResult,
};
use quiz_core::ports::{PortError, PortResult};
use serde::{de::DeserializeOwned, de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w200";

//=========================================================================================
// Envelopes
//=========================================================================================

/// `{ "data": T }` or a bare `T`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// The keys a list may sit under, in priority order.
const LIST_KEYS: [&str; 4] = ["items", "results", "content", "documents"];

/// Decodes any list response, envelope included.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> PortResult<Vec<T>> {
    let list = match unwrap_data(value) {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => {
            let listed = LIST_KEYS
                .iter()
                .find_map(|key| map.remove(*key).filter(Value::is_array));
            match listed {
                Some(list) => list,
                None => {
                    return Ok(match serde_json::from_value::<T>(Value::Object(map)) {
                        Ok(single) => vec![single],
                        Err(e) => {
                            debug!("Unrecognized list shape, treating as empty: {}", e);
                            Vec::new()
                        }
                    })
                }
            }
        }
        other => {
            return Err(PortError::Decode(format!("expected a list, got {}", other)));
        }
    };
    serde_json::from_value(list).map_err(|e| PortError::Decode(e.to_string()))
}

/// The `data` of an object that carries one, otherwise the value itself.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub fn decode<T: DeserializeOwned>(value: Value) -> PortResult<T> {
    serde_json::from_value::<Envelope<T>>(value)
        .map(Envelope::into_inner)
        .map_err(|e| PortError::Decode(e.to_string()))
}

//=========================================================================================
// Field Helpers
//=========================================================================================

/// First present, non-null value among `keys`.
pub fn pick<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|v| !v.is_null())
}

/// Strings pass through, numbers are rendered, everything else is absent.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn pick_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(scalar_to_string)
}

fn pick_time(map: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    pick_string(map, keys).and_then(|raw| parse_time(&raw))
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC.
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value).ok_or_else(|| D::Error::custom("expected a string or numeric id"))
}

fn optional_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

fn optional_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_time))
}

//=========================================================================================
// Identity
//=========================================================================================

/// A user as the auth service returns it, and as the `dev-user` mirror stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(alias = "userId", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, alias = "username")]
    pub name: String,
    #[serde(default, alias = "email")]
    pub account_id: String,
}

impl UserRecord {
    pub fn to_domain(self) -> Identity {
        Identity {
            id: self.id,
            name: self.name,
            account_id: self.account_id,
        }
    }

    pub fn from_domain(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            account_id: identity.account_id.clone(),
        }
    }
}

/// The `data` of a login response: `{ user }` or the user itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoginData {
    Nested { user: UserRecord },
    Flat(UserRecord),
}

impl LoginData {
    pub fn into_user(self) -> UserRecord {
        match self {
            LoginData::Nested { user } => user,
            LoginData::Flat(user) => user,
        }
    }
}

/// Top-level login response. `success: false` is a rejected login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<LoginData>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

//=========================================================================================
// Test Results
//=========================================================================================

/// A test result on the wire and in the `dev-test-history` mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResultRecord {
    #[serde(alias = "testId", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub user_id: Option<String>,
    #[serde(default, alias = "personality")]
    pub user_type: String,
    #[serde(default)]
    pub type_description: String,
    #[serde(default, deserialize_with = "optional_time")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TestResultRecord {
    pub fn to_domain(self) -> TestResult {
        TestResult {
            id: ResultId::new(self.id),
            user_id: self.user_id.unwrap_or_default(),
            user_type: self.user_type,
            description: self.type_description,
            completed_at: self.completed_at.unwrap_or_default(),
        }
    }

    pub fn from_new(id: &ResultId, result: &NewTestResult) -> Self {
        Self {
            id: id.as_str().to_string(),
            user_id: Some(result.user_id.clone()),
            user_type: result.user_type.clone(),
            type_description: result.description.clone(),
            completed_at: Some(result.completed_at),
        }
    }
}

/// Body of `POST /test/save`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResultBody<'a> {
    pub user_type: &'a str,
    pub type_description: &'a str,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SaveResultResponse {
    #[serde(rename = "testId", alias = "id", deserialize_with = "id_string")]
    pub test_id: String,
}

//=========================================================================================
// Content
//=========================================================================================

/// A content item decoded from whichever field names the backend used.
///
/// Field priority: title from `title`, `name`; creator from `artist`,
/// `singer`, `author`; artwork from `image`, `album`, `poster_path`,
/// `artwork`, `thumbnail`; description from `description`, `summary`,
/// `overview`, `genre`; kind from `type`. An object with neither `title` nor
/// `name` is not a content item.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ContentItemRecord(pub ContentItem);

impl TryFrom<Map<String, Value>> for ContentItemRecord {
    type Error = PortError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let title = pick_string(&map, &["title", "name"])
            .ok_or_else(|| PortError::Decode("content item without title or name".to_string()))?;
        let artwork_url = pick_string(&map, &["image", "album", "artwork", "thumbnail"]).or_else(|| {
            pick_string(&map, &["poster_path", "posterPath"]).map(|path| {
                if path.starts_with('/') {
                    format!("{}{}", TMDB_IMAGE_BASE, path)
                } else {
                    path
                }
            })
        });

        Ok(ContentItemRecord(ContentItem {
            title,
            creator: pick_string(&map, &["artist", "singer", "author"]),
            artwork_url,
            description: pick_string(&map, &["description", "summary", "overview", "genre"]),
            kind: pick_string(&map, &["type"]),
        }))
    }
}

impl ContentItemRecord {
    pub fn to_domain(self) -> ContentItem {
        self.0
    }
}

pub fn decode_items(value: Value) -> PortResult<Vec<ContentItem>> {
    Ok(decode_list::<ContentItemRecord>(value)?
        .into_iter()
        .map(ContentItemRecord::to_domain)
        .collect())
}

fn category_keys(category: ContentCategory) -> &'static [&'static str] {
    match category {
        ContentCategory::Movie => &["movies", "movie", "Movie", "MOVIE"],
        ContentCategory::Book => &["books", "book", "Book", "BOOK"],
        ContentCategory::Music => &["music", "Music", "MUSIC", "musics"],
    }
}

/// Decodes `{ movies: [..], books: [..], music: [..] }` (any casing) into a set.
pub fn decode_recommendations(
    value: &Value,
    source: RecommendationSource,
) -> PortResult<RecommendationSet> {
    let map = match value {
        Value::Object(map) => match map.get("data") {
            Some(Value::Object(inner)) => inner,
            _ => map,
        },
        Value::Null => return Ok(RecommendationSet::new(source)),
        other => {
            return Err(PortError::Decode(format!(
                "expected a recommendation object, got {}",
                other
            )))
        }
    };

    let mut set = RecommendationSet::new(source);
    for category in ContentCategory::ALL {
        if let Some(list) = pick(map, category_keys(category)) {
            set = set.with_category(category, decode_items(list.clone())?);
        }
    }
    Ok(set)
}

//=========================================================================================
// History, Ranking & Sharing
//=========================================================================================

/// One row of `/response/history`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct HistoryEntryRecord(pub HistoryEntry);

impl TryFrom<Map<String, Value>> for HistoryEntryRecord {
    type Error = PortError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let test_id = pick_string(&map, &["testId", "id"])
            .map(ResultId::new)
            .ok_or_else(|| PortError::Decode("history entry without testId".to_string()))?;
        let source = RecommendationSource::Result(test_id.clone());
        let recommendations = match pick(&map, &["Recommend", "recommend", "recommendations"]) {
            Some(value) => decode_recommendations(value, source)?,
            None => RecommendationSet::new(source),
        };

        Ok(HistoryEntryRecord(HistoryEntry {
            test_id,
            user_type: pick_string(&map, &["userType", "personality"]),
            created_at: pick_time(&map, &["createdAt", "completedAt"]),
            recommendations,
        }))
    }
}

/// Page metadata of a paginated response (Spring `Page` or plain fields).
#[derive(Debug, Default)]
pub struct PageMeta {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub total_pages: Option<u32>,
}

pub fn page_meta(value: &Value) -> PageMeta {
    let map = match value.get("data").filter(|d| d.is_object()).unwrap_or(value) {
        Value::Object(map) => map,
        _ => return PageMeta::default(),
    };
    let number = |keys: &[&str]| pick(map, keys).and_then(Value::as_u64).map(|n| n as u32);
    PageMeta {
        page: number(&["number", "page"]),
        size: number(&["size"]),
        total_pages: number(&["totalPages", "total_pages"]),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RankingRecord {
    pub rank: Option<u32>,
    pub count: u64,
    pub item: ContentItem,
}

impl TryFrom<Map<String, Value>> for RankingRecord {
    type Error = PortError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let rank = pick(&map, &["rank", "ranking"])
            .and_then(Value::as_u64)
            .map(|n| n as u32);
        let count = pick(&map, &["count", "recommendCount", "total"])
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let item = ContentItemRecord::try_from(map)?.to_domain();
        Ok(RankingRecord { rank, count, item })
    }
}

pub fn decode_ranking(value: Value) -> PortResult<Vec<RankingEntry>> {
    Ok(decode_list::<RankingRecord>(value)?
        .into_iter()
        .enumerate()
        .map(|(idx, r)| RankingEntry {
            rank: r.rank.unwrap_or(idx as u32 + 1),
            item: r.item,
            count: r.count,
        })
        .collect())
}

/// The share token from either a JSON body or a plain-text one.
pub fn decode_share_value(data: Option<Value>, text: Option<String>) -> PortResult<String> {
    let from_json = data.and_then(|value| {
        let value = match value {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        match &value {
            Value::Object(map) => pick_string(map, &["value", "shareValue", "token"]),
            other => scalar_to_string(other),
        }
    });

    from_json
        .or_else(|| text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
        .ok_or_else(|| PortError::Decode("share response carried no value".to_string()))
}

/// `{ name, RecommendHistory: { body: { testId, Recommend: {..} } } }`
pub fn decode_shared_result(value: Value) -> PortResult<SharedResult> {
    let value = decode::<Value>(value)?;
    let map = value
        .as_object()
        .ok_or_else(|| PortError::Decode("shared result is not an object".to_string()))?;

    let owner_name = pick_string(map, &["name", "userName"]).unwrap_or_default();
    let body = pick(map, &["RecommendHistory", "recommendHistory"])
        .and_then(|h| h.get("body"))
        .and_then(Value::as_object);

    let test_id = body
        .and_then(|b| pick_string(b, &["testId"]))
        .map(ResultId::new);
    let recommendations = match (body.and_then(|b| pick(b, &["Recommend", "recommend"])), &test_id) {
        (Some(value), Some(id)) => Some(decode_recommendations(
            value,
            RecommendationSource::Result(id.clone()),
        )?),
        _ => None,
    };

    Ok(SharedResult {
        owner_name,
        test_id,
        recommendations,
    })
}
