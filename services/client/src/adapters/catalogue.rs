//! services/client/src/adapters/catalogue.rs
//!
//! Built-in data used when the backends are unreachable: the fallback
//! accounts, the sample history seeded for them, and a small recommendation
//! catalogue keyed by classification.

use chrono::{TimeZone, Utc};
use quiz_core::domain::{
    ContentCategory, ContentItem, Identity, RecommendationSet, RecommendationSource,
};
use quiz_core::quiz::Classification;

use crate::adapters::wire::TestResultRecord;

/// Served when the catalogue has no entry for the requested classification.
pub const DEFAULT_CLASSIFICATION: Classification = Classification::Steadiness;

pub struct FallbackAccount {
    pub id: &'static str,
    pub name: &'static str,
    pub account_id: &'static str,
    pub password: &'static str,
}

pub const FALLBACK_ACCOUNTS: &[FallbackAccount] = &[
    FallbackAccount {
        id: "1",
        name: "김테스트",
        account_id: "test@example.com",
        password: "password123",
    },
    FallbackAccount {
        id: "2",
        name: "이개발",
        account_id: "dev@example.com",
        password: "dev123",
    },
];

impl FallbackAccount {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.to_string(),
            name: self.name.to_string(),
            account_id: self.account_id.to_string(),
        }
    }
}

pub fn find_fallback_account(account_id: &str, password: &str) -> Option<&'static FallbackAccount> {
    FALLBACK_ACCOUNTS
        .iter()
        .find(|a| a.account_id == account_id && a.password == password)
}

/// Two past results for a fallback account, newest first.
pub fn sample_history(user_id: &str) -> Vec<TestResultRecord> {
    let entry = |id: &str, classification: Classification, (m, d, h): (u32, u32, u32)| {
        TestResultRecord {
            id: id.to_string(),
            user_id: Some(user_id.to_string()),
            user_type: classification.label().to_string(),
            type_description: classification.description().to_string(),
            completed_at: Utc.with_ymd_and_hms(2024, m, d, h, 0, 0).single(),
        }
    };
    vec![
        entry("2", Classification::Dominance, (1, 15, 10)),
        entry("1", Classification::Steadiness, (1, 10, 14)),
    ]
}

fn item(title: &str, creator: Option<&str>, description: &str) -> ContentItem {
    ContentItem {
        title: title.to_string(),
        creator: creator.map(str::to_string),
        artwork_url: None,
        description: Some(description.to_string()),
        kind: None,
    }
}

/// The catalogue entry for `classification`, if there is one.
pub fn catalogue_recommendations(classification: Classification) -> Option<RecommendationSet> {
    let (movies, books, music) = match classification {
        Classification::Dominance => (
            vec![
                item("어벤져스: 엔드게임", None, "영웅들의 마지막 전투"),
                item("인터스텔라", None, "우주를 향한 인류의 도전"),
                item("다크 나이트", None, "정의와 악의 대결"),
            ],
            vec![
                item("리더십의 정석", Some("존 맥스웰"), "리더십 개발 가이드"),
                item("성공하는 사람들의 7가지 습관", Some("스티븐 코비"), "성공을 위한 습관들"),
                item("린 스타트업", Some("에릭 리스"), "혁신적 창업 방법론"),
            ],
            vec![
                item("Imagine Dragons", None, "에너지 넘치는 록 밴드"),
                item("OneRepublic", None, "감성적인 팝 록"),
                item("The Chainsmokers", None, "댄스 일렉트로닉"),
            ],
        ),
        Classification::Steadiness => (
            vec![
                item("쇼생크 탈출", None, "희망에 관한 이야기"),
                item("포레스트 검프", None, "인생의 여정"),
                item("어바웃 타임", None, "시간과 사랑"),
            ],
            vec![
                item("사피엔스", Some("유발 하라리"), "인류의 역사"),
                item("팩트풀니스", Some("한스 로슬링"), "데이터로 보는 세상"),
                item("코스모스", Some("칼 세이건"), "우주에 대한 탐구"),
            ],
            vec![
                item("Ed Sheeran", None, "감성적인 싱어송라이터"),
                item("Adele", None, "강력한 보컬"),
                item("John Mayer", None, "기타 연주의 대가"),
            ],
        ),
        Classification::Conscientiousness => (
            vec![
                item("기생충", None, "사회적 메시지가 담긴 작품"),
                item("버드맨", None, "예술가의 고뇌"),
                item("문라이트", None, "정체성에 대한 탐구"),
            ],
            vec![
                item("1984", Some("조지 오웰"), "디스토피아 소설"),
                item("데미안", Some("헤르만 헤세"), "성장과 자아 발견"),
                item("백년의 고독", Some("가브리엘 가르시아 마르케스"), "마술적 리얼리즘"),
            ],
            vec![
                item("Radiohead", None, "실험적인 록 음악"),
                item("Bon Iver", None, "몽환적인 포크"),
                item("Arcade Fire", None, "웅장한 인디 록"),
            ],
        ),
        Classification::Influence => return None,
    };

    Some(
        RecommendationSet::new(RecommendationSource::Classification(classification))
            .with_category(ContentCategory::Movie, movies)
            .with_category(ContentCategory::Book, books)
            .with_category(ContentCategory::Music, music),
    )
}

/// The catalogue entry, or the default classification's when there is none.
pub fn catalogue_or_default(classification: Classification) -> RecommendationSet {
    catalogue_recommendations(classification)
        .or_else(|| catalogue_recommendations(DEFAULT_CLASSIFICATION))
        .unwrap_or_else(|| {
            RecommendationSet::new(RecommendationSource::Classification(DEFAULT_CLASSIFICATION))
        })
}
