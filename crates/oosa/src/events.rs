//! Event and idea lookups backed by an in-memory mock dataset.

use chrono::{DateTime, Duration, Utc};

use crate::types::{Event, Idea, OosaResult, Participants, UserSummary};

/// Filters accepted by [`OosaClient::get_events`]. All filters are optional.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// `Some(true)` keeps only finished events, `Some(false)` only upcoming ones.
    pub past: Option<bool>,
    /// Keep events starting at or after this instant.
    pub period_begin: Option<DateTime<Utc>>,
    /// Keep events ending at or before this instant.
    pub period_end: Option<DateTime<Utc>>,
}

impl EventFilter {
    /// Apply the filter to `events`, evaluating "past" against `now`.
    pub fn apply(&self, events: Vec<Event>, now: DateTime<Utc>) -> OosaResult<Vec<Event>> {
        let mut kept = Vec::with_capacity(events.len());
        for event in events {
            if self.matches(&event, now)? {
                kept.push(event);
            }
        }
        Ok(kept)
    }

    fn matches(&self, event: &Event, now: DateTime<Utc>) -> OosaResult<bool> {
        let starts = event.starts_at()?;
        let ends = event.ends_at()?;

        if let Some(past) = self.past {
            if (ends < now) != past {
                return Ok(false);
            }
        }
        if let Some(begin) = self.period_begin {
            if starts < begin {
                return Ok(false);
            }
        }
        if let Some(end) = self.period_end {
            if ends > end {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Client for the OOSA backend.
///
/// Currently serves a fixed dataset; the method signatures are what a real
/// database-backed client would expose.
#[derive(Debug, Clone, Default)]
pub struct OosaClient;

impl OosaClient {
    pub fn new() -> Self {
        Self
    }

    /// List events matching `filter`.
    pub fn get_events(&self, filter: &EventFilter) -> OosaResult<Vec<Event>> {
        let events = filter.apply(mock_events(), Utc::now())?;
        tracing::debug!(count = events.len(), "Listed events");
        Ok(events)
    }

    /// List ideas, newest first, relative to `now`.
    pub fn get_ideas(&self, now: DateTime<Utc>) -> Vec<Idea> {
        let ideas = [
            ("1", "測試點子1", "這是一個測試點子的描述", 1),
            ("2", "測試點子2", "這是另一個測試點子的描述", 2),
            ("3", "測試點子3", "這是第三個測試點子的描述", 3),
        ];

        ideas
            .into_iter()
            .map(|(id, title, description, days_ago)| Idea {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                created_at: now - Duration::days(days_ago),
            })
            .collect()
    }
}

fn user(id: &str, name: &str, email: &str, avatar: &str) -> UserSummary {
    UserSummary {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        avatar: avatar.to_string(),
    }
}

fn mock_events() -> Vec<Event> {
    let users = [
        user("user1", "王小明", "xiaoming@example.com", "https://example.com/avatar1.jpg"),
        user("user2", "李小華", "xiaohua@example.com", "https://example.com/avatar2.jpg"),
        user("user3", "張大偉", "dawei@example.com", "https://example.com/avatar3.jpg"),
    ];

    struct Row {
        id: &'static str,
        name: &'static str,
        date: &'static str,
        date_end: &'static str,
        deadline: &'static str,
        place: &'static str,
        at: (f64, f64),
        meeting_point: (&'static str, f64, f64),
        limit: u32,
        fee: f64,
        photo: &'static str,
        kind: &'static str,
        creator: usize,
        latest: std::ops::Range<usize>,
        remaining: u32,
        created_at: &'static str,
    }

    let rows = [
        Row {
            id: "event1",
            name: "象山步道健行賞夜景",
            date: "2025-04-11T16:00:00Z",
            date_end: "2025-04-11T20:00:00Z",
            deadline: "2025-04-10T23:59:59Z",
            place: "象山步道",
            at: (25.0330, 121.5700),
            meeting_point: ("象山捷運站2號出口", 25.0330, 121.5700),
            limit: 15,
            fee: 0.0,
            photo: "https://example.com/elephant_mountain.jpg",
            kind: "健行",
            creator: 0,
            latest: 0..3,
            remaining: 12,
            created_at: "2025-03-11T12:00:00Z",
        },
        Row {
            id: "event2",
            name: "大稻埕老街文化導覽",
            date: "2025-04-12T14:00:00Z",
            date_end: "2025-04-12T18:00:00Z",
            deadline: "2025-04-11T23:59:59Z",
            place: "大稻埕",
            at: (25.0550, 121.5100),
            meeting_point: ("大稻埕碼頭", 25.0550, 121.5100),
            limit: 20,
            fee: 200.0,
            photo: "https://example.com/dadaocheng.jpg",
            kind: "文化導覽",
            creator: 1,
            latest: 0..2,
            remaining: 17,
            created_at: "2025-03-12T12:00:00Z",
        },
        Row {
            id: "event3",
            name: "北投溫泉泡湯之旅",
            date: "2025-04-13T13:00:00Z",
            date_end: "2025-04-13T17:00:00Z",
            deadline: "2025-04-12T23:59:59Z",
            place: "北投溫泉博物館",
            at: (25.1370, 121.5070),
            meeting_point: ("北投捷運站出口", 25.1319, 121.4986),
            limit: 10,
            fee: 500.0,
            photo: "https://example.com/beitou_hot_spring.jpg",
            kind: "溫泉",
            creator: 2,
            latest: 1..3,
            remaining: 7,
            created_at: "2025-03-13T12:00:00Z",
        },
        Row {
            id: "event4",
            name: "士林夜市美食探索",
            date: "2025-04-14T18:00:00Z",
            date_end: "2025-04-14T22:00:00Z",
            deadline: "2025-04-13T23:59:59Z",
            place: "士林夜市",
            at: (25.0880, 121.5200),
            meeting_point: ("士林捷運站1號出口", 25.0880, 121.5200),
            limit: 8,
            fee: 0.0,
            photo: "https://example.com/shilin_night_market.jpg",
            kind: "美食",
            creator: 0,
            latest: 0..2,
            remaining: 5,
            created_at: "2025-03-14T12:00:00Z",
        },
        Row {
            id: "event5",
            name: "陽明山賞花健行",
            date: "2025-04-15T09:00:00Z",
            date_end: "2025-04-15T15:00:00Z",
            deadline: "2025-04-14T23:59:59Z",
            place: "陽明山國家公園",
            at: (25.1700, 121.5400),
            meeting_point: ("劍潭捷運站1號出口", 25.0836, 121.5256),
            limit: 12,
            fee: 300.0,
            photo: "https://example.com/yangmingshan.jpg",
            kind: "健行",
            creator: 1,
            latest: 0..3,
            remaining: 9,
            created_at: "2025-03-15T12:00:00Z",
        },
    ];

    rows.into_iter()
        .map(|row| Event {
            id: row.id.to_string(),
            name: row.name.to_string(),
            date: row.date.to_string(),
            date_end: row.date_end.to_string(),
            deadline: row.deadline.to_string(),
            place: row.place.to_string(),
            lat: row.at.0,
            lng: row.at.1,
            meeting_point_name: row.meeting_point.0.to_string(),
            meeting_point_lat: row.meeting_point.1,
            meeting_point_lng: row.meeting_point.2,
            participant_limit: row.limit,
            payment_required: row.fee > 0.0,
            payment_fee: row.fee,
            photo: row.photo.to_string(),
            kind: row.kind.to_string(),
            created_by: users.get(row.creator).cloned(),
            participants: Some(Participants {
                latest_three: users.get(row.latest).map(<[_]>::to_vec).unwrap_or_default(),
                remaining: row.remaining,
            }),
            created_at: Some(row.created_at.to_string()),
        })
        .collect()
}
