//! Resolves each person's status from the response stream and rolls the
//! roster up into event statistics.
//!
//! Status is never stored. A person's status is the status of their response
//! with the latest `response_time`, or `no_response` if they have none. When
//! two responses carry the same timestamp, the one that arrived last wins.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::Result,
    model::{Person, ResolvedStatus, Response},
    store::{events::owned_event, people::{people_of, person_in_event}, responses::{responses_of, responses_of_person}},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_people: usize,
    pub safe_count: usize,
    pub need_help_count: usize,
    pub no_response_count: usize,
    /// Percentage of the roster that responded, `0` for an empty roster.
    pub response_rate: f64,
    pub tag_statistics: Vec<TagStatistics>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagStatistics {
    pub tag: String,
    pub total: usize,
    pub safe: usize,
    pub need_help: usize,
    pub no_response: usize,
}

impl TagStatistics {
    fn count(&mut self, status: ResolvedStatus) {
        self.total += 1;
        match status {
            ResolvedStatus::Safe => self.safe += 1,
            ResolvedStatus::NeedHelp => self.need_help += 1,
            ResolvedStatus::NoResponse => self.no_response += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonStatus {
    pub person_id: Uuid,
    pub status: ResolvedStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub response_time: Option<OffsetDateTime>,
    pub message: Option<String>,
}

impl PersonStatus {
    fn resolve(person_id: Uuid, latest: Option<&Response>) -> Self {
        match latest {
            Some(response) => PersonStatus {
                person_id,
                status: response.status.into(),
                response_time: Some(response.response_time),
                message: response.message.clone(),
            },
            None => PersonStatus {
                person_id,
                status: ResolvedStatus::NoResponse,
                response_time: None,
                message: None,
            },
        }
    }
}

/// Latest response per person. `responses` must be in arrival order.
fn latest_by_person(responses: &[Response]) -> HashMap<Uuid, &Response> {
    let mut latest: HashMap<Uuid, &Response> = HashMap::with_capacity(responses.len());
    for response in responses {
        latest
            .entry(response.person_id)
            .and_modify(|current| {
                if response.response_time >= current.response_time {
                    *current = response;
                }
            })
            .or_insert(response);
    }
    latest
}

/// Single pass over the roster joined against the grouped responses.
pub fn aggregate(people: &[Person], responses: &[Response], now: OffsetDateTime) -> Statistics {
    let latest = latest_by_person(responses);

    let mut safe_count = 0;
    let mut need_help_count = 0;
    let mut no_response_count = 0;
    let mut tag_statistics: Vec<TagStatistics> = Vec::new();
    let mut tag_index: HashMap<&str, usize> = HashMap::new();

    for person in people {
        let status = latest
            .get(&person.id)
            .map_or(ResolvedStatus::NoResponse, |response| response.status.into());

        match status {
            ResolvedStatus::Safe => safe_count += 1,
            ResolvedStatus::NeedHelp => need_help_count += 1,
            ResolvedStatus::NoResponse => no_response_count += 1,
        }

        for tag in &person.tags {
            let index = *tag_index.entry(tag.as_str()).or_insert_with(|| {
                tag_statistics.push(TagStatistics { tag: tag.clone(), ..Default::default() });
                tag_statistics.len() - 1
            });
            tag_statistics[index].count(status);
        }
    }

    let total_people = people.len();
    let response_rate = if total_people == 0 {
        0.0
    } else {
        (safe_count + need_help_count) as f64 / total_people as f64 * 100.0
    };

    Statistics {
        total_people,
        safe_count,
        need_help_count,
        no_response_count,
        response_rate,
        tag_statistics,
        last_updated: now,
    }
}

/// Statistics for one event, read from a single snapshot of roster and responses.
pub async fn compute_statistics(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid) -> Result<Statistics> {
    let mut tx = db_pool.begin().await?;
    owned_event(&mut *tx, owner_id, event_id).await?;
    let people = people_of(&mut *tx, event_id).await?;
    let responses = responses_of(&mut *tx, event_id).await?;
    tx.commit().await?;

    Ok(aggregate(&people, &responses, OffsetDateTime::now_utc()))
}

pub async fn resolve_person_status(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid, person_id: Uuid) -> Result<PersonStatus> {
    let mut tx = db_pool.begin().await?;
    owned_event(&mut *tx, owner_id, event_id).await?;
    person_in_event(&mut *tx, event_id, person_id).await?;
    let responses = responses_of_person(&mut *tx, event_id, person_id).await?;
    tx.commit().await?;

    Ok(PersonStatus::resolve(person_id, latest_by_person(&responses).get(&person_id).copied()))
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::{
        db::test_pool,
        error::Error,
        model::{NewEvent, PersonDraft, Status},
        store::{events::create_event, people::{add_person, remove_person}, responses::record_response},
    };

    fn person(name: &str, tags: &[&str]) -> Person {
        Person {
            id: Uuid::now_v7(),
            event_id: Uuid::nil(),
            name: name.to_owned(),
            contact: "x".to_owned(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn response(person: &Person, status: Status, at: OffsetDateTime) -> Response {
        Response {
            id: Uuid::now_v7(),
            event_id: Uuid::nil(),
            person_id: person.id,
            status,
            message: None,
            response_time: at,
        }
    }

    fn assert_partition(stats: &Statistics) {
        assert_eq!(stats.total_people, stats.safe_count + stats.need_help_count + stats.no_response_count);
    }

    #[test]
    fn empty_roster_has_zero_rate() {
        let stats = aggregate(&[], &[], OffsetDateTime::now_utc());
        assert_eq!(stats.total_people, 0);
        assert_eq!(stats.response_rate, 0.0);
        assert!(!stats.response_rate.is_nan());
        assert_partition(&stats);
    }

    #[test]
    fn newest_timestamp_wins_regardless_of_arrival() {
        let ana = person("Ana", &[]);
        let t1 = OffsetDateTime::now_utc();
        let t2 = t1 + Duration::minutes(5);

        let in_order = [response(&ana, Status::NeedHelp, t1), response(&ana, Status::Safe, t2)];
        let delayed = [response(&ana, Status::Safe, t2), response(&ana, Status::NeedHelp, t1)];

        for responses in [&in_order[..], &delayed[..]] {
            let stats = aggregate(std::slice::from_ref(&ana), responses, t2);
            assert_eq!((stats.safe_count, stats.need_help_count), (1, 0));
        }
    }

    #[test]
    fn same_timestamp_goes_to_the_later_arrival() {
        let ana = person("Ana", &[]);
        let at = OffsetDateTime::now_utc();
        let responses = [response(&ana, Status::Safe, at), response(&ana, Status::NeedHelp, at)];
        let stats = aggregate(std::slice::from_ref(&ana), &responses, at);
        assert_eq!(stats.need_help_count, 1);
    }

    #[test]
    fn counts_rate_and_tags() {
        let ana = person("Ana", &["IT", "Floor 3"]);
        let ben = person("Ben", &["IT"]);
        let cy = person("Cy", &["HR"]);
        let dee = person("Dee", &[]);
        let now = OffsetDateTime::now_utc();
        let responses = [
            response(&ana, Status::Safe, now),
            response(&ben, Status::NeedHelp, now),
            response(&ana, Status::Safe, now + Duration::seconds(3)),
        ];

        let stats = aggregate(&[ana, ben, cy, dee], &responses, now);
        assert_eq!(stats.total_people, 4);
        assert_eq!((stats.safe_count, stats.need_help_count, stats.no_response_count), (1, 1, 2));
        assert_eq!(stats.response_rate, 50.0);
        assert_partition(&stats);

        let tags: Vec<_> = stats.tag_statistics.iter().map(|t| (t.tag.as_str(), t.total, t.safe, t.need_help, t.no_response)).collect();
        assert_eq!(tags, [("IT", 2, 1, 1, 0), ("Floor 3", 1, 1, 0, 0), ("HR", 1, 0, 0, 1)]);
    }

    #[tokio::test]
    async fn partition_holds_through_adds_removes_and_responses() {
        let db_pool = test_pool().await;
        let event = create_event(&db_pool, "owner", NewEvent {
            title: "Typhoon".to_owned(),
            description: String::new(),
            calamity_type: "typhoon".to_owned(),
        })
        .await
        .unwrap();

        let mut people = Vec::new();
        for name in ["Ana", "Ben", "Cy"] {
            people.push(add_person(&db_pool, "owner", event.id, PersonDraft::new(name, "0917", ["Team"])).await.unwrap());
        }
        let now = OffsetDateTime::now_utc();
        record_response(&db_pool, event.id, people[0].id, Status::Safe, None, now).await.unwrap();
        record_response(&db_pool, event.id, people[1].id, Status::NeedHelp, None, now).await.unwrap();
        record_response(&db_pool, event.id, people[1].id, Status::Safe, None, now + Duration::seconds(1)).await.unwrap();

        let stats = compute_statistics(&db_pool, "owner", event.id).await.unwrap();
        assert_eq!((stats.safe_count, stats.need_help_count, stats.no_response_count), (2, 0, 1));
        assert_partition(&stats);

        remove_person(&db_pool, "owner", event.id, people[0].id).await.unwrap();
        let stats = compute_statistics(&db_pool, "owner", event.id).await.unwrap();
        assert_eq!((stats.total_people, stats.safe_count, stats.no_response_count), (2, 1, 1));
        assert_eq!(stats.response_rate, 50.0);
        assert_partition(&stats);
    }

    #[tokio::test]
    async fn resolves_a_single_person() {
        let db_pool = test_pool().await;
        let event = create_event(&db_pool, "owner", NewEvent {
            title: "Fire".to_owned(),
            description: String::new(),
            calamity_type: "fire".to_owned(),
        })
        .await
        .unwrap();
        let ana = add_person(&db_pool, "owner", event.id, PersonDraft::new("Ana", "0917", Vec::<String>::new())).await.unwrap();

        let silent = resolve_person_status(&db_pool, "owner", event.id, ana.id).await.unwrap();
        assert_eq!(silent.status, ResolvedStatus::NoResponse);
        assert_eq!(silent.response_time, None);

        let later = OffsetDateTime::now_utc();
        let earlier = later - Duration::hours(1);
        record_response(&db_pool, event.id, ana.id, Status::NeedHelp, Some("trapped".to_owned()), later).await.unwrap();
        record_response(&db_pool, event.id, ana.id, Status::Safe, None, earlier).await.unwrap();

        let resolved = resolve_person_status(&db_pool, "owner", event.id, ana.id).await.unwrap();
        assert_eq!(resolved.status, ResolvedStatus::NeedHelp);
        assert_eq!(resolved.message.as_deref(), Some("trapped"));

        let missing = resolve_person_status(&db_pool, "owner", event.id, Uuid::now_v7()).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn foreign_owner_cannot_poll() {
        let db_pool = test_pool().await;
        let event = create_event(&db_pool, "owner", NewEvent {
            title: "Fire".to_owned(),
            description: String::new(),
            calamity_type: "fire".to_owned(),
        })
        .await
        .unwrap();
        assert!(matches!(compute_statistics(&db_pool, "intruder", event.id).await, Err(Error::Forbidden)));
    }
}
