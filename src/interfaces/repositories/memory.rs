use std::{cmp::Ordering, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    entities::{
        experience::{Experience, ExperienceColumn, ExperienceInsert, Selection},
        listing::{ListingQuery, Page, SearchFilter, SortDirection},
    },
    errors::AppError,
    repositories::experience::ExperienceRepository,
};

/// Process-local store, used when no database is configured and in tests.
///
/// Ordering follows Postgres: `NULL` sorts after every value ascending and
/// before every value descending. Search is a case-sensitive substring match.
#[derive(Clone, Default)]
pub struct InMemoryExperienceRepo {
    inner: Arc<RwLock<Store>>,
}

#[derive(Default)]
struct Store {
    records: Vec<Experience>,
    last_timestamp: DateTime<Utc>,
}

impl Store {
    /// Strictly increasing timestamps keep creation order observable.
    /// Microsecond precision, as `timestamptz` stores.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now()
            .trunc_subsecs(6)
            .max(self.last_timestamp + Duration::microseconds(1));
        self.last_timestamp = now;
        now
    }
}

impl InMemoryExperienceRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn column_text(record: &Experience, column: ExperienceColumn) -> Option<String> {
    match column {
        ExperienceColumn::Id => Some(record.id.to_string()),
        ExperienceColumn::Company => Some(record.company.clone()),
        ExperienceColumn::Period => record.period.clone(),
        ExperienceColumn::Position => record.position.clone(),
        ExperienceColumn::Details => record.details.clone(),
        ExperienceColumn::CreatedAt => Some(timestamptz_text(&record.created_at)),
        ExperienceColumn::UpdatedAt => Some(timestamptz_text(&record.updated_at)),
    }
}

/// Renders a timestamp the way `timestamptz::text` does in a UTC session:
/// microsecond precision, trailing zeros dropped, `+00` offset.
fn timestamptz_text(value: &DateTime<Utc>) -> String {
    let mut text = value.format("%Y-%m-%d %H:%M:%S").to_string();
    let micros = value.timestamp_subsec_micros() % 1_000_000;
    if micros > 0 {
        let fraction = format!("{:06}", micros);
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }
    text.push_str("+00");
    text
}

fn matches(record: &Experience, search: &SearchFilter) -> bool {
    search.columns.iter().any(|column| {
        column_text(record, *column).is_some_and(|text| text.contains(&search.keyword))
    })
}

/// `None` compares greater than any value.
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

fn compare(a: &Experience, b: &Experience, column: ExperienceColumn) -> Ordering {
    match column {
        ExperienceColumn::Id => a.id.cmp(&b.id),
        ExperienceColumn::Company => a.company.cmp(&b.company),
        ExperienceColumn::Period => nulls_last(a.period.as_ref(), b.period.as_ref()),
        ExperienceColumn::Position => nulls_last(a.position.as_ref(), b.position.as_ref()),
        ExperienceColumn::Details => nulls_last(a.details.as_ref(), b.details.as_ref()),
        ExperienceColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        ExperienceColumn::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl ExperienceRepository for InMemoryExperienceRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn get_all_experiences(&self, selection: Selection) -> Result<Vec<Experience>, AppError> {
        let store = self.inner.read();
        Ok(store.records.iter().map(|r| selection.project(r)).collect())
    }

    async fn get_experience_by_id(&self, id: &Uuid, selection: Selection) -> Result<Option<Experience>, AppError> {
        let store = self.inner.read();
        Ok(store
            .records
            .iter()
            .find(|r| r.id == *id)
            .map(|r| selection.project(r)))
    }

    async fn create_experience(&self, experience: &ExperienceInsert) -> Result<Experience, AppError> {
        let mut store = self.inner.write();
        let now = store.next_timestamp();

        let created = Experience {
            id: Uuid::new_v4(),
            company: experience.company.clone(),
            period: experience.period.clone(),
            position: experience.position.clone(),
            details: experience.details.clone(),
            created_at: now,
            updated_at: now,
        };
        store.records.push(created.clone());

        Ok(created)
    }

    async fn update_experience(&self, id: &Uuid, experience: &ExperienceInsert) -> Result<Option<Experience>, AppError> {
        let mut store = self.inner.write();
        let now = store.next_timestamp();

        let Some(record) = store.records.iter_mut().find(|r| r.id == *id) else {
            return Ok(None);
        };

        record.company = experience.company.clone();
        record.period = experience.period.clone();
        record.position = experience.position.clone();
        record.details = experience.details.clone();
        record.updated_at = now;

        Ok(Some(record.clone()))
    }

    async fn paginate_experiences(&self, query: &ListingQuery, selection: Selection) -> Result<Page<Experience>, AppError> {
        let store = self.inner.read();

        let mut rows: Vec<&Experience> = store
            .records
            .iter()
            .filter(|r| query.search.as_ref().is_none_or(|search| matches(r, search)))
            .collect();

        rows.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort.column);
            match query.sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });

        let total = rows.len() as u64;
        let data = rows
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .map(|r| selection.project(r))
            .collect();

        Ok(Page::new(data, total, query.page, query.per_page))
    }

    async fn delete_experiences(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let mut store = self.inner.write();
        let before = store.records.len();
        store.records.retain(|r| !ids.contains(&r.id));

        Ok((before - store.records.len()) as u64)
    }
}
