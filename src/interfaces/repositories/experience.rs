use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{
        experience::{Experience, ExperienceInsert, Selection},
        listing::{ListingQuery, Page, SearchFilter},
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxExperienceRepo,
};

#[async_trait]
pub trait ExperienceRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;

    /// Every record, in creation order
    async fn get_all_experiences(&self, selection: Selection) -> Result<Vec<Experience>, AppError>;

    async fn get_experience_by_id(&self, id: &Uuid, selection: Selection) -> Result<Option<Experience>, AppError>;

    async fn create_experience(&self, experience: &ExperienceInsert) -> Result<Experience, AppError>;

    /// Replaces the editable fields. `None` when no row matched.
    async fn update_experience(&self, id: &Uuid, experience: &ExperienceInsert) -> Result<Option<Experience>, AppError>;

    async fn paginate_experiences(&self, query: &ListingQuery, selection: Selection) -> Result<Page<Experience>, AppError>;

    /// Returns the number of deleted rows
    async fn delete_experiences(&self, ids: &[Uuid]) -> Result<u64, AppError>;
}

#[async_trait]
impl<T> ExperienceRepository for Arc<T>
where
    T: ExperienceRepository + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn get_all_experiences(&self, selection: Selection) -> Result<Vec<Experience>, AppError> {
        (**self).get_all_experiences(selection).await
    }

    async fn get_experience_by_id(&self, id: &Uuid, selection: Selection) -> Result<Option<Experience>, AppError> {
        (**self).get_experience_by_id(id, selection).await
    }

    async fn create_experience(&self, experience: &ExperienceInsert) -> Result<Experience, AppError> {
        (**self).create_experience(experience).await
    }

    async fn update_experience(&self, id: &Uuid, experience: &ExperienceInsert) -> Result<Option<Experience>, AppError> {
        (**self).update_experience(id, experience).await
    }

    async fn paginate_experiences(&self, query: &ListingQuery, selection: Selection) -> Result<Page<Experience>, AppError> {
        (**self).paginate_experiences(query, selection).await
    }

    async fn delete_experiences(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        (**self).delete_experiences(ids).await
    }
}

impl SqlxExperienceRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxExperienceRepo { pool }
    }
}

/// Appends `WHERE (col::text LIKE $n OR ...)` for an active search.
fn push_search(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&SearchFilter>) {
    let Some(search) = search else {
        return;
    };

    let pattern = format!("%{}%", search.keyword);
    builder.push(" WHERE (");
    let mut separated = builder.separated(" OR ");
    for column in &search.columns {
        separated
            .push(format!("{}::text LIKE ", column.as_str()))
            .push_bind_unseparated(pattern.clone());
    }
    builder.push(")");
}

#[async_trait]
impl ExperienceRepository for SqlxExperienceRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn get_all_experiences(&self, selection: Selection) -> Result<Vec<Experience>, AppError> {
        let mut builder = QueryBuilder::new("SELECT ");
        builder.push(selection.sql_columns());
        builder.push(" FROM experiences ORDER BY created_at ASC");

        let experiences = builder
            .build_query_as::<Experience>()
            .fetch_all(&self.pool)
            .await?;

        Ok(experiences)
    }

    async fn get_experience_by_id(&self, id: &Uuid, selection: Selection) -> Result<Option<Experience>, AppError> {
        let mut builder = QueryBuilder::new("SELECT ");
        builder.push(selection.sql_columns());
        builder.push(" FROM experiences WHERE id = ").push_bind(*id);

        let experience = builder
            .build_query_as::<Experience>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(experience)
    }

    async fn create_experience(&self, experience: &ExperienceInsert) -> Result<Experience, AppError> {
        let created = sqlx::query_as::<_, Experience>(
            r#"
            INSERT INTO experiences (company, period, position, details)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#
        )
        .bind(&experience.company)
        .bind(&experience.period)
        .bind(&experience.position)
        .bind(&experience.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_experience(&self, id: &Uuid, experience: &ExperienceInsert) -> Result<Option<Experience>, AppError> {
        let updated = sqlx::query_as::<_, Experience>(
            r#"
            UPDATE experiences SET
                company = $1,
                period = $2,
                position = $3,
                details = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#
        )
        .bind(&experience.company)
        .bind(&experience.period)
        .bind(&experience.position)
        .bind(&experience.details)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn paginate_experiences(&self, query: &ListingQuery, selection: Selection) -> Result<Page<Experience>, AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM experiences");
        push_search(&mut count, query.search.as_ref());

        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::new("SELECT ");
        builder.push(selection.sql_columns());
        builder.push(" FROM experiences");
        push_search(&mut builder, query.search.as_ref());

        // Column and direction come from closed enums, never from raw input.
        builder.push(format!(
            " ORDER BY {} {}",
            query.sort.column.as_str(),
            query.sort.direction.as_sql()
        ));
        builder.push(" LIMIT ").push_bind(query.per_page as i64);
        builder.push(" OFFSET ").push_bind(query.offset());

        let experiences = builder
            .build_query_as::<Experience>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(experiences, total.max(0) as u64, query.page, query.per_page))
    }

    async fn delete_experiences(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM experiences WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
