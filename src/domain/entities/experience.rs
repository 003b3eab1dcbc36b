use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::{AppError, FieldError};

// ───── Database Models ───────────────────────────────────────────────

/// Row of the `experiences` table.
///
/// Every field falls back to its default when the column was left out of the
/// `SELECT`, so projected queries decode into the same type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Experience {
    #[sqlx(default)]
    pub id: Uuid,
    #[sqlx(default)]
    pub company: String,
    #[sqlx(default)]
    pub period: Option<String>,
    #[sqlx(default)]
    pub position: Option<String>,
    #[sqlx(default)]
    pub details: Option<String>,
    #[sqlx(default)]
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub updated_at: DateTime<Utc>,
}

/// Normalized editable fields, written as a whole on insert and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceInsert {
    pub company: String,
    pub period: Option<String>,
    pub position: Option<String>,
    pub details: Option<String>,
}

// ───── Columns & Projection ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperienceColumn {
    Id,
    Company,
    Period,
    Position,
    Details,
    CreatedAt,
    UpdatedAt,
}

impl ExperienceColumn {
    pub const ALL: [ExperienceColumn; 7] = [
        ExperienceColumn::Id,
        ExperienceColumn::Company,
        ExperienceColumn::Period,
        ExperienceColumn::Position,
        ExperienceColumn::Details,
        ExperienceColumn::CreatedAt,
        ExperienceColumn::UpdatedAt,
    ];

    /// Column name as it appears in SQL. Only these static names are ever
    /// interpolated into queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceColumn::Id => "id",
            ExperienceColumn::Company => "company",
            ExperienceColumn::Period => "period",
            ExperienceColumn::Position => "position",
            ExperienceColumn::Details => "details",
            ExperienceColumn::CreatedAt => "created_at",
            ExperienceColumn::UpdatedAt => "updated_at",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl FromStr for ExperienceColumn {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperienceColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == s.trim())
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown column: {}", s)))
    }
}

/// Set of columns a read operation projects. Empty means every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    mask: u8,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::all()
    }
}

impl Selection {
    pub fn all() -> Self {
        Selection::only(&ExperienceColumn::ALL)
    }

    pub fn only(columns: &[ExperienceColumn]) -> Self {
        let mask = columns.iter().fold(0, |mask, column| mask | column.bit());
        if mask == 0 {
            return Selection::all();
        }
        Selection { mask }
    }

    /// Parses a comma separated `fields` parameter such as `company,period`.
    pub fn from_fields(fields: Option<&str>) -> Result<Self, AppError> {
        let Some(fields) = fields.filter(|f| !f.trim().is_empty()) else {
            return Ok(Selection::all());
        };

        let columns = fields
            .split(',')
            .filter(|f| !f.trim().is_empty())
            .map(|f| {
                f.parse::<ExperienceColumn>().map_err(|_| {
                    AppError::ValidationError(vec![FieldError::new(
                        "fields",
                        format!("Unknown column: {}", f.trim()),
                    )])
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Selection::only(&columns))
    }

    pub fn contains(&self, column: ExperienceColumn) -> bool {
        self.mask & column.bit() != 0
    }

    pub fn columns(&self) -> impl Iterator<Item = ExperienceColumn> + '_ {
        ExperienceColumn::ALL
            .into_iter()
            .filter(move |column| self.contains(*column))
    }

    /// Comma separated column list for a `SELECT` clause.
    pub fn sql_columns(&self) -> String {
        self.columns()
            .map(|column| column.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resets every unselected field to its default, matching what a
    /// projected `SELECT` decodes to.
    pub fn project(&self, record: &Experience) -> Experience {
        let keep = |column| self.contains(column);
        Experience {
            id: if keep(ExperienceColumn::Id) { record.id } else { Uuid::default() },
            company: if keep(ExperienceColumn::Company) { record.company.clone() } else { String::new() },
            period: if keep(ExperienceColumn::Period) { record.period.clone() } else { None },
            position: if keep(ExperienceColumn::Position) { record.position.clone() } else { None },
            details: if keep(ExperienceColumn::Details) { record.details.clone() } else { None },
            created_at: if keep(ExperienceColumn::CreatedAt) { record.created_at } else { DateTime::default() },
            updated_at: if keep(ExperienceColumn::UpdatedAt) { record.updated_at } else { DateTime::default() },
        }
    }
}

// ───── API Response Models ──────────────────────────────────────────

/// A record as returned to callers: only the selected columns are serialized,
/// nullable ones as explicit `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceView {
    pub record: Experience,
    pub selection: Selection,
}

impl ExperienceView {
    pub fn new(record: Experience, selection: Selection) -> Self {
        ExperienceView { record, selection }
    }

    pub fn full(record: Experience) -> Self {
        ExperienceView::new(record, Selection::all())
    }
}

impl Serialize for ExperienceView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = &self.record;
        let mut map = serializer.serialize_map(None)?;
        for column in self.selection.columns() {
            let key = column.as_str();
            match column {
                ExperienceColumn::Id => map.serialize_entry(key, &record.id)?,
                ExperienceColumn::Company => map.serialize_entry(key, &record.company)?,
                ExperienceColumn::Period => map.serialize_entry(key, &record.period)?,
                ExperienceColumn::Position => map.serialize_entry(key, &record.position)?,
                ExperienceColumn::Details => map.serialize_entry(key, &record.details)?,
                ExperienceColumn::CreatedAt => map.serialize_entry(key, &record.created_at)?,
                ExperienceColumn::UpdatedAt => map.serialize_entry(key, &record.updated_at)?,
            }
        }
        map.end()
    }
}

// ───── Input & Validation ───────────────────────────────────────────

/// Upsert payload. A present `id` updates that record, otherwise a new one
/// is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ExperienceInput {
    pub id: Option<Uuid>,

    #[validate(
        required(message = "The company field is required."),
        custom(function = "validate_company")
    )]
    pub company: Option<String>,

    pub period: Option<String>,
    pub position: Option<String>,
    pub details: Option<String>,
}

fn validate_company(company: &String) -> Result<(), ValidationError> {
    if company.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("The company field is required.".into());
        return Err(err);
    }
    Ok(())
}

/// Trims text and turns blank optional values into `None`.
fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ExperienceInput {
    pub fn new(company: impl Into<String>) -> Self {
        ExperienceInput {
            company: Some(company.into()),
            ..Default::default()
        }
    }

    /// Builds the full replacement row. Call after `validate`.
    pub fn prepare_for_insert(&self) -> ExperienceInsert {
        ExperienceInsert {
            company: normalize(&self.company).unwrap_or_default(),
            period: normalize(&self.period),
            position: normalize(&self.position),
            details: normalize(&self.details),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteExperiencesRequest {
    pub ids: Vec<Uuid>,
}
