use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    constants::{DEFAULT_PAGE_SIZE, DEFAULT_SORT_COLUMN},
    entities::experience::ExperienceColumn,
    errors::FieldError,
};

// ───── Wire Request ─────────────────────────────────────────────────

/// Listing request as sent by table front-ends: `params` and `sorter` are
/// JSON documents carried as text, and each `columns` entry is a JSON
/// encoded column descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingRequest {
    #[serde(default)]
    pub params: Option<String>,
    #[serde(default)]
    pub sorter: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

impl ListingRequest {
    /// Collects a listing request from decoded query pairs. `columns`,
    /// `columns[]` and `columns[N]` all append a descriptor.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = ListingRequest::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "params" => request.params = Some(value.to_string()),
                "sorter" => request.sorter = Some(value.to_string()),
                "page" => request.page = value.trim().parse().ok(),
                k if k == "columns" || (k.starts_with("columns[") && k.ends_with(']')) => {
                    request.columns.push(value.to_string())
                }
                _ => {}
            }
        }

        request
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingParams {
    #[serde(default, deserialize_with = "lenient_page_size")]
    page_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient_keyword")]
    keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnDescriptor {
    #[serde(default)]
    data_index: JsonValue,
    #[serde(default)]
    search: JsonValue,
}

/// Accepts `20`, `"20"`, `""` and `null`. Zero counts as absent.
fn lenient_page_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let invalid = || serde::de::Error::custom("pageSize must be a positive integer");

    let size = match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => None,
        JsonValue::Number(n) => Some(n.as_u64().ok_or_else(invalid)?),
        JsonValue::String(s) if s.trim().is_empty() => None,
        JsonValue::String(s) => Some(s.trim().parse::<u64>().map_err(|_| invalid())?),
        _ => return Err(invalid()),
    };

    match size {
        None | Some(0) => Ok(None),
        Some(n) => u32::try_from(n).map(Some).map_err(|_| invalid()),
    }
}

/// Accepts strings and numbers, so `{"keyword": 2020}` searches for "2020".
fn lenient_keyword<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s)),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        _ => Err(serde::de::Error::custom("keyword must be a string or a number")),
    }
}

// ───── Parsed Query ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `"ascend"` sorts ascending, every other value descending.
    pub fn from_sorter_value(value: &JsonValue) -> Self {
        match value.as_str() {
            Some("ascend") => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: ExperienceColumn,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder {
            column: DEFAULT_SORT_COLUMN,
            direction: SortDirection::Descending,
        }
    }
}

/// OR-combined substring match of `keyword` over `columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub keyword: String,
    pub columns: Vec<ExperienceColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// 1-based page index
    pub page: u32,
    pub per_page: u32,
    pub sort: SortOrder,
    pub search: Option<SearchFilter>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        ListingQuery {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
            sort: SortOrder::default(),
            search: None,
        }
    }
}

impl ListingQuery {
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * (self.per_page as i64)
    }
}

impl TryFrom<&ListingRequest> for ListingQuery {
    type Error = Vec<FieldError>;

    fn try_from(request: &ListingRequest) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let params = match request.params.as_deref().filter(|p| !p.trim().is_empty()) {
            None => ListingParams::default(),
            Some(raw) => serde_json::from_str::<Option<ListingParams>>(raw)
                .map(Option::unwrap_or_default)
                .unwrap_or_else(|e| {
                    errors.push(FieldError::new("params", format!("Invalid params: {}", e)));
                    ListingParams::default()
                }),
        };

        let sort = match parse_sorter(request.sorter.as_deref()) {
            Ok(sort) => sort,
            Err(e) => {
                errors.push(e);
                SortOrder::default()
            }
        };

        // Whitespace is a valid keyword; only an absent or empty one skips search.
        let search = match params.keyword.as_deref().filter(|k| !k.is_empty()) {
            None => None,
            Some(keyword) => match searchable_columns(&request.columns) {
                Ok(columns) if columns.is_empty() => None,
                Ok(columns) => Some(SearchFilter {
                    keyword: keyword.to_string(),
                    columns,
                }),
                Err(mut e) => {
                    errors.append(&mut e);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ListingQuery {
            page: request.page.filter(|p| *p > 0).unwrap_or(1),
            per_page: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
            search,
        })
    }
}

/// Every entry of the sorter assigns the sort order in document order, so
/// with several keys the last one is used.
fn parse_sorter(raw: Option<&str>) -> Result<SortOrder, FieldError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(SortOrder::default());
    };

    let entries = match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Object(entries)) => entries,
        Ok(JsonValue::Null) => return Ok(SortOrder::default()),
        Ok(JsonValue::Array(items)) if items.is_empty() => return Ok(SortOrder::default()),
        Ok(_) => return Err(FieldError::new("sorter", "Sorter must be a JSON object")),
        Err(e) => return Err(FieldError::new("sorter", format!("Invalid sorter: {}", e))),
    };

    let mut sort = SortOrder::default();
    for (key, value) in &entries {
        sort = SortOrder {
            column: key
                .parse()
                .map_err(|_| FieldError::new("sorter", format!("Unknown sort column: {}", key)))?,
            direction: SortDirection::from_sorter_value(value),
        };
    }

    Ok(sort)
}

/// Columns whose descriptor has `search: true`. Descriptors that are not
/// flagged searchable are not inspected further.
fn searchable_columns(columns: &[String]) -> Result<Vec<ExperienceColumn>, Vec<FieldError>> {
    let mut searchable = Vec::new();
    let mut errors = Vec::new();

    for raw in columns {
        let descriptor = match serde_json::from_str::<ColumnDescriptor>(raw) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                errors.push(FieldError::new("columns", format!("Invalid column descriptor: {}", e)));
                continue;
            }
        };

        if descriptor.search != JsonValue::Bool(true) {
            continue;
        }

        match descriptor.data_index.as_str().map(str::parse::<ExperienceColumn>) {
            Some(Ok(column)) => {
                if !searchable.contains(&column) {
                    searchable.push(column);
                }
            }
            _ => errors.push(FieldError::new(
                "columns",
                format!("Unknown searchable column: {}", descriptor.data_index),
            )),
        }
    }

    if errors.is_empty() {
        Ok(searchable)
    } else {
        Err(errors)
    }
}

// ───── Page ─────────────────────────────────────────────────────────

/// One page of results plus the metadata table front-ends expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub per_page: u32,
    pub last_page: u32,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, current_page: u32, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page as u64).max(1);
        let first = (current_page.saturating_sub(1) as u64) * (per_page as u64) + 1;
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            (Some(first), Some(first + data.len() as u64 - 1))
        };

        Page {
            data,
            total,
            current_page,
            per_page,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            from,
            to,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            per_page: self.per_page,
            last_page: self.last_page,
            from: self.from,
            to: self.to,
        }
    }
}
