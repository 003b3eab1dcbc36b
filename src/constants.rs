use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::entities::experience::ExperienceColumn;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SORT_COLUMN: ExperienceColumn = ExperienceColumn::CreatedAt;

pub const MSG_FETCHED: &str = "Data is fetched successfully";
pub const MSG_NO_RESULT_BY_ID: &str = "No result is found";
pub const MSG_SAVED: &str = "Data is successfully saved";
pub const MSG_UPDATED: &str = "Data is successfully updated";
pub const MSG_DELETED: &str = "Data is deleted successfully";
pub const MSG_NOTHING_TO_DELETE: &str = "Nothing to Delete";
pub const MSG_SOMETHING_WENT_WRONG: &str = "Something went wrong";
pub const MSG_FAULT_HIDDEN: &str = "An internal error occurred";
