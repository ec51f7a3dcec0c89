use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A time entry joined with the names of its user, project and activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 12,
    "user_id": 3,
    "user_email": "anna@company.com",
    "user_name": "Anna Ivanova",
    "project_id": 1,
    "project_name": "Billing",
    "activity_id": 2,
    "activity_name": "Development",
    "entry_date": "2026-01-15",
    "hours": 6.5,
    "comment": "Invoice export",
    "created_at": "2026-01-15T18:02:11",
    "updated_at": null
}))]
pub struct TimeEntry {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub user_name: String,
    pub project_id: i64,
    pub project_name: String,
    pub activity_id: i64,
    pub activity_name: String,
    #[schema(value_type = String, format = "date")]
    pub entry_date: NaiveDate,
    pub hours: f64,
    pub comment: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<NaiveDateTime>,
}
