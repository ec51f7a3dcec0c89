use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::{AppError, AppResult},
    model::time_entry::TimeEntry,
    utils::{
        db_utils::{EntryFilter, day_total, entry_owner, fetch_entries, fetch_entry},
        hours::{check_daily_cap, validate_hours},
    },
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TimeEntryPayload {
    #[schema(example = 1)]
    pub project_id: i64,
    #[schema(example = 2)]
    pub activity_id: i64,
    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub entry_date: NaiveDate,
    #[schema(example = 6.5)]
    pub hours: f64,
    #[schema(example = "Invoice export", nullable = true)]
    #[serde(default)]
    pub comment: Option<String>,
}

impl TimeEntryPayload {
    fn comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TimeEntryQuery {
    /// Filter by project
    pub project_id: Option<i64>,
    /// Filter by activity
    pub activity_id: Option<i64>,
    /// First day, inclusive
    pub from: Option<NaiveDate>,
    /// Last day, inclusive
    pub to: Option<NaiveDate>,
    /// Filter by user (admin only; ignored for employees)
    pub user_id: Option<i64>,
}

impl TimeEntryQuery {
    /// Employees are always pinned to their own entries.
    pub fn to_filter(&self, auth: &AuthUser) -> AppResult<EntryFilter> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::bad_request("from cannot be after to"));
            }
        }

        let user_id = if auth.is_admin() {
            self.user_id
        } else {
            Some(auth.user_id)
        };

        Ok(EntryFilter {
            user_id,
            project_id: self.project_id,
            activity_id: self.activity_id,
            from: self.from,
            to: self.to,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct TimeEntryListResponse {
    pub entries: Vec<TimeEntry>,
    pub total_hours: f64,
}

#[derive(Serialize, ToSchema)]
pub struct CreatedEntryResponse {
    #[schema(example = 12)]
    pub id: i64,
    pub entry: TimeEntry,
}

/// List time entries
#[utoipa::path(
    get,
    path = "/api/time-entries",
    params(TimeEntryQuery),
    responses(
        (status = 200, description = "Entries, newest first", body = TimeEntryListResponse),
        (status = 400, description = "Bad filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Time entries"
)]
pub async fn list_entries(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<TimeEntryQuery>,
) -> AppResult<HttpResponse> {
    let filter = query.to_filter(&auth)?;
    let entries = fetch_entries(pool.get_ref(), &filter).await?;
    let total_hours = entries.iter().map(|e| e.hours).sum();

    debug!(count = entries.len(), ?filter, "Listed time entries");

    Ok(HttpResponse::Ok().json(TimeEntryListResponse {
        entries,
        total_hours,
    }))
}

/// Get a time entry
#[utoipa::path(
    get,
    path = "/api/time-entries/{entry_id}",
    params(("entry_id" = i64, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Entry found", body = TimeEntry),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Time entries"
)]
pub async fn get_entry(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let entry_id = path.into_inner();

    let entry = fetch_entry(pool.get_ref(), entry_id)
        .await?
        .ok_or_else(|| AppError::not_found("Time entry not found"))?;

    if !auth.is_admin() {
        auth.require_owner(entry.user_id)?;
    }

    Ok(HttpResponse::Ok().json(entry))
}

/// Create a time entry for the caller
#[utoipa::path(
    post,
    path = "/api/time-entries",
    request_body = TimeEntryPayload,
    responses(
        (status = 201, description = "Entry created", body = CreatedEntryResponse),
        (status = 400, description = "Invalid hours, daily limit exceeded or unknown project/activity"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Time entries"
)]
#[instrument(skip(pool, config, payload), fields(user_id = auth.user_id))]
pub async fn create_entry(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    payload: web::Json<TimeEntryPayload>,
) -> AppResult<HttpResponse> {
    validate_hours(payload.hours)?;

    // the write comes first so the transaction holds SQLite's write lock before it reads;
    // a rejected cap check drops `tx` and rolls the insert back
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO time_entries
            (user_id, project_id, activity_id, entry_date, hours, comment, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.project_id)
    .bind(payload.activity_id)
    .bind(payload.entry_date)
    .bind(payload.hours)
    .bind(payload.comment())
    .bind(chrono::Utc::now().naive_utc())
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::from_constraint(e, "Time entry already exists"))?;

    let id = result.last_insert_rowid();

    let logged = day_total(&mut *tx, auth.user_id, payload.entry_date, Some(id)).await?;
    check_daily_cap(payload.entry_date, logged, payload.hours, config.daily_hours_cap)?;

    let entry = fetch_entry(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::internal(format!("time entry {id} vanished after insert")))?;

    tx.commit().await?;

    info!(entry_id = id, hours = payload.hours, date = %payload.entry_date, "Time entry created");

    Ok(HttpResponse::Created().json(CreatedEntryResponse { id, entry }))
}

/// Overwrite a time entry
#[utoipa::path(
    put,
    path = "/api/time-entries/{entry_id}",
    params(("entry_id" = i64, Path, description = "Time entry ID")),
    request_body = TimeEntryPayload,
    responses(
        (status = 200, description = "Entry updated", body = TimeEntry),
        (status = 400, description = "Invalid hours, daily limit exceeded or unknown project/activity"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Time entries"
)]
#[instrument(skip(pool, config, payload), fields(user_id = auth.user_id))]
pub async fn update_entry(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    payload: web::Json<TimeEntryPayload>,
) -> AppResult<HttpResponse> {
    let entry_id = path.into_inner();

    validate_hours(payload.hours)?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE time_entries
        SET project_id = ?, activity_id = ?, entry_date = ?, hours = ?, comment = ?,
            updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(payload.project_id)
    .bind(payload.activity_id)
    .bind(payload.entry_date)
    .bind(payload.hours)
    .bind(payload.comment())
    .bind(chrono::Utc::now().naive_utc())
    .bind(entry_id)
    .bind(auth.user_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::from_constraint(e, "Time entry already exists"))?;

    if result.rows_affected() == 0 {
        let owner = entry_owner(&mut *tx, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;
        auth.require_owner(owner)?;
        return Err(AppError::not_found("Time entry not found"));
    }

    // the entry's new hours must not count against themselves
    let logged = day_total(&mut *tx, auth.user_id, payload.entry_date, Some(entry_id)).await?;
    check_daily_cap(payload.entry_date, logged, payload.hours, config.daily_hours_cap)?;

    let entry = fetch_entry(&mut *tx, entry_id)
        .await?
        .ok_or_else(|| AppError::not_found("Time entry not found"))?;

    tx.commit().await?;

    info!(entry_id, "Time entry updated");

    Ok(HttpResponse::Ok().json(entry))
}

/// Delete a time entry
#[utoipa::path(
    delete,
    path = "/api/time-entries/{entry_id}",
    params(("entry_id" = i64, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Entry deleted", body = Object, example = json!({
            "message": "Time entry deleted"
        })),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Time entries"
)]
pub async fn delete_entry(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let entry_id = path.into_inner();

    let owner = entry_owner(pool.get_ref(), entry_id)
        .await?
        .ok_or_else(|| AppError::not_found("Time entry not found"))?;
    auth.require_owner(owner)?;

    let result = sqlx::query("DELETE FROM time_entries WHERE id = ? AND user_id = ?")
        .bind(entry_id)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Time entry not found"));
    }

    info!(entry_id, user_id = auth.user_id, "Time entry deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Time entry deleted"
    })))
}
