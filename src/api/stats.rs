use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    report::aggregate,
    utils::{
        db_utils::{EntryFilter, fetch_entries},
        reference_cache::ReferenceCache,
    },
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Reference day, defaults to the server's local date
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TeamQuery {
    /// First day, inclusive
    pub from: Option<NaiveDate>,
    /// Last day, inclusive
    pub to: Option<NaiveDate>,
}

/// Personal dashboard figures
#[utoipa::path(
    get,
    path = "/api/stats/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Today, last 7 days, per-project shares and recent entries", body = DashboardStats),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn dashboard(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<DashboardQuery>,
) -> AppResult<HttpResponse> {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());

    let entries = fetch_entries(pool.get_ref(), &EntryFilter::for_user(auth.user_id)).await?;
    let stats = aggregate::dashboard(&entries, auth.user_id, today);

    Ok(HttpResponse::Ok().json(stats))
}

/// Team figures (admin)
#[utoipa::path(
    get,
    path = "/api/stats/team",
    params(TeamQuery),
    responses(
        (status = 200, description = "Per-employee and per-project totals", body = TeamStats),
        (status = 400, description = "Bad date range"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn team(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    cache: web::Data<ReferenceCache>,
    query: web::Query<TeamQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(AppError::bad_request("from cannot be after to"));
        }
    }

    let filter = EntryFilter {
        from: query.from,
        to: query.to,
        ..EntryFilter::default()
    };

    let entries = fetch_entries(pool.get_ref(), &filter).await?;
    let reference = cache.get(pool.get_ref()).await?;
    let stats = aggregate::team(&entries, &reference.projects);

    Ok(HttpResponse::Ok().json(stats))
}
