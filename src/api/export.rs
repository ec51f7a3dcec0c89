use crate::{
    api::time_entry::TimeEntryQuery,
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    report::xlsx::{build_workbook, export_filename},
    utils::db_utils::fetch_entries,
};
use actix_web::{
    HttpResponse,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use chrono::Local;
use sqlx::SqlitePool;
use tracing::info;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Excel report of time entries (admin)
#[utoipa::path(
    get,
    path = "/api/export",
    params(TimeEntryQuery),
    responses(
        (status = 200, description = "XLSX workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Bad filter"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Export"
)]
pub async fn export_xlsx(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<TimeEntryQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let filter = query.to_filter(&auth)?;
    let entries = fetch_entries(pool.get_ref(), &filter).await?;

    let bytes = build_workbook(&entries).map_err(AppError::internal)?;
    let filename = export_filename(Local::now().date_naive());

    info!(rows = entries.len(), file = %filename, "Excel export generated");

    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes))
}
