use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    model::project::{Activity, Project},
    utils::reference_cache::ReferenceCache,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateProject {
    #[schema(example = "Billing")]
    pub name: String,
    #[schema(example = "Invoicing backend", nullable = true)]
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateActivity {
    #[schema(example = "Development")]
    pub name: String,
}

fn required_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Name must not be empty"));
    }
    Ok(name)
}

/// Projects and activities
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "Reference data ordered by name", body = ReferenceData),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn list_reference(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
    cache: web::Data<ReferenceCache>,
) -> AppResult<HttpResponse> {
    let data = cache.get(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(data.as_ref()))
}

/// Create a project (admin)
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Name taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn create_project(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    cache: web::Data<ReferenceCache>,
    payload: web::Json<CreateProject>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let name = required_name(&payload.name)?;
    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let result = sqlx::query("INSERT INTO projects (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(pool.get_ref())
        .await
        .map_err(|e| AppError::from_constraint(e, "Project already exists"))?;

    cache.invalidate().await;

    let project = Project {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        description: description.map(str::to_string),
    };
    info!(project_id = project.id, name = %project.name, "Project created");

    Ok(HttpResponse::Created().json(project))
}

/// Create an activity type (admin)
#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = CreateActivity,
    responses(
        (status = 201, description = "Activity created", body = Activity),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Name taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn create_activity(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    cache: web::Data<ReferenceCache>,
    payload: web::Json<CreateActivity>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let name = required_name(&payload.name)?;

    let result = sqlx::query("INSERT INTO activities (name) VALUES (?)")
        .bind(name)
        .execute(pool.get_ref())
        .await
        .map_err(|e| AppError::from_constraint(e, "Activity already exists"))?;

    cache.invalidate().await;

    let activity = Activity {
        id: result.last_insert_rowid(),
        name: name.to_string(),
    };
    info!(activity_id = activity.id, name = %activity.name, "Activity created");

    Ok(HttpResponse::Created().json(activity))
}
