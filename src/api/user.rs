use crate::{
    auth::auth::AuthUser,
    db::insert_user,
    error::{AppError, AppResult},
    model::{
        role::Role,
        user::{User, UserSql},
    },
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "boris@company.com", format = "email")]
    pub email: String,
    #[schema(example = "Boris Petrov")]
    pub full_name: String,
    #[schema(example = "changeme")]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Employee
}

/// Register a user (admin)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing fields"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateUser>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let email = payload.email.trim().to_lowercase();
    let full_name = payload.full_name.trim();

    if email.is_empty() || full_name.is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request(
            "Email, full name and password must not be empty",
        ));
    }
    if !email.contains('@') {
        return Err(AppError::bad_request("Email is not valid"));
    }

    let id = insert_user(pool.get_ref(), &email, full_name, &payload.password, payload.role).await?;

    info!(user_id = id, role = %payload.role, "User registered");

    Ok(HttpResponse::Created().json(User {
        id,
        email,
        full_name: full_name.to_string(),
        role: payload.role,
    }))
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users ordered by name", body = [User]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(auth: AuthUser, pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let rows = sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, email, full_name, password, role, created_at, last_login_at
        FROM users
        ORDER BY full_name, id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    let users = rows
        .into_iter()
        .map(User::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(users))
}
