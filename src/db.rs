use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::role::Role;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn init_db(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL {database_url:?}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Inserts a user and returns its id.
pub async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    full_name: &str,
    password: &str,
    role: Role,
) -> AppResult<i64> {
    let hashed = hash_password(password).map_err(AppError::internal)?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (email, full_name, password, role)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(email)
    .bind(full_name)
    .bind(hashed)
    .bind(role.as_ref())
    .execute(pool)
    .await
    .map_err(|e| AppError::from_constraint(e, "Email already registered"))?;

    Ok(result.last_insert_rowid())
}

/// Creates the configured admin account unless an admin already exists.
pub async fn bootstrap_admin(pool: &SqlitePool, config: &Config) -> Result<()> {
    let Some(admin) = &config.bootstrap_admin else {
        return Ok(());
    };

    let has_admin = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')",
    )
    .fetch_one(pool)
    .await
    .context("Failed to look up admin accounts")?;

    if has_admin {
        return Ok(());
    }

    let id = insert_user(pool, &admin.email, &admin.full_name, &admin.password, Role::Admin)
        .await
        .context("Failed to create bootstrap admin")?;

    info!(user_id = id, email = %admin.email, "Bootstrap admin created");
    Ok(())
}
