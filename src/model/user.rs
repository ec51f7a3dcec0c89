use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::role::Role;

/// Row as stored, password hash included. Never serialized.
#[derive(Debug, sqlx::FromRow)]
pub struct UserSql {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub last_login_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "email": "anna@company.com",
    "full_name": "Anna Ivanova",
    "role": "employee"
}))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl TryFrom<UserSql> for User {
    type Error = AppError;

    fn try_from(row: UserSql) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|_| AppError::internal(format!("unknown role {:?} for user {}", row.role, row.id)))?;

        Ok(User {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role,
        })
    }
}
