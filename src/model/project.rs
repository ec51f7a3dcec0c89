use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Project {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Billing")]
    pub name: String,
    #[schema(example = "Invoicing backend", nullable = true)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Activity {
    #[schema(example = 2)]
    pub id: i64,
    #[schema(example = "Development")]
    pub name: String,
}

/// Projects and activities as served to clients, both ordered by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReferenceData {
    pub projects: Vec<Project>,
    pub activities: Vec<Activity>,
}
