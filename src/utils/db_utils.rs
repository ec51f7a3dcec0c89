use chrono::NaiveDate;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::model::project::{Activity, Project, ReferenceData};
use crate::model::time_entry::TimeEntry;

/// ===============================
/// Joined time entry projection
/// ===============================
const ENTRY_SELECT: &str = r#"
    SELECT te.id, te.user_id, u.email AS user_email, u.full_name AS user_name,
           te.project_id, p.name AS project_name,
           te.activity_id, a.name AS activity_name,
           te.entry_date, te.hours, te.comment, te.created_at, te.updated_at
    FROM time_entries te
    JOIN users u ON te.user_id = u.id
    JOIN projects p ON te.project_id = p.id
    JOIN activities a ON te.activity_id = a.id
"#;

const ENTRY_ORDER: &str = " ORDER BY te.entry_date DESC, te.created_at DESC, te.id DESC";

/// Narrowing applied to a time entry listing. Empty filter means everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EntryFilter {
    pub user_id: Option<i64>,
    pub project_id: Option<i64>,
    pub activity_id: Option<i64>,
    /// inclusive
    pub from: Option<NaiveDate>,
    /// inclusive
    pub to: Option<NaiveDate>,
}

// Helper enum for typed SQLx binding
#[derive(Debug, PartialEq)]
enum FilterValue {
    I64(i64),
    Date(NaiveDate),
}

impl EntryFilter {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    fn where_clause(&self) -> (String, Vec<FilterValue>) {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args = Vec::new();

        if let Some(user_id) = self.user_id {
            where_sql.push_str(" AND te.user_id = ?");
            args.push(FilterValue::I64(user_id));
        }

        if let Some(project_id) = self.project_id {
            where_sql.push_str(" AND te.project_id = ?");
            args.push(FilterValue::I64(project_id));
        }

        if let Some(activity_id) = self.activity_id {
            where_sql.push_str(" AND te.activity_id = ?");
            args.push(FilterValue::I64(activity_id));
        }

        if let Some(from) = self.from {
            where_sql.push_str(" AND te.entry_date >= ?");
            args.push(FilterValue::Date(from));
        }

        if let Some(to) = self.to {
            where_sql.push_str(" AND te.entry_date <= ?");
            args.push(FilterValue::Date(to));
        }

        (where_sql, args)
    }
}

/// Newest first.
pub async fn fetch_entries(
    pool: &SqlitePool,
    filter: &EntryFilter,
) -> Result<Vec<TimeEntry>, sqlx::Error> {
    let (where_sql, args) = filter.where_clause();
    let sql = format!("{ENTRY_SELECT}{where_sql}{ENTRY_ORDER}");

    tracing::debug!(sql = %sql, bindings = ?args, "Fetching time entries");

    let mut query = sqlx::query_as::<_, TimeEntry>(&sql);
    for arg in args {
        query = match arg {
            FilterValue::I64(v) => query.bind(v),
            FilterValue::Date(v) => query.bind(v),
        };
    }

    query.fetch_all(pool).await
}

pub async fn fetch_entry<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<TimeEntry>, sqlx::Error> {
    let sql = format!("{ENTRY_SELECT} WHERE te.id = ?");

    sqlx::query_as::<_, TimeEntry>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Owner of an entry, if the entry exists.
pub async fn entry_owner<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT user_id FROM time_entries WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Total hours a user logged on `date`, leaving out `exclude` (the entry under edit).
pub async fn day_total<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    date: NaiveDate,
    exclude: Option<i64>,
) -> Result<f64, sqlx::Error> {
    // TOTAL() is always a float, 0.0 on no rows; `IS NOT NULL` matches every id
    sqlx::query_scalar::<_, f64>(
        r#"
        SELECT TOTAL(hours)
        FROM time_entries
        WHERE user_id = ? AND entry_date = ? AND id IS NOT ?
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(exclude)
    .fetch_one(executor)
    .await
}

pub async fn fetch_reference_data(pool: &SqlitePool) -> Result<ReferenceData, sqlx::Error> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT id, name, description FROM projects ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let activities =
        sqlx::query_as::<_, Activity>("SELECT id, name FROM activities ORDER BY name")
            .fetch_all(pool)
            .await?;

    Ok(ReferenceData {
        projects,
        activities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_conditions() {
        let (sql, args) = EntryFilter::default().where_clause();
        assert_eq!(sql, " WHERE 1=1");
        assert!(args.is_empty());
    }

    #[test]
    fn conditions_follow_binding_order() {
        let from = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let filter = EntryFilter {
            user_id: Some(4),
            project_id: Some(2),
            activity_id: None,
            from: Some(from),
            to: Some(to),
        };

        let (sql, args) = filter.where_clause();

        assert_eq!(
            sql,
            " WHERE 1=1 AND te.user_id = ? AND te.project_id = ? AND te.entry_date >= ? AND te.entry_date <= ?"
        );
        assert_eq!(
            args,
            vec![
                FilterValue::I64(4),
                FilterValue::I64(2),
                FilterValue::Date(from),
                FilterValue::Date(to),
            ]
        );
    }
}
