//! Dashboard and team figures computed from a list of time entries.
//!
//! Everything here is pure: callers load the entries, these functions only
//! group and sum them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::project::Project;
use crate::model::time_entry::TimeEntry;

pub const WEEK_DAYS: u64 = 7;
pub const RECENT_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayHours {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Mon")]
    pub weekday: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProjectShare {
    pub project_id: i64,
    pub project: String,
    pub hours: f64,
    /// share of all hours in the set
    pub percent_of_total: f64,
    /// relative to the busiest project, for bar widths
    pub percent_of_max: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    #[schema(value_type = String, format = "date")]
    pub today: NaiveDate,
    pub today_hours: f64,
    pub week: Vec<DayHours>,
    pub week_total: f64,
    pub total_hours: f64,
    pub projects: Vec<ProjectShare>,
    pub recent: Vec<TimeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProjectHours {
    pub project_id: i64,
    pub project: String,
    pub hours: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeStats {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub total_hours: f64,
    pub projects_count: usize,
    #[schema(value_type = Option<String>, format = "date")]
    pub last_entry: Option<NaiveDate>,
    /// hours per project, largest first
    pub projects: Vec<ProjectHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamProjectStats {
    pub project_id: i64,
    pub project: String,
    pub hours: f64,
    pub employees_count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamStats {
    pub total_hours: f64,
    pub employees: Vec<EmployeeStats>,
    pub projects: Vec<TeamProjectStats>,
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

fn sum_hours<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> f64 {
    entries.into_iter().map(|e| e.hours).sum()
}

/// Hours per day for the `WEEK_DAYS` days ending at `today`, oldest first.
pub fn week_breakdown(entries: &[TimeEntry], today: NaiveDate) -> Vec<DayHours> {
    (0..WEEK_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DayHours {
            date,
            weekday: date.format("%a").to_string(),
            hours: sum_hours(entries.iter().filter(|e| e.entry_date == date)),
        })
        .collect()
}

/// Projects with logged hours, ordered by name.
pub fn project_shares(entries: &[TimeEntry]) -> Vec<ProjectShare> {
    let mut by_project: BTreeMap<i64, (String, f64)> = BTreeMap::new();
    for e in entries {
        by_project
            .entry(e.project_id)
            .or_insert_with(|| (e.project_name.clone(), 0.0))
            .1 += e.hours;
    }

    let total: f64 = by_project.values().map(|(_, h)| h).sum();
    let max = by_project.values().map(|(_, h)| *h).fold(0.0, f64::max);

    let mut shares: Vec<ProjectShare> = by_project
        .into_iter()
        .filter(|(_, (_, hours))| *hours > 0.0)
        .map(|(project_id, (project, hours))| ProjectShare {
            project_id,
            project,
            hours,
            percent_of_total: percent(hours, total),
            percent_of_max: percent(hours, max),
        })
        .collect();

    shares.sort_by(|a, b| a.project.cmp(&b.project).then(a.project_id.cmp(&b.project_id)));
    shares
}

/// Personal dashboard. Only `user_id`'s entries count, even when `entries` holds the whole team.
pub fn dashboard(entries: &[TimeEntry], user_id: i64, today: NaiveDate) -> DashboardStats {
    let mut mine: Vec<TimeEntry> = entries
        .iter()
        .filter(|e| e.user_id == user_id)
        .cloned()
        .collect();
    mine.sort_by(|a, b| {
        b.entry_date
            .cmp(&a.entry_date)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });

    let week = week_breakdown(&mine, today);
    let week_total = week.iter().map(|d| d.hours).sum();

    DashboardStats {
        today,
        today_hours: sum_hours(mine.iter().filter(|e| e.entry_date == today)),
        week,
        week_total,
        total_hours: sum_hours(&mine),
        projects: project_shares(&mine),
        recent: mine.iter().take(RECENT_ENTRIES).cloned().collect(),
    }
}

/// Team overview. `projects` is the full project list so idle projects show up with zero hours.
pub fn team(entries: &[TimeEntry], projects: &[Project]) -> TeamStats {
    let total_hours = sum_hours(entries);

    let mut by_user: BTreeMap<i64, Vec<&TimeEntry>> = BTreeMap::new();
    for e in entries {
        by_user.entry(e.user_id).or_default().push(e);
    }

    let mut employees: Vec<EmployeeStats> = by_user
        .into_values()
        .filter_map(|user_entries| {
            let first = *user_entries.first()?;
            let user_total = sum_hours(user_entries.iter().copied());

            let mut per_project: BTreeMap<i64, (String, f64)> = BTreeMap::new();
            for e in &user_entries {
                per_project
                    .entry(e.project_id)
                    .or_insert_with(|| (e.project_name.clone(), 0.0))
                    .1 += e.hours;
            }

            let mut breakdown: Vec<ProjectHours> = per_project
                .into_iter()
                .map(|(project_id, (project, hours))| ProjectHours {
                    project_id,
                    project,
                    hours,
                    percent: percent(hours, user_total),
                })
                .collect();
            breakdown.sort_by(|a, b| {
                b.hours
                    .total_cmp(&a.hours)
                    .then_with(|| a.project.cmp(&b.project))
            });

            Some(EmployeeStats {
                user_id: first.user_id,
                name: first.user_name.clone(),
                email: first.user_email.clone(),
                total_hours: user_total,
                projects_count: breakdown.len(),
                last_entry: user_entries.iter().map(|e| e.entry_date).max(),
                projects: breakdown,
            })
        })
        .collect();
    employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.user_id.cmp(&b.user_id)));

    let projects = projects
        .iter()
        .map(|project| {
            let project_entries: Vec<&TimeEntry> = entries
                .iter()
                .filter(|e| e.project_id == project.id)
                .collect();
            let hours = sum_hours(project_entries.iter().copied());
            let employees_count = project_entries
                .iter()
                .map(|e| e.user_id)
                .collect::<BTreeSet<_>>()
                .len();

            TeamProjectStats {
                project_id: project.id,
                project: project.name.clone(),
                hours,
                employees_count,
                percent: percent(hours, total_hours),
            }
        })
        .collect();

    TeamStats {
        total_hours,
        employees,
        projects,
    }
}
