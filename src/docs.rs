use crate::api::reference::{CreateActivity, CreateProject};
use crate::api::time_entry::{CreatedEntryResponse, TimeEntryListResponse, TimeEntryPayload};
use crate::api::user::CreateUser;
use crate::model::project::{Activity, Project, ReferenceData};
use crate::model::role::Role;
use crate::model::time_entry::TimeEntry;
use crate::model::user::User;
use crate::models::{LoginReqDto, LoginResponse, TokenPair};
use crate::report::aggregate::{
    DashboardStats, DayHours, EmployeeStats, ProjectHours, ProjectShare, TeamProjectStats,
    TeamStats,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time Tracker API",
        version = "0.1.0",
        description = r#"
## Time Tracker

Employees log hours against projects and activity types; administrators
review team statistics and export reports.

### Key Features
- **Time entries**: create, edit, delete and list your own hours
- **Daily limit**: optional cap on the hours one person may log per day
- **Dashboard**: today, the last seven days and per-project shares
- **Team view** (admin): per-employee and per-project totals
- **Export** (admin): Excel report of the filtered entries

### Security
Every `/api` endpoint expects a **JWT Bearer** access token from `/auth/login`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::user::create_user,
        crate::api::user::list_users,

        crate::api::reference::list_reference,
        crate::api::reference::create_project,
        crate::api::reference::create_activity,

        crate::api::time_entry::list_entries,
        crate::api::time_entry::get_entry,
        crate::api::time_entry::create_entry,
        crate::api::time_entry::update_entry,
        crate::api::time_entry::delete_entry,

        crate::api::stats::dashboard,
        crate::api::stats::team,

        crate::api::export::export_xlsx
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            TokenPair,
            User,
            Role,
            CreateUser,
            Project,
            Activity,
            ReferenceData,
            CreateProject,
            CreateActivity,
            TimeEntry,
            TimeEntryPayload,
            TimeEntryListResponse,
            CreatedEntryResponse,
            DashboardStats,
            DayHours,
            ProjectShare,
            TeamStats,
            EmployeeStats,
            ProjectHours,
            TeamProjectStats
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and token management"),
        (name = "Users", description = "User administration"),
        (name = "Reference", description = "Projects and activity types"),
        (name = "Time entries", description = "Logged hours"),
        (name = "Stats", description = "Dashboard and team figures"),
        (name = "Export", description = "Excel reports"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
