#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;

use actix_web::{App, test, web};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tempfile::TempDir;

use timetracker::auth::jwt::generate_access_token;
use timetracker::config::Config;
use timetracker::db::{MIGRATOR, init_db, insert_user};
use timetracker::model::role::Role;
use timetracker::routes;
use timetracker::utils::reference_cache::ReferenceCache;

pub const SECRET: &str = "test-secret";
pub const PASSWORD: &str = "password123";

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

pub struct TestContext {
    pub pool: SqlitePool,
    pub config: Config,
    pub cache: ReferenceCache,
    // keeps an on-disk database alive for the test's duration
    _dir: Option<TempDir>,
}

impl TestContext {
    pub async fn new() -> TestContext {
        Self::with_env(&[]).await
    }

    pub async fn with_daily_cap(cap: &str) -> TestContext {
        Self::with_env(&[("DAILY_HOURS_CAP", cap)]).await
    }

    /// File-backed database with a regular multi-connection pool, for tests that need real
    /// concurrent writers.
    pub async fn on_disk(extra: &[(&str, &str)]) -> TestContext {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!("sqlite://{}", dir.path().join("timetracker.db").display());
        let pool = init_db(&url).await.expect("Failed to open database");
        let config = test_config(extra);

        TestContext {
            pool,
            cache: ReferenceCache::new(config.reference_cache_ttl),
            config,
            _dir: Some(dir),
        }
    }

    pub async fn with_env(extra: &[(&str, &str)]) -> TestContext {
        let config = test_config(extra);

        // a single connection keeps the in-memory database alive and shared
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("sqlite options")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");

        MIGRATOR.run(&pool).await.expect("Failed to run migrations");

        TestContext {
            pool,
            cache: ReferenceCache::new(config.reference_cache_ttl),
            config,
            _dir: None,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let config = self.config.clone();
        App::new()
            .app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.cache.clone()))
            .configure(move |cfg| routes::configure(cfg, &config))
    }

    pub async fn create_user(&self, email: &str, name: &str, role: Role) -> TestUser {
        let id = insert_user(&self.pool, email, name, PASSWORD, role)
            .await
            .expect("Failed to create user");
        let token = generate_access_token(id, email, role.as_ref(), SECRET, 900)
            .expect("Failed to sign token");

        TestUser {
            id,
            email: email.to_string(),
            token,
        }
    }

    pub async fn employee(&self, email: &str, name: &str) -> TestUser {
        self.create_user(email, name, Role::Employee).await
    }

    pub async fn admin(&self) -> TestUser {
        self.create_user("admin@company.com", "Admin", Role::Admin).await
    }

    pub async fn project(&self, name: &str) -> i64 {
        sqlx::query("INSERT INTO projects (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .expect("Failed to insert project")
            .last_insert_rowid()
    }

    pub async fn activity(&self, name: &str) -> i64 {
        sqlx::query("INSERT INTO activities (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .expect("Failed to insert activity")
            .last_insert_rowid()
    }
}

fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("JWT_SECRET".to_string(), SECRET.to_string());
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| env.get(key).cloned()).expect("test config")
}

pub fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().expect("peer address")
}

pub fn get(uri: &str, token: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn post(uri: &str, token: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(body)
}

pub fn put(uri: &str, token: &str, body: Value) -> test::TestRequest {
    test::TestRequest::put()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(body)
}

pub fn delete(uri: &str, token: &str) -> test::TestRequest {
    test::TestRequest::delete()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn entry_body(project_id: i64, activity_id: i64, date: &str, hours: f64) -> Value {
    json!({
        "project_id": project_id,
        "activity_id": activity_id,
        "entry_date": date,
        "hours": hours,
        "comment": "work"
    })
}
