//! In-memory implementation of the task API used to exercise the client.
//!
//! Any password is accepted for a seeded user; tokens are opaque random
//! strings kept in memory. Nothing is persisted and no summaries are
//! generated.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;

use std::{collections::HashMap, sync::Arc};

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::models::{EditHistory, Tag, Task, User};

pub const ADMIN_ID: Uuid = Uuid::from_u128(0xa1);
pub const MEMBER_ID: Uuid = Uuid::from_u128(0xb2);
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const MEMBER_EMAIL: &str = "dev@example.com";

#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<User>,
    pub tags: Vec<Tag>,
    /// Insertion order, oldest first.
    pub tasks: Vec<Task>,
    pub task_tags: Vec<(Uuid, Uuid)>,
    pub history: Vec<EditHistory>,
    pub tokens: HashMap<String, Uuid>,
}

pub type Db = Arc<RwLock<Store>>;

impl Store {
    /// Two users and a few tags, no tasks.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let user = |id, email: &str, name: &str, role: &str| User {
            id,
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        let tag = |n: u128, name: &str, color: &str| Tag {
            id: Uuid::from_u128(0x7a90 + n),
            name: name.to_string(),
            color: color.to_string(),
            created_at: now,
        };
        Self {
            users: vec![
                user(ADMIN_ID, ADMIN_EMAIL, "Admin", "admin"),
                user(MEMBER_ID, MEMBER_EMAIL, "Dana Dev", "member"),
            ],
            tags: vec![
                tag(1, "bug", "#ef4444"),
                tag(2, "feature", "#3b82f6"),
                tag(3, "security", "#f59e0b"),
            ],
            ..Self::default()
        }
    }

    /// A handful of tasks across every column, some overdue.
    pub fn with_demo_tasks(mut self) -> Self {
        let now = Utc::now();
        let demo = [
            ("Fix login crash on invalid email", "todo", "high", Some(MEMBER_ID), Some(now - Duration::days(2))),
            ("Implement OAuth with Google", "in_progress", "medium", Some(MEMBER_ID), Some(now + Duration::days(7))),
            ("Review rate limiting options", "review", "low", None, None),
            ("Rotate signing keys", "done", "urgent", Some(ADMIN_ID), Some(now - Duration::days(10))),
        ];
        for (title, status, priority, assignee, due) in demo {
            let id = self.insert_task(title, None, status, priority, ADMIN_ID, assignee, due, None);
            if title.starts_with("Fix") {
                self.task_tags.push((id, self.tags[0].id));
            }
        }
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_task(
        &mut self,
        title: &str,
        description: Option<String>,
        status: &str,
        priority: &str,
        creator_id: Uuid,
        assignee_id: Option<Uuid>,
        due_date: Option<DateTime<Utc>>,
        estimated_hours: Option<f64>,
    ) -> Uuid {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description,
            status: status.to_string(),
            priority: priority.to_string(),
            category: None,
            summary: None,
            creator_id,
            assignee_id,
            due_date,
            estimated_hours,
            actual_hours: None,
            created_at: now,
            updated_at: now,
            creator: None,
            assignee: None,
            tags: Vec::new(),
        };
        let id = task.id;
        self.tasks.push(task);
        id
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tags_for(&self, task_id: Uuid) -> Vec<Tag> {
        self.task_tags
            .iter()
            .filter(|(t, _)| *t == task_id)
            .filter_map(|(_, tag_id)| self.tags.iter().find(|tag| tag.id == *tag_id).cloned())
            .collect()
    }
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));

    let protected = Router::new()
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/search", get(handlers::search_tasks))
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/tasks/{id}/history", get(handlers::task_history))
        .route("/dashboard/stats", get(handlers::dashboard_stats))
        .route_layer(middleware::from_fn_with_state(db.clone(), auth::require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(handlers::login))
        .nest("/api", protected)
        .with_state(db)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
