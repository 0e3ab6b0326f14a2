use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::{
    CreateTask, EditHistory, ListQuery, LoginRequest, SearchQuery, Task, UpdateTask, PRIORITIES, STATUSES,
};
use crate::{Db, Store};

const MAX_TITLE_LEN: usize = 500;

fn body<T>(payload: Result<Json<T>, JsonRejection>, message: &str) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|e| {
        tracing::debug!(error = %e, "unreadable request body");
        ApiError::bad_request(message)
    })
}

fn parse_due_date(raw: Option<String>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|d| Some(d.with_timezone(&Utc)))
            .map_err(|_| ApiError::bad_request("invalid due_date format, use RFC3339")),
    }
}

/// Copy with creator, assignee and tags joined in.
fn with_relations(store: &Store, task: &Task) -> Task {
    let mut t = task.clone();
    t.creator = store.user(t.creator_id).cloned();
    t.assignee = t.assignee_id.and_then(|id| store.user(id).cloned());
    t.tags = store.tags_for(t.id);
    t
}

pub async fn login(State(db): State<Db>, payload: Result<Json<LoginRequest>, JsonRejection>) -> Result<Json<Value>, ApiError> {
    let req = body(payload, "invalid request")?;
    let mut store = db.write().await;
    let user = store
        .user_by_email(&req.email)
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), user.id);
    tracing::info!(user = %user.id, "login");

    Ok(Json(json!({
        "token": token,
        "user": { "id": user.id, "email": user.email, "name": user.name, "role": user.role },
    })))
}

/// Newest first. `include=assignee` joins the assignee.
pub async fn list_tasks(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Vec<Task>> {
    let store = db.read().await;
    let status = query.status.filter(|s| !s.is_empty());
    let include_assignee = query.include.as_deref() == Some("assignee");
    let tasks = store
        .tasks
        .iter()
        .rev()
        .filter(|t| status.as_deref().map_or(true, |s| t.status == s))
        .map(|t| {
            let mut t = t.clone();
            t.tags = store.tags_for(t.id);
            if include_assignee {
                t.assignee = t.assignee_id.and_then(|id| store.user(id).cloned());
            }
            t
        })
        .collect();
    Json(tasks)
}

pub async fn get_task(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Task>, ApiError> {
    let store = db.read().await;
    let task = store.task(id).ok_or_else(ApiError::task_not_found)?;
    Ok(Json(with_relations(&store, task)))
}

pub async fn create_task(
    State(db): State<Db>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let mut req = body(payload, "invalid request body")?;

    if req.title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    if req.title.len() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request("title too long"));
    }
    if req.status.is_empty() {
        req.status = "todo".to_string();
    }
    if !STATUSES.contains(&req.status.as_str()) {
        return Err(ApiError::bad_request("invalid status"));
    }
    if req.priority.is_empty() {
        req.priority = "medium".to_string();
    }
    if !PRIORITIES.contains(&req.priority.as_str()) {
        return Err(ApiError::bad_request("invalid priority"));
    }
    let due_date = parse_due_date(req.due_date)?;

    let mut store = db.write().await;
    if let Some(assignee) = req.assignee_id {
        if store.user(assignee).is_none() {
            return Err(ApiError::bad_request("assignee not found"));
        }
    }
    let id = store.insert_task(
        &req.title,
        req.description,
        &req.status,
        &req.priority,
        user_id,
        req.assignee_id,
        due_date,
        req.estimated_hours,
    );
    let task = store.task(id).cloned().ok_or_else(ApiError::task_not_found)?;
    tracing::info!(task = %id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// Applies only the fields present. A status change is recorded in the
/// edit history.
pub async fn update_task(
    State(db): State<Db>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let req = body(payload, "invalid request body")?;
    let due_date = parse_due_date(req.due_date)?;

    if let Some(status) = &req.status {
        if !STATUSES.contains(&status.as_str()) {
            return Err(ApiError::bad_request("invalid status"));
        }
    }
    if let Some(priority) = &req.priority {
        if !PRIORITIES.contains(&priority.as_str()) {
            return Err(ApiError::bad_request("invalid priority"));
        }
    }

    let mut store = db.write().await;
    if let Some(assignee) = req.assignee_id {
        if store.user(assignee).is_none() {
            return Err(ApiError::bad_request("assignee not found"));
        }
    }
    let task = store
        .tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(ApiError::task_not_found)?;

    let old_status = task.status.clone();
    if let Some(title) = req.title {
        task.title = title;
    }
    if let Some(description) = req.description {
        task.description = Some(description);
    }
    if let Some(status) = &req.status {
        task.status = status.clone();
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if let Some(assignee) = req.assignee_id {
        task.assignee_id = Some(assignee);
    }
    if due_date.is_some() {
        task.due_date = due_date;
    }
    if let Some(hours) = req.estimated_hours {
        task.estimated_hours = Some(hours);
    }
    if let Some(hours) = req.actual_hours {
        task.actual_hours = Some(hours);
    }
    task.updated_at = Utc::now();
    let updated = task.clone();

    if let Some(status) = req.status {
        store.history.push(EditHistory {
            id: Uuid::new_v4(),
            task_id: id,
            user_id,
            field_name: "status".to_string(),
            old_value: Some(old_status),
            new_value: Some(status),
            edited_at: Utc::now(),
        });
    }
    Ok(Json(updated))
}

pub async fn delete_task(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let before = store.tasks.len();
    store.tasks.retain(|t| t.id != id);
    if store.tasks.len() == before {
        return Err(ApiError::task_not_found());
    }
    store.task_tags.retain(|(t, _)| *t != id);
    Ok(StatusCode::NO_CONTENT)
}

/// Case-insensitive match on title or description, newest first.
pub async fn search_tasks(State(db): State<Db>, Query(query): Query<SearchQuery>) -> Result<Json<Vec<Task>>, ApiError> {
    let needle = query
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("query parameter q is required"))?
        .to_lowercase();

    let store = db.read().await;
    let tasks = store
        .tasks
        .iter()
        .rev()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.description.as_deref().unwrap_or("").to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    Ok(Json(tasks))
}

/// Most recent edit first.
pub async fn task_history(State(db): State<Db>, Path(id): Path<Uuid>) -> Json<Vec<EditHistory>> {
    let store = db.read().await;
    let history = store.history.iter().rev().filter(|h| h.task_id == id).cloned().collect();
    Json(history)
}

pub async fn dashboard_stats(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let now = Utc::now();
    let mut by_status: BTreeMap<&str, u64> = BTreeMap::new();
    let mut by_priority: BTreeMap<&str, u64> = BTreeMap::new();
    let mut overdue = 0u64;
    for t in &store.tasks {
        *by_status.entry(t.status.as_str()).or_default() += 1;
        *by_priority.entry(t.priority.as_str()).or_default() += 1;
        if t.status != "done" && t.due_date.is_some_and(|d| d < now) {
            overdue += 1;
        }
    }
    Json(json!({
        "total_tasks": store.tasks.len(),
        "by_status": by_status,
        "by_priority": by_priority,
        "overdue_tasks": overdue,
    }))
}
