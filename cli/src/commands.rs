use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use taskboard_core::{Board, CreateTask, Priority, TaskApi, TaskStatus, Transport, UpdateTask};
use tracing::info;
use uuid::Uuid;

use crate::render;

/// Accepts RFC3339 or a bare `YYYY-MM-DD` (taken as midnight UTC).
pub fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid due date {raw:?}, use YYYY-MM-DD or RFC3339"))?;
    match date.and_hms_opt(0, 0, 0) {
        Some(naive) => Ok(naive.and_utc()),
        None => bail!("invalid due date {raw:?}"),
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("invalid task id {raw:?}"))
}

#[derive(Debug, Default)]
pub struct TaskFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub hours: Option<f64>,
    pub actual: Option<f64>,
}

impl TaskFields {
    fn into_update(self) -> Result<UpdateTask> {
        Ok(UpdateTask {
            title: self.title,
            description: self.description,
            status: self.status.map(TaskStatus::from),
            priority: self.priority.map(Priority::from),
            assignee_id: self.assignee.as_deref().map(parse_id).transpose()?,
            due_date: self.due.as_deref().map(parse_due).transpose()?,
            estimated_hours: self.hours,
            actual_hours: self.actual,
        })
    }
}

pub fn cmd_login<T: Transport>(api: &mut TaskApi<T>, email: &str, password: &str) -> Result<String> {
    let login = api.login(email, password)?;
    info!(user = %login.user.id, "logged in");
    Ok(format!("Logged in as {} ({})", login.user.name, login.user.role))
}

pub fn cmd_logout<T: Transport>(api: &mut TaskApi<T>) -> Result<String> {
    api.logout()?;
    Ok("Logged out".to_string())
}

pub fn cmd_list<T: Transport>(api: &TaskApi<T>, status: Option<String>, include: Option<String>) -> Result<String> {
    let status = status.map(TaskStatus::from);
    let tasks = api.get_tasks(status.as_ref(), include.as_deref())?;
    Ok(render::tasks(&tasks, Utc::now()))
}

pub fn cmd_show<T: Transport>(api: &TaskApi<T>, id: &str) -> Result<String> {
    let task = api.get_task(parse_id(id)?)?;
    Ok(render::task_detail(&task, Utc::now()))
}

pub fn cmd_create<T: Transport>(api: &TaskApi<T>, title: String, fields: TaskFields) -> Result<String> {
    let update = fields.into_update()?;
    let input = CreateTask {
        description: update.description,
        status: update.status,
        priority: update.priority,
        assignee_id: update.assignee_id,
        due_date: update.due_date,
        estimated_hours: update.estimated_hours,
        ..CreateTask::new(title)
    };
    let task = api.create_task(&input)?;
    Ok(format!("Created task {} \"{}\"", task.id, task.title))
}

pub fn cmd_update<T: Transport>(api: &TaskApi<T>, id: &str, fields: TaskFields) -> Result<String> {
    let id = parse_id(id)?;
    let update = fields.into_update()?;
    if update == UpdateTask::default() {
        bail!("nothing to update");
    }
    let task = api.update_task(id, &update)?;
    Ok(format!("Updated task {} \"{}\" [{}]", task.id, task.title, task.status.label()))
}

pub fn cmd_delete<T: Transport>(api: &TaskApi<T>, id: &str) -> Result<String> {
    let id = parse_id(id)?;
    api.delete_task(id)?;
    Ok(format!("Deleted task {id}"))
}

pub fn cmd_search<T: Transport>(api: &TaskApi<T>, query: &str) -> Result<String> {
    let tasks = api.search_tasks(query)?;
    Ok(render::tasks(&tasks, Utc::now()))
}

pub fn cmd_stats<T: Transport>(api: &TaskApi<T>) -> Result<String> {
    let stats = api.get_dashboard_stats()?;
    Ok(render::stats(&stats))
}

pub fn cmd_board<T: Transport>(api: &TaskApi<T>) -> Result<String> {
    let tasks = api.get_tasks(None, Some("assignee"))?;
    Ok(render::board(&Board::from_tasks(&tasks), Utc::now()))
}

pub fn cmd_history<T: Transport>(api: &TaskApi<T>, id: &str) -> Result<String> {
    let history = api.get_task_history(parse_id(id)?)?;
    Ok(render::history(&history))
}
