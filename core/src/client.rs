//! Request builder and response parser for the task API.
//!
//! # Design
//! `TaskClient` holds the base URL and the `Session`. Each operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`; the I/O in between belongs to a
//! `Transport`. Only `parse_login` and `logout` touch the session.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{encode_component, encode_form, HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::types::{
    CreateTask, DashboardStats, EditHistory, LoginRequest, LoginResponse, Task, TaskStatus, UpdateTask,
};

#[derive(Debug)]
pub struct TaskClient {
    base_url: String,
    session: Session,
}

impl TaskClient {
    pub fn new(base_url: &str, session: Session) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// Login is a public route, so no bearer token is attached.
    pub fn build_login(&self, email: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let body = encode_body(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url("/api/auth/login"),
            headers: json_headers(),
            body: Some(body),
        })
    }

    /// Decode the login payload and adopt its token for later requests.
    pub fn parse_login(&mut self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        let login: LoginResponse = decode(response)?;
        self.session.set_token(login.token.as_str())?;
        debug!(user = %login.user.id, "logged in");
        Ok(login)
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.session.clear()
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// `status` and `include` become query parameters only when given.
    pub fn build_list_tasks(&self, status: Option<&TaskStatus>, include: Option<&str>) -> HttpRequest {
        let mut params = Vec::new();
        if let Some(status) = status {
            params.push(("status", status.as_str()));
        }
        if let Some(include) = include.filter(|i| !i.is_empty()) {
            params.push(("include", include));
        }
        let path = if params.is_empty() {
            "/api/tasks".to_string()
        } else {
            format!("/api/tasks?{}", encode_form(&params))
        };
        self.authed(HttpMethod::Get, &path, None)
    }

    pub fn build_get_task(&self, id: Uuid) -> HttpRequest {
        self.authed(HttpMethod::Get, &format!("/api/tasks/{id}"), None)
    }

    pub fn build_create_task(&self, input: &CreateTask) -> Result<HttpRequest, ApiError> {
        let body = encode_body(input)?;
        Ok(self.authed(HttpMethod::Post, "/api/tasks", Some(body)))
    }

    pub fn build_update_task(&self, id: Uuid, input: &UpdateTask) -> Result<HttpRequest, ApiError> {
        let body = encode_body(input)?;
        Ok(self.authed(HttpMethod::Put, &format!("/api/tasks/{id}"), Some(body)))
    }

    pub fn build_delete_task(&self, id: Uuid) -> HttpRequest {
        self.authed(HttpMethod::Delete, &format!("/api/tasks/{id}"), None)
    }

    pub fn build_search_tasks(&self, query: &str) -> HttpRequest {
        let path = format!("/api/tasks/search?q={}", encode_component(query));
        self.authed(HttpMethod::Get, &path, None)
    }

    pub fn build_task_history(&self, id: Uuid) -> HttpRequest {
        self.authed(HttpMethod::Get, &format!("/api/tasks/{id}/history"), None)
    }

    pub fn build_dashboard_stats(&self) -> HttpRequest {
        self.authed(HttpMethod::Get, "/api/dashboard/stats", None)
    }

    /// Tasks come back in server order; nothing is re-sorted here.
    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        decode(response)
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        decode(response)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        decode(response)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        decode(response)
    }

    /// Any 2xx is success; the body is never decoded.
    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_search_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        decode(response)
    }

    pub fn parse_task_history(&self, response: HttpResponse) -> Result<Vec<EditHistory>, ApiError> {
        decode(response)
    }

    pub fn parse_dashboard_stats(&self, response: HttpResponse) -> Result<DashboardStats, ApiError> {
        decode(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = json_headers();
        if let Some(token) = self.session.token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        let request = HttpRequest {
            method,
            url: self.url(path),
            headers,
            body,
        };
        debug!(method = %request.method, url = %request.url, "request built");
        request
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn encode_body<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Encode(e.to_string()))
}

/// Map a non-2xx status to `ApiError::Http`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let err = ApiError::from_status(response.status, &response.body);
    warn!(status = response.status, error = %err, "request failed");
    Err(err)
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| {
        warn!(status = response.status, error = %e, "undecodable response body");
        ApiError::Decode(e.to_string())
    })
}
