//! The operation surface views call: build, execute, parse.

use uuid::Uuid;

use crate::client::TaskClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::{FileTokenStore, Session};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    CreateTask, DashboardStats, EditHistory, LoginResponse, Task, TaskStatus, UpdateTask,
};

#[derive(Debug)]
pub struct TaskApi<T> {
    client: TaskClient,
    transport: T,
}

impl TaskApi<UreqTransport> {
    /// Hydrate the session from the configured token file and talk HTTP.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let session = Session::hydrate(FileTokenStore::new(&config.token_file))?;
        Ok(Self::new(TaskClient::new(&config.api_url, session), UreqTransport::new()))
    }
}

impl<T: Transport> TaskApi<T> {
    pub fn new(client: TaskClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TaskClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = self.client.build_login(email, password)?;
        let response = self.transport.execute(&request)?;
        self.client.parse_login(response)
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.client.logout()
    }

    pub fn get_tasks(&self, status: Option<&TaskStatus>, include: Option<&str>) -> Result<Vec<Task>, ApiError> {
        let response = self.transport.execute(&self.client.build_list_tasks(status, include))?;
        self.client.parse_list_tasks(response)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Task, ApiError> {
        let response = self.transport.execute(&self.client.build_get_task(id))?;
        self.client.parse_get_task(response)
    }

    pub fn create_task(&self, input: &CreateTask) -> Result<Task, ApiError> {
        let response = self.transport.execute(&self.client.build_create_task(input)?)?;
        self.client.parse_create_task(response)
    }

    pub fn update_task(&self, id: Uuid, input: &UpdateTask) -> Result<Task, ApiError> {
        let response = self.transport.execute(&self.client.build_update_task(id, input)?)?;
        self.client.parse_update_task(response)
    }

    pub fn delete_task(&self, id: Uuid) -> Result<(), ApiError> {
        let response = self.transport.execute(&self.client.build_delete_task(id))?;
        self.client.parse_delete_task(response)
    }

    pub fn search_tasks(&self, query: &str) -> Result<Vec<Task>, ApiError> {
        let response = self.transport.execute(&self.client.build_search_tasks(query))?;
        self.client.parse_search_tasks(response)
    }

    pub fn get_task_history(&self, id: Uuid) -> Result<Vec<EditHistory>, ApiError> {
        let response = self.transport.execute(&self.client.build_task_history(id))?;
        self.client.parse_task_history(response)
    }

    pub fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let response = self.transport.execute(&self.client.build_dashboard_stats())?;
        self.client.parse_dashboard_stats(response)
    }
}
