//! Typed client core for the task-management API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values (host-does-IO
//! pattern); `TaskApi` pairs that with a `Transport` to expose one call per
//! API operation. `view` derives what dashboards display from the results.
//!
//! # Design
//! - `TaskClient` owns the `Session`; the bearer token is never global.
//! - Every failure is an `ApiError` variant: transport, HTTP status, decode,
//!   encode or token storage. Nothing is retried.
//! - Status and priority decode leniently so unknown values stay displayable.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;
pub mod view;

pub use api::TaskApi;
pub use client::TaskClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use transport::{Transport, UreqTransport};
pub use types::{
    CreateTask, DashboardStats, EditHistory, LoginResponse, LoginUser, Priority, Tag, Task, TaskStatus,
    UpdateTask, User,
};
pub use view::{is_overdue, Board, Column, Latest, Ticket, ViewState};
