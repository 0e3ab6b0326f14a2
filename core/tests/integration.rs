//! End-to-end runs against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `TaskApi` over real
//! HTTP with `UreqTransport`. Catches drift between the client's wire types
//! and what the server actually sends.

use std::net::SocketAddr;

use taskboard_core::{
    is_overdue, ApiError, Board, CreateTask, MemoryTokenStore, Priority, Session, TaskApi, TaskClient, TaskStatus,
    TokenStore, UpdateTask, UreqTransport,
};
use uuid::Uuid;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn connect(addr: SocketAddr, store: MemoryTokenStore) -> TaskApi<UreqTransport> {
    let client = TaskClient::new(&format!("http://{addr}"), Session::new(store));
    TaskApi::new(client, UreqTransport::new())
}

#[test]
fn unauthenticated_requests_are_rejected() {
    let addr = start_server();
    let api = connect(addr, MemoryTokenStore::new());

    let err = api.get_tasks(None, None).unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "missing authorization header");
}

#[test]
fn login_persists_token_for_later_sessions() {
    let addr = start_server();
    let store = MemoryTokenStore::new();
    let mut api = connect(addr, store.clone());

    let login = api.login(mock_server::ADMIN_EMAIL, "any").unwrap();
    assert_eq!(login.user.id, mock_server::ADMIN_ID);
    assert_eq!(store.load().unwrap().as_deref(), Some(login.token.as_str()));

    // A fresh client hydrated from the same store is already authenticated.
    let session = Session::hydrate(store).unwrap();
    let reloaded = TaskApi::new(TaskClient::new(&format!("http://{addr}"), session), UreqTransport::new());
    assert!(reloaded.get_tasks(None, None).unwrap().is_empty());
}

#[test]
fn bad_credentials_surface_server_message() {
    let addr = start_server();
    let mut api = connect(addr, MemoryTokenStore::new());
    let err = api.login("nobody@example.com", "x").unwrap_err();
    assert_eq!(err.to_string(), "invalid credentials");
    assert!(!api.is_authenticated());
}

#[test]
fn crud_lifecycle() {
    let addr = start_server();
    let mut api = connect(addr, MemoryTokenStore::new());
    api.login(mock_server::ADMIN_EMAIL, "any").unwrap();

    // Step 1: list, should be empty.
    assert!(api.get_tasks(None, None).unwrap().is_empty());

    // Step 2: create.
    let input = CreateTask {
        priority: Some(Priority::High),
        assignee_id: Some(mock_server::MEMBER_ID),
        ..CreateTask::new("Integration test")
    };
    let created = api.create_task(&input).unwrap();
    assert_eq!(created.title, "Integration test");
    assert_eq!(created.status, TaskStatus::Todo);
    assert_eq!(created.priority, Priority::High);
    let id = created.id;

    // Step 3: get, with relations joined.
    let fetched = api.get_task(id).unwrap();
    assert_eq!(fetched.assignee_name(), Some("Dana Dev"));
    assert_eq!(fetched.creator.as_ref().map(|u| u.id), Some(mock_server::ADMIN_ID));

    // Step 4: partial update.
    let updated = api.update_task(id, &UpdateTask::status(TaskStatus::Done)).unwrap();
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.title, "Integration test");

    // Step 5: the status change shows up in the history.
    let history = api.get_task_history(id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].new_value.as_deref(), Some("done"));

    // Step 6: delete (204, nothing to decode).
    api.delete_task(id).unwrap();

    // Step 7: get after delete.
    let err = api.get_task(id).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "task not found");

    // Step 8: delete again.
    let err = api.delete_task(id).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));

    // Step 9: logout, then requests are anonymous again.
    api.logout().unwrap();
    assert!(api.get_tasks(None, None).unwrap_err().is_unauthorized());
}

#[test]
fn status_filter_returns_only_matching_tasks() {
    let addr = start_server();
    let mut api = connect(addr, MemoryTokenStore::new());
    api.login(mock_server::ADMIN_EMAIL, "any").unwrap();

    for (title, status) in [("a", TaskStatus::Done), ("b", TaskStatus::Todo), ("c", TaskStatus::Done)] {
        let input = CreateTask {
            status: Some(status),
            ..CreateTask::new(title)
        };
        api.create_task(&input).unwrap();
    }

    let done = api.get_tasks(Some(&TaskStatus::Done), None).unwrap();
    assert_eq!(done.len(), 2);
    assert!(done.iter().all(|t| t.status == TaskStatus::Done));

    let all = api.get_tasks(None, None).unwrap();
    let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["c", "b", "a"]);

    let board = Board::from_tasks(&all);
    assert_eq!(board.len(), 3);
    assert_eq!(board.column(&TaskStatus::Done).unwrap().len(), 2);
}

#[test]
fn search_and_stats() {
    let addr = start_server();
    let mut api = connect(addr, MemoryTokenStore::new());
    api.login(mock_server::ADMIN_EMAIL, "any").unwrap();

    let yesterday = chrono::Utc::now() - chrono::Duration::days(1);
    for (title, status) in [("Fix login crash", TaskStatus::Todo), ("Login audit", TaskStatus::Done)] {
        let input = CreateTask {
            status: Some(status),
            due_date: Some(yesterday),
            ..CreateTask::new(title)
        };
        api.create_task(&input).unwrap();
    }

    let hits = api.search_tasks("login crash").unwrap();
    assert_eq!(hits.len(), 1);
    assert!(is_overdue(&hits[0], chrono::Utc::now()));

    let stats = api.get_dashboard_stats().unwrap();
    assert_eq!(stats.total_tasks, 2);
    assert_eq!(stats.completed(), 1);
    assert_eq!(stats.overdue_tasks, 1);
}

#[test]
fn invalid_input_is_reported_by_server() {
    let addr = start_server();
    let mut api = connect(addr, MemoryTokenStore::new());
    api.login(mock_server::ADMIN_EMAIL, "any").unwrap();

    let err = api.create_task(&CreateTask::new("")).unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "title is required");

    let err = api
        .update_task(Uuid::new_v4(), &UpdateTask::status(TaskStatus::Review))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn unreachable_server_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let api = connect(addr, MemoryTokenStore::new());
    let err = api.get_dashboard_stats().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
