//! Verify request building and response translation against the JSON test
//! vectors in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so field ordering
//! does not cause false negatives.

use serde_json::Value;
use taskboard_core::{
    ApiError, CreateTask, HttpMethod, HttpRequest, HttpResponse, Session, TaskClient, TaskStatus, UpdateTask,
};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080";

fn client() -> TaskClient {
    let mut session = Session::ephemeral();
    session.set_token("tok").unwrap();
    TaskClient::new(BASE_URL, session)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn build(c: &TaskClient, case: &Value) -> HttpRequest {
    let id = || -> Uuid { case["id"].as_str().unwrap().parse().unwrap() };
    match case["op"].as_str().unwrap() {
        "list" => {
            let status = case["status"].as_str().map(TaskStatus::from);
            c.build_list_tasks(status.as_ref(), case["include"].as_str())
        }
        "search" => c.build_search_tasks(case["query"].as_str().unwrap()),
        "create" => {
            let input: CreateTask = serde_json::from_value(case["input"].clone()).unwrap();
            c.build_create_task(&input).unwrap()
        }
        "update" => {
            let input: UpdateTask = serde_json::from_value(case["input"].clone()).unwrap();
            c.build_update_task(id(), &input).unwrap()
        }
        "delete" => c.build_delete_task(id()),
        "stats" => c.build_dashboard_stats(),
        "login" => c.build_login("a@b.c", "pw").unwrap(),
        other => panic!("unknown op: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];
        let req = build(&c, case);

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content-type");

        let auth = req.header("authorization");
        if expected["auth"].as_bool().unwrap() {
            assert_eq!(auth, Some("Bearer tok"), "{name}: authorization");
        } else {
            assert_eq!(auth, None, "{name}: authorization");
        }

        match req.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: body should be present"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn error_test_vectors() {
    let raw = include_str!("../../test-vectors/errors.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = HttpResponse::new(
            case["status"].as_u64().unwrap() as u16,
            case["body"].as_str().unwrap(),
        );
        let result = c.parse_list_tasks(response);

        match case.get("expected_error") {
            Some(expected) => {
                let err = result.unwrap_err();
                match expected["kind"].as_str().unwrap() {
                    "Http" => {
                        assert_eq!(
                            err.status(),
                            Some(expected["status"].as_u64().unwrap() as u16),
                            "{name}: status"
                        );
                        assert_eq!(err.to_string(), expected["message"].as_str().unwrap(), "{name}: message");
                    }
                    "Decode" => assert!(matches!(err, ApiError::Decode(_)), "{name}: expected Decode"),
                    other => panic!("{name}: unknown expected_error kind: {other}"),
                }
            }
            None => {
                let tasks = result.unwrap();
                assert_eq!(tasks.len() as u64, case["expected_len"].as_u64().unwrap(), "{name}: len");
            }
        }
    }
}

#[test]
fn delete_ignores_success_bodies() {
    let c = client();
    for (status, body) in [(204, ""), (200, ""), (200, "{}")] {
        assert!(c.parse_delete_task(HttpResponse::new(status, body)).is_ok(), "{status} {body:?}");
    }
}
