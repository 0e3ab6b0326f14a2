//! State derived from API results for display: overdue flags, the
//! four-column board, and bookkeeping for page-level fetches.

use std::cell::Cell;

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::types::{Task, TaskStatus};

/// A task is overdue when its due date has passed and it is not done.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.status != TaskStatus::Done && task.due_date.is_some_and(|due| due < now)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn label(&self) -> &str {
        self.status.label()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Tasks grouped into `todo`, `in_progress`, `review`, `done`, in that order.
/// Tasks with a status outside those four are kept in `unsorted`.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub columns: [Column; 4],
    pub unsorted: Vec<Task>,
}

impl Board {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut columns = TaskStatus::ALL.map(|status| Column {
            status,
            tasks: Vec::new(),
        });
        let mut unsorted = Vec::new();
        for task in tasks {
            match columns.iter_mut().find(|c| c.status == task.status) {
                Some(column) => column.tasks.push(task.clone()),
                None => unsorted.push(task.clone()),
            }
        }
        Self { columns, unsorted }
    }

    pub fn column(&self, status: &TaskStatus) -> Option<&Column> {
        self.columns.iter().find(|c| &c.status == status)
    }

    /// Total tasks on the board, unsorted included.
    pub fn len(&self) -> usize {
        self.columns.iter().map(Column::len).sum::<usize>() + self.unsorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generation number of a fetch started through [`Latest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Discards results of superseded fetches.
///
/// Call `begin` when a fetch starts and `accept` with its ticket when it
/// resolves; only the most recently issued ticket is accepted, so a slow
/// response for an old filter can no longer overwrite a newer one.
#[derive(Debug, Default)]
pub struct Latest {
    issued: Cell<u64>,
}

impl Latest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        let next = self.issued.get() + 1;
        self.issued.set(next);
        Ticket(next)
    }

    pub fn accept(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued.get()
    }
}

/// Local state of a page-level fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> ViewState<T> {
    /// `fallback` is shown when the error has no message of its own.
    pub fn from_result(result: Result<T, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(data) => ViewState::Ready(data),
            Err(err) => {
                let message = err.to_string();
                ViewState::Failed(if message.is_empty() { fallback.to_string() } else { message })
            }
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::types::Priority;

    fn task(title: &str, status: TaskStatus, due: Option<DateTime<Utc>>) -> Task {
        let created = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            status,
            priority: Priority::Medium,
            category: None,
            summary: None,
            creator_id: Uuid::nil(),
            assignee_id: None,
            due_date: due,
            estimated_hours: None,
            actual_hours: None,
            created_at: created,
            updated_at: created,
            creator: None,
            assignee: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn past_due_open_task_is_overdue() {
        let now = Utc::now();
        let t = task("late", TaskStatus::InProgress, Some(now - Duration::days(1)));
        assert!(is_overdue(&t, now));
    }

    #[test]
    fn done_task_is_never_overdue() {
        let now = Utc::now();
        let t = task("late", TaskStatus::Done, Some(now - Duration::days(365)));
        assert!(!is_overdue(&t, now));
    }

    #[test]
    fn future_or_missing_due_date_is_not_overdue() {
        let now = Utc::now();
        assert!(!is_overdue(&task("soon", TaskStatus::Todo, Some(now + Duration::hours(1))), now));
        assert!(!is_overdue(&task("someday", TaskStatus::Todo, None), now));
        assert!(!is_overdue(&task("exact", TaskStatus::Todo, Some(now)), now));
    }

    #[test]
    fn unknown_status_past_due_is_overdue() {
        let now = Utc::now();
        let t = task("x", TaskStatus::Unknown("blocked".into()), Some(now - Duration::days(1)));
        assert!(is_overdue(&t, now));
    }

    #[test]
    fn empty_board_has_four_empty_columns() {
        let board = Board::from_tasks(&[]);
        let labels: Vec<_> = board.columns.iter().map(Column::label).collect();
        assert_eq!(labels, ["To Do", "In Progress", "Review", "Done"]);
        assert!(board.columns.iter().all(Column::is_empty));
        assert!(board.is_empty());
    }

    #[test]
    fn board_partitions_every_task_once() {
        let tasks = vec![
            task("a", TaskStatus::Done, None),
            task("b", TaskStatus::Todo, None),
            task("c", TaskStatus::Review, None),
            task("d", TaskStatus::Todo, None),
            task("e", TaskStatus::Unknown("blocked".into()), None),
            task("f", TaskStatus::InProgress, None),
        ];
        let board = Board::from_tasks(&tasks);
        assert_eq!(board.len(), tasks.len());

        let mut seen: Vec<Uuid> = board
            .columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .chain(board.unsorted.iter())
            .map(|t| t.id)
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), tasks.len());

        let todo = board.column(&TaskStatus::Todo).unwrap();
        let titles: Vec<_> = todo.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["b", "d"]);
        assert!(board.columns.iter().all(|c| c.tasks.iter().all(|t| t.status == c.status)));
        assert_eq!(board.unsorted[0].title, "e");
    }

    #[test]
    fn only_latest_ticket_is_accepted() {
        let latest = Latest::new();
        let all = latest.begin();
        let done_only = latest.begin();
        assert!(!latest.accept(all));
        assert!(latest.accept(done_only));
        assert!(done_only > all);
    }

    #[test]
    fn view_state_carries_error_message() {
        let state: ViewState<()> = ViewState::from_result(
            Err(ApiError::from_status(404, r#"{"error":"task not found"}"#)),
            "Failed to load task",
        );
        assert_eq!(state, ViewState::Failed("task not found".to_string()));

        let state = ViewState::from_result(Ok(3), "unused");
        assert_eq!(state.data(), Some(&3));
    }
}
