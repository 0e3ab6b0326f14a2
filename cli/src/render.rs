use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use taskboard_core::{is_overdue, Board, DashboardStats, EditHistory, Priority, Task, TaskStatus};

const UNASSIGNED: &str = "Unassigned";

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn priority_color(priority: &Priority) -> Color {
    match priority {
        Priority::Low => Color::Grey,
        Priority::Medium => Color::Blue,
        Priority::High => Color::Yellow,
        Priority::Urgent => Color::Red,
        Priority::Unknown(_) => Color::Reset,
    }
}

fn status_color(status: &TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Grey,
        TaskStatus::InProgress => Color::Blue,
        TaskStatus::Review => Color::Magenta,
        TaskStatus::Done => Color::Green,
        TaskStatus::Unknown(_) => Color::Reset,
    }
}

fn due_text(task: &Task, now: DateTime<Utc>) -> String {
    match task.due_date {
        None => String::new(),
        Some(due) if is_overdue(task, now) => format!("{} (overdue)", due.format("%Y-%m-%d")),
        Some(due) => due.format("%Y-%m-%d").to_string(),
    }
}

pub fn tasks(tasks: &[Task], now: DateTime<Utc>) -> String {
    if tasks.is_empty() {
        return "No tasks".to_string();
    }
    let mut table = table();
    table.set_header(header(&["ID", "Title", "Status", "Priority", "Assignee", "Due"]));
    for t in tasks {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(t.status.label()).fg(status_color(&t.status)),
            Cell::new(t.priority.as_str()).fg(priority_color(&t.priority)),
            Cell::new(t.assignee_name().unwrap_or(UNASSIGNED)),
            Cell::new(due_text(t, now)).fg(if is_overdue(t, now) { Color::Red } else { Color::Reset }),
        ]);
    }
    table.to_string()
}

/// One column per status with a count in the header; each cell lists the
/// task titles, overdue ones marked with `!`.
pub fn board(board: &Board, now: DateTime<Utc>) -> String {
    let mut table = table();
    table.set_header(
        board
            .columns
            .iter()
            .map(|c| {
                Cell::new(format!("{} ({})", c.label(), c.len()))
                    .add_attribute(Attribute::Bold)
                    .fg(status_color(&c.status))
            })
            .collect::<Vec<_>>(),
    );
    table.add_row(board.columns.iter().map(|c| {
        if c.is_empty() {
            return Cell::new("No tasks").fg(Color::Grey);
        }
        let lines: Vec<String> = c
            .tasks
            .iter()
            .map(|t| {
                let flag = if is_overdue(t, now) { "! " } else { "" };
                format!("{flag}{} [{}]", t.title, t.priority)
            })
            .collect();
        Cell::new(lines.join("\n"))
    }));

    let mut out = table.to_string();
    if !board.unsorted.is_empty() {
        out.push_str("\nOther statuses:\n");
        for t in &board.unsorted {
            out.push_str(&format!("  {} [{}] {}\n", t.title, t.status, t.id));
        }
    }
    out
}

pub fn task_detail(task: &Task, now: DateTime<Utc>) -> String {
    let mut table = table();
    let hours = |h: Option<f64>| h.map(|h| format!("{h:.1}")).unwrap_or_default();
    let tags: Vec<&str> = task.tags.iter().map(|t| t.name.as_str()).collect();
    let rows = [
        ("ID", task.id.to_string()),
        ("Title", task.title.clone()),
        ("Description", task.description.clone().unwrap_or_default()),
        ("Status", task.status.label().to_string()),
        ("Priority", task.priority.label().to_string()),
        ("Category", task.category.clone().unwrap_or_default()),
        ("Summary", task.summary.clone().unwrap_or_default()),
        ("Creator", task.creator.as_ref().map(|u| u.name.clone()).unwrap_or_default()),
        ("Assignee", task.assignee_name().unwrap_or(UNASSIGNED).to_string()),
        ("Due", due_text(task, now)),
        ("Estimated hours", hours(task.estimated_hours)),
        ("Actual hours", hours(task.actual_hours)),
        ("Tags", tags.join(", ")),
        ("Created", task.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ("Updated", task.updated_at.format("%Y-%m-%d %H:%M").to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table.to_string()
}

pub fn stats(stats: &DashboardStats) -> String {
    let mut summary = table();
    summary.set_header(header(&["Total Tasks", "Completed", "In Progress", "Overdue"]));
    summary.add_row(vec![
        Cell::new(stats.total_tasks),
        Cell::new(stats.completed()).fg(Color::Green),
        Cell::new(stats.in_flight()).fg(Color::Magenta),
        Cell::new(stats.overdue_tasks).fg(Color::Red),
    ]);

    let mut breakdown = table();
    breakdown.set_header(header(&["By Status", "", "By Priority", ""]));
    let statuses: Vec<(String, u64)> = stats
        .by_status
        .iter()
        .map(|(k, v)| (TaskStatus::from(k.as_str()).label().to_string(), *v))
        .collect();
    let priorities: Vec<(String, u64)> = stats
        .by_priority
        .iter()
        .map(|(k, v)| (Priority::from(k.as_str()).label().to_string(), *v))
        .collect();
    for i in 0..statuses.len().max(priorities.len()) {
        let cell = |entry: Option<&(String, u64)>| match entry {
            Some((label, count)) => (Cell::new(label), Cell::new(count)),
            None => (Cell::new(""), Cell::new("")),
        };
        let (s_label, s_count) = cell(statuses.get(i));
        let (p_label, p_count) = cell(priorities.get(i));
        breakdown.add_row(vec![s_label, s_count, p_label, p_count]);
    }

    format!("{summary}\n{breakdown}")
}

pub fn history(entries: &[EditHistory]) -> String {
    if entries.is_empty() {
        return "No edits recorded".to_string();
    }
    let mut table = table();
    table.set_header(header(&["When", "Field", "From", "To", "By"]));
    for h in entries {
        table.add_row(vec![
            Cell::new(h.edited_at.format("%Y-%m-%d %H:%M")),
            Cell::new(&h.field_name),
            Cell::new(h.old_value.as_deref().unwrap_or("")),
            Cell::new(h.new_value.as_deref().unwrap_or("")),
            Cell::new(h.user_id),
        ]);
    }
    table.to_string()
}
