use serde::Serialize;

use crate::model::list::List;
use crate::model::task::Task;
use crate::util::unicode::{display_width, fit_to_width, truncate_to_width};

/// Widest task text shown before truncating
pub const TASK_TEXT_WIDTH: usize = 60;
/// Widest list name shown before truncating
pub const LIST_NAME_WIDTH: usize = 32;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub position: usize,
    pub id: String,
    pub text: String,
    pub done: bool,
}

#[derive(Serialize)]
pub struct ListSummaryJson {
    pub position: usize,
    pub id: String,
    pub name: String,
    pub active: bool,
    pub tasks: usize,
    pub done: usize,
}

#[derive(Serialize)]
pub struct ListTasksJson {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct DeletedJson {
    pub deleted: TaskJson,
    pub undo_ms: u64,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// `position` is 1-based
pub fn task_to_json(position: usize, task: &Task) -> TaskJson {
    TaskJson {
        position,
        id: task.id.clone(),
        text: task.text.clone(),
        done: task.done,
    }
}

pub fn list_summary_to_json(position: usize, list: &List, active: bool) -> ListSummaryJson {
    ListSummaryJson {
        position,
        id: list.id.clone(),
        name: list.name.clone(),
        active,
        tasks: list.tasks.len(),
        done: list.done_count(),
    }
}

pub fn list_tasks_to_json(list: &List, active: bool) -> ListTasksJson {
    ListTasksJson {
        id: list.id.clone(),
        name: list.name.clone(),
        active,
        tasks: list
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| task_to_json(i + 1, t))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// Column width for list names: the widest name, capped
pub fn list_name_column(lists: &[List]) -> usize {
    lists
        .iter()
        .map(|l| display_width(&l.name))
        .max()
        .unwrap_or(0)
        .min(LIST_NAME_WIDTH)
}

/// `*  1. Groceries  3 tasks, 1 done` (`*` marks the selected list)
pub fn format_list_line(position: usize, list: &List, active: bool, name_width: usize) -> String {
    let marker = if active { '*' } else { ' ' };
    format!(
        "{} {:>2}. {}  {}, {} done",
        marker,
        position,
        fit_to_width(&list.name, name_width),
        plural(list.tasks.len(), "task"),
        list.done_count()
    )
}

/// `Groceries (1/3 done)`
pub fn format_list_header(list: &List) -> String {
    format!(
        "{} ({}/{} done)",
        list.name,
        list.done_count(),
        list.tasks.len()
    )
}

/// ` 2. [x] Eggs  (3fa9c01b2e)`
pub fn format_task_line(position: usize, task: &Task) -> String {
    let check = if task.done { 'x' } else { ' ' };
    format!(
        "{:>2}. [{}] {}  ({})",
        position,
        check,
        truncate_to_width(&task.text, TASK_TEXT_WIDTH),
        task.id
    )
}

/// All task lines of a list, or a placeholder for an empty one
pub fn format_task_lines(list: &List) -> Vec<String> {
    if list.tasks.is_empty() {
        return vec!["    (no tasks)".to_string()];
    }
    list.tasks
        .iter()
        .enumerate()
        .map(|(i, t)| format_task_line(i + 1, t))
        .collect()
}
