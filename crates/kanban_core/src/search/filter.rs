//! Search and priority filter projection over one board.
//!
//! # Responsibility
//! - Derive a reduced board that keeps only tasks matching the criteria.
//!
//! # Invariants
//! - The input board is never modified.
//! - `column_order` and column titles are preserved; only `task_ids` shrink,
//!   keeping their relative order.
//! - With no active filter the input board is returned borrowed, unchanged.

use crate::model::board::Board;
use crate::model::task::{Priority, Task};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Filter selection. `Default` means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive title substring, matched as typed.
    pub query: String,
    pub priority: Option<Priority>,
}

impl FilterCriteria {
    pub fn new(query: impl Into<String>, priority: Option<Priority>) -> Self {
        Self {
            query: query.into(),
            priority,
        }
    }

    pub fn query(query: impl Into<String>) -> Self {
        Self::new(query, None)
    }

    pub fn priority(priority: Priority) -> Self {
        Self::new(String::new(), Some(priority))
    }

    /// Returns whether these criteria keep every task.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.priority.is_none()
    }

    /// Returns whether `task` passes both the text and the priority filter.
    pub fn matches(&self, task: &Task) -> bool {
        let text_ok = self.query.is_empty()
            || task
                .title
                .to_lowercase()
                .contains(&self.query.to_lowercase());
        let priority_ok = self.priority.map_or(true, |priority| task.priority == priority);
        text_ok && priority_ok
    }
}

/// Projects `board` through `criteria`.
///
/// Returns `Cow::Borrowed(board)` when `criteria` is empty, otherwise an owned
/// board containing only matching tasks.
pub fn project<'a>(board: &'a Board, criteria: &FilterCriteria) -> Cow<'a, Board> {
    if criteria.is_empty() {
        return Cow::Borrowed(board);
    }

    let tasks = board
        .tasks
        .iter()
        .filter(|(_, task)| criteria.matches(task))
        .map(|(task_id, task)| (task_id.clone(), task.clone()))
        .collect::<BTreeMap<_, _>>();

    let columns = board
        .columns
        .iter()
        .map(|(column_id, column)| {
            let mut column = column.clone();
            column.task_ids.retain(|task_id| tasks.contains_key(task_id));
            (column_id.clone(), column)
        })
        .collect();

    Cow::Owned(Board {
        id: board.id.clone(),
        title: board.title.clone(),
        tasks,
        columns,
        column_order: board.column_order.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::{project, FilterCriteria};
    use crate::model::board::Board;
    use crate::model::task::{Priority, Task};
    use std::borrow::Cow;

    #[test]
    fn whitespace_query_is_an_active_filter() {
        let board = Board::seed_default();
        let filtered = project(&board, &FilterCriteria::query("   "));
        assert!(matches!(filtered, Cow::Owned(_)));
        assert!(filtered.tasks.is_empty());
    }

    #[test]
    fn matching_is_case_insensitive_and_keeps_surrounding_spaces() {
        let task = Task::new("Design UI").unwrap();
        assert!(FilterCriteria::query("dESIGN").matches(&task));
        assert!(FilterCriteria::query("n u").matches(&task));
        assert!(!FilterCriteria::query("ui ").matches(&task));
        assert!(!FilterCriteria::query("setup").matches(&task));
    }

    #[test]
    fn priority_and_query_must_both_match() {
        let mut task = Task::new("Design UI").unwrap();
        task.priority = Priority::High;
        assert!(FilterCriteria::new("design", Some(Priority::High)).matches(&task));
        assert!(!FilterCriteria::new("design", Some(Priority::Low)).matches(&task));
    }
}
