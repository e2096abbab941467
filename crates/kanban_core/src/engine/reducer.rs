//! The state-transition function for board collections.
//!
//! # Responsibility
//! - Apply one [`BoardCommand`] to a [`BoardCollection`].
//! - Implement the task and column reordering algorithms.
//!
//! # Invariants
//! - A rejected command leaves the collection exactly as it was: every
//!   command validates all of its inputs before writing anything.
//! - Task moves conserve the multiset of task IDs across all columns.
//! - Column deletion removes exactly the tasks that column listed.

use crate::engine::command::{BoardCommand, MoveColumnCommand, MoveTaskCommand};
use crate::engine::error::{EngineError, EngineResult, NotFoundError};
use crate::model::board::{Board, BoardCollection, Column};
use crate::model::task::{Label, Task, TaskPatch};
use crate::model::validation::format_due_date;

/// Result of a successfully applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A board, column, task or checklist item was created with this ID.
    Created(String),
    /// State changed.
    Applied,
    /// Valid command that did not change anything.
    Unchanged,
}

impl Outcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::Created(id) => Some(id),
            _ => None,
        }
    }
}

/// Applies `command` to `state`.
///
/// # Errors
/// - `Validation` for blank titles/text or malformed dates.
/// - `NotFound` for unknown boards, columns, tasks or checklist items.
/// - `InvariantViolation` for move input that does not match current state.
pub fn apply(state: &mut BoardCollection, command: BoardCommand) -> EngineResult<Outcome> {
    match command {
        BoardCommand::CreateBoard { title } => {
            let board = Board::new(title)?;
            let board_id = board.id.clone();
            state.push_board(board);
            Ok(Outcome::Created(board_id))
        }
        BoardCommand::RenameBoard { board_id, title } => {
            let board = state
                .board_mut(&board_id)
                .ok_or(NotFoundError::Board(board_id.clone()))?;
            Ok(rename(&mut board.title, &title))
        }
        BoardCommand::DeleteBoard { board_id } => {
            state
                .remove_board(&board_id)
                .ok_or(NotFoundError::Board(board_id))?;
            Ok(Outcome::Applied)
        }
        BoardCommand::SetActiveBoard { board_id } => {
            if state.active_board_id() == Some(board_id.as_str()) {
                return Ok(Outcome::Unchanged);
            }
            if !state.set_active(&board_id) {
                return Err(NotFoundError::Board(board_id).into());
            }
            Ok(Outcome::Applied)
        }
        BoardCommand::AddColumn { title } => {
            let column = Column::new(title)?;
            let board = active_board(state)?;
            let column_id = column.id.clone();
            board.push_column(column);
            Ok(Outcome::Created(column_id))
        }
        BoardCommand::RenameColumn { column_id, title } => {
            let board = active_board(state)?;
            let column = board
                .columns
                .get_mut(&column_id)
                .ok_or(NotFoundError::Column(column_id.clone()))?;
            Ok(rename(&mut column.title, &title))
        }
        BoardCommand::DeleteColumn { column_id } => delete_column(active_board(state)?, &column_id),
        BoardCommand::AddTask { column_id, title } => {
            let task = Task::new(title)?;
            let board = active_board(state)?;
            let column = board
                .columns
                .get_mut(&column_id)
                .ok_or(NotFoundError::Column(column_id.clone()))?;
            let task_id = task.id.clone();
            column.task_ids.push(task_id.clone());
            board.tasks.insert(task_id.clone(), task);
            Ok(Outcome::Created(task_id))
        }
        BoardCommand::DeleteTask { task_id, column_id } => {
            delete_task(active_board(state)?, &task_id, &column_id)
        }
        BoardCommand::UpdateTask { task_id, patch } => {
            update_task(active_board(state)?, &task_id, &patch)
        }
        BoardCommand::SetDueDate { task_id, date } => {
            let patch = TaskPatch::new().due_date(format_due_date(&date)?);
            update_task(active_board(state)?, &task_id, &patch)
        }
        BoardCommand::ToggleLabel { task_id, label } => {
            toggle_label(active_board(state)?, &task_id, &label)
        }
        BoardCommand::AddChecklistItem { task_id, text } => {
            let task = task_mut(active_board(state)?, &task_id)?;
            let item_id = task.add_checklist_item(text)?;
            Ok(Outcome::Created(item_id))
        }
        BoardCommand::ToggleChecklistItem { task_id, item_id } => {
            let task = task_mut(active_board(state)?, &task_id)?;
            task.toggle_checklist_item(&item_id)
                .ok_or(NotFoundError::ChecklistItem { task_id, item_id })?;
            Ok(Outcome::Applied)
        }
        BoardCommand::DeleteChecklistItem { task_id, item_id } => {
            let task = task_mut(active_board(state)?, &task_id)?;
            task.remove_checklist_item(&item_id)
                .ok_or(NotFoundError::ChecklistItem { task_id, item_id })?;
            Ok(Outcome::Applied)
        }
        BoardCommand::MoveTask(command) => move_task(state, &command),
        BoardCommand::MoveColumn(command) => move_column(state, &command),
    }
}

fn active_board(state: &mut BoardCollection) -> EngineResult<&mut Board> {
    state
        .active_board_mut()
        .ok_or_else(|| NotFoundError::NoActiveBoard.into())
}

fn task_mut<'a>(board: &'a mut Board, task_id: &str) -> EngineResult<&'a mut Task> {
    board
        .tasks
        .get_mut(task_id)
        .ok_or_else(|| NotFoundError::Task(task_id.to_string()).into())
}

/// Blank or identical titles are ignored rather than rejected.
fn rename(current: &mut String, requested: &str) -> Outcome {
    let trimmed = requested.trim();
    if trimmed.is_empty() || trimmed == current.as_str() {
        return Outcome::Unchanged;
    }
    *current = trimmed.to_string();
    Outcome::Applied
}

fn delete_column(board: &mut Board, column_id: &str) -> EngineResult<Outcome> {
    let column = board
        .columns
        .remove(column_id)
        .ok_or_else(|| NotFoundError::Column(column_id.to_string()))?;
    for task_id in &column.task_ids {
        board.tasks.remove(task_id);
    }
    board.column_order.retain(|id| id != column_id);
    Ok(Outcome::Applied)
}

fn delete_task(board: &mut Board, task_id: &str, column_id: &str) -> EngineResult<Outcome> {
    if !board.tasks.contains_key(task_id) {
        return Err(NotFoundError::Task(task_id.to_string()).into());
    }
    let column = board
        .columns
        .get_mut(column_id)
        .ok_or_else(|| NotFoundError::Column(column_id.to_string()))?;
    let position = column
        .task_ids
        .iter()
        .position(|id| id == task_id)
        .ok_or_else(|| NotFoundError::TaskNotInColumn {
            task_id: task_id.to_string(),
            column_id: column_id.to_string(),
        })?;

    column.task_ids.remove(position);
    board.tasks.remove(task_id);
    Ok(Outcome::Applied)
}

fn update_task(board: &mut Board, task_id: &str, patch: &TaskPatch) -> EngineResult<Outcome> {
    let task = task_mut(board, task_id)?;
    if patch.is_empty() {
        return Ok(Outcome::Unchanged);
    }
    if task.apply_patch(patch)? {
        Ok(Outcome::Applied)
    } else {
        Ok(Outcome::Unchanged)
    }
}

fn toggle_label(board: &mut Board, task_id: &str, label: &Label) -> EngineResult<Outcome> {
    task_mut(board, task_id)?.toggle_label(label);
    Ok(Outcome::Applied)
}

/// Moves one task ID between (or within) column lists.
///
/// Steps:
/// 1. No destination: drag cancelled, nothing to do.
/// 2. Same column and index: nothing to do.
/// 3. Same column: splice out at `source.index`, then splice in at
///    `destination.index` of the shortened list.
/// 4. Different columns: splice out of the source list, splice into the
///    destination list. The task record itself is never touched.
fn move_task(state: &mut BoardCollection, command: &MoveTaskCommand) -> EngineResult<Outcome> {
    let Some(destination) = &command.destination else {
        return Ok(Outcome::Unchanged);
    };
    let source = &command.source;
    if destination == source {
        return Ok(Outcome::Unchanged);
    }

    let board = active_board(state)?;
    let same_column = source.column_id == destination.column_id;

    let source_ids = &board
        .columns
        .get(&source.column_id)
        .ok_or_else(|| {
            EngineError::invariant(format!("move source column {} not found", source.column_id))
        })?
        .task_ids;
    match source_ids.get(source.index) {
        Some(id) if *id == command.task_id => {}
        Some(id) => {
            return Err(EngineError::invariant(format!(
                "column {} holds {id} at index {}, not {}",
                source.column_id, source.index, command.task_id
            )));
        }
        None => {
            return Err(EngineError::invariant(format!(
                "source index {} out of bounds for column {} (len {})",
                source.index,
                source.column_id,
                source_ids.len()
            )));
        }
    }

    let destination_len = board
        .columns
        .get(&destination.column_id)
        .ok_or_else(|| {
            EngineError::invariant(format!(
                "move destination column {} not found",
                destination.column_id
            ))
        })?
        .task_ids
        .len();
    let max_index = if same_column {
        destination_len - 1
    } else {
        destination_len
    };
    if destination.index > max_index {
        return Err(EngineError::invariant(format!(
            "destination index {} out of bounds for column {} (max {max_index})",
            destination.index, destination.column_id
        )));
    }

    let moved = column_ids_mut(board, &source.column_id)?.remove(source.index);
    column_ids_mut(board, &destination.column_id)?.insert(destination.index, moved);
    Ok(Outcome::Applied)
}

fn column_ids_mut<'a>(board: &'a mut Board, column_id: &str) -> EngineResult<&'a mut Vec<String>> {
    board
        .columns
        .get_mut(column_id)
        .map(|column| &mut column.task_ids)
        .ok_or_else(|| EngineError::invariant(format!("column {column_id} not found")))
}

/// Splices one column ID out of `column_order` and back in at the
/// destination index.
fn move_column(
    state: &mut BoardCollection,
    command: &MoveColumnCommand,
) -> EngineResult<Outcome> {
    let Some(destination) = command.destination else {
        return Ok(Outcome::Unchanged);
    };
    let source = command.source;
    if destination.index == source.index {
        return Ok(Outcome::Unchanged);
    }

    let board = active_board(state)?;
    let len = board.column_order.len();
    match board.column_order.get(source.index) {
        Some(id) if *id == command.column_id => {}
        Some(id) => {
            return Err(EngineError::invariant(format!(
                "column order holds {id} at index {}, not {}",
                source.index, command.column_id
            )));
        }
        None => {
            return Err(EngineError::invariant(format!(
                "source index {} out of bounds for column order (len {len})",
                source.index
            )));
        }
    }
    if destination.index >= len {
        return Err(EngineError::invariant(format!(
            "destination index {} out of bounds for column order (len {len})",
            destination.index
        )));
    }

    let moved = board.column_order.remove(source.index);
    board.column_order.insert(destination.index, moved);
    Ok(Outcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::{apply, Outcome};
    use crate::engine::command::{
        BoardCommand, ColumnPosition, MoveColumnCommand, MoveTaskCommand, TaskPosition,
    };
    use crate::engine::error::EngineError;
    use crate::model::board::{Board, BoardCollection};

    fn two_task_state() -> BoardCollection {
        let mut state = BoardCollection::new(vec![Board::seed_default()]);
        apply(
            &mut state,
            BoardCommand::AddTask {
                column_id: "col-1".to_string(),
                title: "Second".to_string(),
            },
        )
        .unwrap();
        state
    }

    fn move_task(from: (&str, usize), to: Option<(&str, usize)>, task_id: &str) -> BoardCommand {
        BoardCommand::MoveTask(MoveTaskCommand {
            source: TaskPosition::new(from.0, from.1),
            destination: to.map(|(column_id, index)| TaskPosition::new(column_id, index)),
            task_id: task_id.to_string(),
        })
    }

    #[test]
    fn same_column_move_removes_before_inserting() {
        let mut state = two_task_state();
        let second = state.active_board().unwrap().columns["col-1"].task_ids[1].clone();

        let outcome = apply(&mut state, move_task(("col-1", 1), Some(("col-1", 0)), &second)).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        let ids = &state.active_board().unwrap().columns["col-1"].task_ids;
        assert_eq!(ids, &vec![second, "task-1".to_string()]);
    }

    #[test]
    fn same_column_move_to_last_slot_is_allowed() {
        let mut state = two_task_state();
        apply(&mut state, move_task(("col-1", 0), Some(("col-1", 1)), "task-1")).unwrap();
        let ids = &state.active_board().unwrap().columns["col-1"].task_ids;
        assert_eq!(ids[1], "task-1");
    }

    #[test]
    fn same_column_move_past_end_is_rejected() {
        let mut state = two_task_state();
        let before = state.clone();
        let err = apply(&mut state, move_task(("col-1", 0), Some(("col-1", 2)), "task-1")).unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn mismatched_dragged_id_is_rejected() {
        let mut state = two_task_state();
        let before = state.clone();
        let err = apply(&mut state, move_task(("col-1", 1), Some(("col-2", 0)), "task-1")).unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn cancelled_drag_is_unchanged() {
        let mut state = two_task_state();
        let outcome = apply(&mut state, move_task(("col-1", 0), None, "task-1")).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn move_column_reorders_and_validates() {
        let mut state = BoardCollection::new(vec![Board::seed_default()]);
        let outcome = apply(
            &mut state,
            BoardCommand::MoveColumn(MoveColumnCommand {
                source: ColumnPosition { index: 0 },
                destination: Some(ColumnPosition { index: 2 }),
                column_id: "col-1".to_string(),
            }),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(
            state.active_board().unwrap().column_order,
            vec!["col-2", "col-3", "col-1"]
        );

        let err = apply(
            &mut state,
            BoardCommand::MoveColumn(MoveColumnCommand {
                source: ColumnPosition { index: 0 },
                destination: Some(ColumnPosition { index: 3 }),
                column_id: "col-2".to_string(),
            }),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation(_)));
    }

    #[test]
    fn column_commands_without_boards_report_no_active_board() {
        let mut state = BoardCollection::default();
        let err = apply(
            &mut state,
            BoardCommand::AddColumn {
                title: "Backlog".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
