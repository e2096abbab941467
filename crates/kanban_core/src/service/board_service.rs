//! Board engine use-case service.
//!
//! # Responsibility
//! - Own the single in-memory board collection for a session.
//! - Run every operation through the reducer, then persist as a side effect.
//! - Degrade to memory-only mode when durable storage is unavailable.
//!
//! # Invariants
//! - The in-memory collection is authoritative; a failed save never rolls it
//!   back.
//! - Saves happen only after commands that changed state.
//! - Storage failures are queued as warnings, never returned from mutations.

use crate::engine::command::{
    BoardCommand, ColumnPosition, DragEndEvent, MoveColumnCommand, MoveTaskCommand, TaskPosition,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::reducer::{apply, Outcome};
use crate::model::board::{Board, BoardCollection};
use crate::model::ids::{BoardId, ChecklistItemId, ColumnId, TaskId};
use crate::model::task::{Label, TaskPatch};
use crate::repo::board_store::{load_or_seed, BoardStore, StorageError};
use crate::search::filter::{project, FilterCriteria};
use log::{debug, error, info, warn};
use std::borrow::Cow;

/// Session facade over the board collection and its store.
pub struct BoardService<S: BoardStore> {
    state: BoardCollection,
    store: Option<S>,
    warnings: Vec<StorageError>,
}

impl<S: BoardStore> BoardService<S> {
    /// Loads the stored collection, or the first-run seed.
    ///
    /// Never fails. An unavailable store switches the session to memory-only
    /// mode; an unreadable payload is left untouched on disk and the session
    /// also runs memory-only. Both cases queue a storage warning.
    pub fn open(store: S) -> Self {
        match load_or_seed(&store) {
            Ok(state) => {
                info!(
                    "event=engine_open module=service status=ok boards={} memory_only=false",
                    state.len()
                );
                Self {
                    state,
                    store: Some(store),
                    warnings: Vec::new(),
                }
            }
            Err(err) => {
                warn!(
                    "event=engine_open module=service status=warn memory_only=true error={}",
                    err
                );
                Self {
                    state: BoardCollection::seed_default(),
                    store: None,
                    warnings: vec![err],
                }
            }
        }
    }

    /// Starts a session from an existing collection, persisting to `store`.
    pub fn with_collection(state: BoardCollection, store: S) -> Self {
        Self {
            state,
            store: Some(store),
            warnings: Vec::new(),
        }
    }

    /// Starts a session that never touches durable storage.
    pub fn memory_only(state: BoardCollection) -> Self {
        Self {
            state,
            store: None,
            warnings: Vec::new(),
        }
    }

    pub fn collection(&self) -> &BoardCollection {
        &self.state
    }

    pub fn boards(&self) -> &[Board] {
        self.state.boards()
    }

    pub fn active_board_id(&self) -> Option<&str> {
        self.state.active_board_id()
    }

    pub fn active_board(&self) -> Option<&Board> {
        self.state.active_board()
    }

    /// Active board projected through `criteria`.
    pub fn filtered_active_board(&self, criteria: &FilterCriteria) -> Option<Cow<'_, Board>> {
        self.state
            .active_board()
            .map(|board| project(board, criteria))
    }

    pub fn is_memory_only(&self) -> bool {
        self.store.is_none()
    }

    /// Drains storage warnings collected since the last call.
    pub fn take_storage_warnings(&mut self) -> Vec<StorageError> {
        std::mem::take(&mut self.warnings)
    }

    /// Applies one command, then persists if state changed.
    pub fn execute(&mut self, command: BoardCommand) -> EngineResult<Outcome> {
        let name = command.name();
        match apply(&mut self.state, command) {
            Ok(Outcome::Unchanged) => {
                debug!("event=command module=service status=noop command={name}");
                Ok(Outcome::Unchanged)
            }
            Ok(outcome) => {
                info!("event=command module=service status=ok command={name}");
                self.check_integrity();
                self.persist();
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    "event=command module=service status=error command={name} error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Writes the current collection now.
    ///
    /// # Errors
    /// - `EngineError::Storage` when the save fails or the session is
    ///   memory-only.
    pub fn flush(&self) -> EngineResult<()> {
        let Some(store) = &self.store else {
            return Err(StorageError::Unavailable("session is memory-only".to_string()).into());
        };
        store.save_collection(&self.state)?;
        Ok(())
    }

    pub fn create_board(&mut self, title: impl Into<String>) -> EngineResult<BoardId> {
        let outcome = self.execute(BoardCommand::CreateBoard {
            title: title.into(),
        })?;
        created_id(outcome)
    }

    /// Renames a board. Returns `false` for blank or identical titles.
    pub fn rename_board(&mut self, board_id: &str, title: impl Into<String>) -> EngineResult<bool> {
        self.execute(BoardCommand::RenameBoard {
            board_id: board_id.to_string(),
            title: title.into(),
        })
        .map(|outcome| outcome.is_change())
    }

    pub fn delete_board(&mut self, board_id: &str) -> EngineResult<()> {
        self.execute(BoardCommand::DeleteBoard {
            board_id: board_id.to_string(),
        })
        .map(drop)
    }

    pub fn set_active_board(&mut self, board_id: &str) -> EngineResult<()> {
        self.execute(BoardCommand::SetActiveBoard {
            board_id: board_id.to_string(),
        })
        .map(drop)
    }

    pub fn add_column(&mut self, title: impl Into<String>) -> EngineResult<ColumnId> {
        let outcome = self.execute(BoardCommand::AddColumn {
            title: title.into(),
        })?;
        created_id(outcome)
    }

    /// Renames a column. Returns `false` for blank or identical titles.
    pub fn rename_column(
        &mut self,
        column_id: &str,
        title: impl Into<String>,
    ) -> EngineResult<bool> {
        self.execute(BoardCommand::RenameColumn {
            column_id: column_id.to_string(),
            title: title.into(),
        })
        .map(|outcome| outcome.is_change())
    }

    pub fn delete_column(&mut self, column_id: &str) -> EngineResult<()> {
        self.execute(BoardCommand::DeleteColumn {
            column_id: column_id.to_string(),
        })
        .map(drop)
    }

    pub fn add_task(&mut self, column_id: &str, title: impl Into<String>) -> EngineResult<TaskId> {
        let outcome = self.execute(BoardCommand::AddTask {
            column_id: column_id.to_string(),
            title: title.into(),
        })?;
        created_id(outcome)
    }

    /// Deletes a task listed by `column_id`; the caller names the column.
    pub fn delete_task(&mut self, task_id: &str, column_id: &str) -> EngineResult<()> {
        self.execute(BoardCommand::DeleteTask {
            task_id: task_id.to_string(),
            column_id: column_id.to_string(),
        })
        .map(drop)
    }

    /// Merges `patch` into a task. Returns whether anything changed.
    pub fn update_task(&mut self, task_id: &str, patch: TaskPatch) -> EngineResult<bool> {
        self.execute(BoardCommand::UpdateTask {
            task_id: task_id.to_string(),
            patch,
        })
        .map(|outcome| outcome.is_change())
    }

    /// Stores the display form of a `yyyy-mm-dd` date.
    pub fn set_due_date(&mut self, task_id: &str, date: &str) -> EngineResult<bool> {
        self.execute(BoardCommand::SetDueDate {
            task_id: task_id.to_string(),
            date: date.to_string(),
        })
        .map(|outcome| outcome.is_change())
    }

    pub fn clear_due_date(&mut self, task_id: &str) -> EngineResult<bool> {
        self.update_task(task_id, TaskPatch::new().clear_due_date())
    }

    /// Toggles a label. Returns `true` when the label is attached afterwards.
    pub fn toggle_label(&mut self, task_id: &str, label: &Label) -> EngineResult<bool> {
        self.execute(BoardCommand::ToggleLabel {
            task_id: task_id.to_string(),
            label: label.clone(),
        })?;
        let attached = self
            .active_board()
            .and_then(|board| board.task(task_id))
            .is_some_and(|task| task.has_label(&label.id));
        Ok(attached)
    }

    pub fn add_checklist_item(
        &mut self,
        task_id: &str,
        text: impl Into<String>,
    ) -> EngineResult<ChecklistItemId> {
        let outcome = self.execute(BoardCommand::AddChecklistItem {
            task_id: task_id.to_string(),
            text: text.into(),
        })?;
        created_id(outcome)
    }

    pub fn toggle_checklist_item(&mut self, task_id: &str, item_id: &str) -> EngineResult<()> {
        self.execute(BoardCommand::ToggleChecklistItem {
            task_id: task_id.to_string(),
            item_id: item_id.to_string(),
        })
        .map(drop)
    }

    pub fn delete_checklist_item(&mut self, task_id: &str, item_id: &str) -> EngineResult<()> {
        self.execute(BoardCommand::DeleteChecklistItem {
            task_id: task_id.to_string(),
            item_id: item_id.to_string(),
        })
        .map(drop)
    }

    /// Moves a task; `destination == None` is a cancelled drag.
    pub fn move_task(
        &mut self,
        source: TaskPosition,
        destination: Option<TaskPosition>,
        task_id: &str,
    ) -> EngineResult<Outcome> {
        self.execute(BoardCommand::MoveTask(MoveTaskCommand {
            source,
            destination,
            task_id: task_id.to_string(),
        }))
    }

    /// Moves a column; `destination == None` is a cancelled drag.
    pub fn move_column(
        &mut self,
        source: ColumnPosition,
        destination: Option<ColumnPosition>,
        column_id: &str,
    ) -> EngineResult<Outcome> {
        self.execute(BoardCommand::MoveColumn(MoveColumnCommand {
            source,
            destination,
            column_id: column_id.to_string(),
        }))
    }

    /// Dispatches a drag-end event to `move_task` or `move_column`.
    pub fn handle_drag_end(&mut self, event: DragEndEvent) -> EngineResult<Outcome> {
        let command = BoardCommand::try_from(event)?;
        self.execute(command)
    }

    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.save_collection(&self.state) {
            Ok(()) => {}
            Err(err @ StorageError::Unavailable(_)) => {
                warn!(
                    "event=store_save module=service status=warn memory_only=true error={}",
                    err
                );
                self.store = None;
                self.warnings.push(err);
            }
            Err(err) => {
                warn!("event=store_save module=service status=warn error={}", err);
                self.warnings.push(err);
            }
        }
    }

    fn check_integrity(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for board in self.state.boards() {
            if let Err(err) = board.check_integrity() {
                error!(
                    "event=integrity_check module=service status=error board_id={} error={}",
                    board.id, err
                );
            }
        }
    }
}

fn created_id(outcome: Outcome) -> EngineResult<String> {
    match outcome {
        Outcome::Created(id) => Ok(id),
        other => Err(EngineError::invariant(format!(
            "expected a created id, got {other:?}"
        ))),
    }
}
