//! Board, column and board-collection records.
//!
//! # Responsibility
//! - Define the normalized board shape (ID-keyed maps plus `column_order`).
//! - Provide seed construction, normalization and integrity checks.
//!
//! # Invariants
//! - `column_order` lists every key of `columns` exactly once.
//! - Every task is listed by exactly one column.
//! - A non-empty collection always has an active board that it contains.

use crate::model::ids::{generate_id, BoardId, ColumnId, TaskId, BOARD_PREFIX, COLUMN_PREFIX};
use crate::model::task::{Priority, Task};
use crate::model::validation::{normalize_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Named, ordered bucket of task references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
}

impl Column {
    /// Creates an empty column with a generated ID.
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_id(generate_id(COLUMN_PREFIX), title)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: id.into(),
            title: normalize_text(title, ValidationError::BlankColumnTitle)?,
            task_ids: Vec::new(),
        })
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.task_ids.iter().any(|id| id == task_id)
    }
}

/// One kanban workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub tasks: BTreeMap<TaskId, Task>,
    #[serde(default)]
    pub columns: BTreeMap<ColumnId, Column>,
    #[serde(default)]
    pub column_order: Vec<ColumnId>,
}

impl Board {
    /// Creates a board with the two seed columns and no tasks.
    ///
    /// Seed column IDs are fixed (`col-1`, `col-2`); column IDs are scoped to
    /// their board.
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_id(generate_id(BOARD_PREFIX), title)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Result<Self, ValidationError> {
        let title = normalize_text(title, ValidationError::BlankBoardTitle)?;
        let mut board = Self {
            id: id.into(),
            title,
            tasks: BTreeMap::new(),
            columns: BTreeMap::new(),
            column_order: Vec::new(),
        };
        board.push_column(Column::with_id("col-1", "To Do")?);
        board.push_column(Column::with_id("col-2", "In Progress")?);
        Ok(board)
    }

    /// First-run board shown before anything has been stored.
    pub fn seed_default() -> Self {
        let welcome = Task {
            id: "task-1".to_string(),
            title: "Welcome to your Kanban!".to_string(),
            description: "This is a sample task.".to_string(),
            priority: Priority::Low,
            labels: Vec::new(),
            checklists: Vec::new(),
            due_date: None,
        };

        let mut board = Self {
            id: "board-1".to_string(),
            title: "Default".to_string(),
            tasks: BTreeMap::new(),
            columns: BTreeMap::new(),
            column_order: Vec::new(),
        };
        for (id, title) in [("col-1", "To Do"), ("col-2", "In Progress"), ("col-3", "Done")] {
            board.push_column(Column {
                id: id.to_string(),
                title: title.to_string(),
                task_ids: Vec::new(),
            });
        }
        if let Some(todo) = board.columns.get_mut("col-1") {
            todo.task_ids.push(welcome.id.clone());
        }
        board.tasks.insert(welcome.id.clone(), welcome);
        board
    }

    pub(crate) fn push_column(&mut self, column: Column) {
        self.column_order.push(column.id.clone());
        self.columns.insert(column.id.clone(), column);
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.get(column_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// Columns in display order.
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.column_order
            .iter()
            .filter_map(|column_id| self.columns.get(column_id))
    }

    /// Tasks of one column in display order.
    pub fn column_tasks<'a>(&'a self, column_id: &str) -> Vec<&'a Task> {
        self.columns
            .get(column_id)
            .map(|column| {
                column
                    .task_ids
                    .iter()
                    .filter_map(|task_id| self.tasks.get(task_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the ID of the column listing `task_id`.
    pub fn column_of(&self, task_id: &str) -> Option<&ColumnId> {
        self.ordered_columns()
            .find(|column| column.contains(task_id))
            .map(|column| &column.id)
    }

    /// Repairs a board loaded from storage so every invariant holds.
    ///
    /// Returns the number of repairs made; `0` means the board was already
    /// consistent.
    pub fn normalize(&mut self) -> usize {
        let mut repairs = 0;

        for (key, task) in self.tasks.iter_mut() {
            if task.id != *key {
                task.id = key.clone();
                repairs += 1;
            }
        }
        for (key, column) in self.columns.iter_mut() {
            if column.id != *key {
                column.id = key.clone();
                repairs += 1;
            }
        }

        let mut seen_columns = HashSet::new();
        let before = self.column_order.len();
        let columns = &self.columns;
        self.column_order
            .retain(|column_id| columns.contains_key(column_id) && seen_columns.insert(column_id.clone()));
        repairs += before - self.column_order.len();

        let missing: Vec<ColumnId> = self
            .columns
            .keys()
            .filter(|column_id| !seen_columns.contains(*column_id))
            .cloned()
            .collect();
        repairs += missing.len();
        self.column_order.extend(missing);

        let mut listed: HashSet<TaskId> = HashSet::new();
        for column_id in self.column_order.clone() {
            let Some(column) = self.columns.get_mut(&column_id) else {
                continue;
            };
            let before = column.task_ids.len();
            let tasks = &self.tasks;
            column
                .task_ids
                .retain(|task_id| tasks.contains_key(task_id) && listed.insert(task_id.clone()));
            repairs += before - column.task_ids.len();
        }

        let before = self.tasks.len();
        self.tasks.retain(|task_id, _| listed.contains(task_id));
        repairs += before - self.tasks.len();

        repairs
    }

    /// Verifies the board invariants without modifying anything.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let mut order_seen = HashSet::new();
        for column_id in &self.column_order {
            if !self.columns.contains_key(column_id) {
                return Err(IntegrityError::UnknownColumnInOrder(column_id.clone()));
            }
            if !order_seen.insert(column_id) {
                return Err(IntegrityError::DuplicateColumnInOrder(column_id.clone()));
            }
        }
        if let Some(column_id) = self.columns.keys().find(|id| !order_seen.contains(id)) {
            return Err(IntegrityError::ColumnMissingFromOrder(column_id.clone()));
        }

        let mut owner: HashMap<&str, &str> = HashMap::new();
        for column in self.ordered_columns() {
            for task_id in &column.task_ids {
                if !self.tasks.contains_key(task_id) {
                    return Err(IntegrityError::DanglingTaskId {
                        column_id: column.id.clone(),
                        task_id: task_id.clone(),
                    });
                }
                if let Some(first) = owner.insert(task_id.as_str(), column.id.as_str()) {
                    return Err(IntegrityError::DuplicateMembership {
                        task_id: task_id.clone(),
                        first_column: first.to_string(),
                        second_column: column.id.clone(),
                    });
                }
            }
        }
        if let Some(task_id) = self.tasks.keys().find(|id| !owner.contains_key(id.as_str())) {
            return Err(IntegrityError::OrphanTask(task_id.clone()));
        }

        Ok(())
    }
}

/// First invariant violation found by [`Board::check_integrity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    UnknownColumnInOrder(ColumnId),
    DuplicateColumnInOrder(ColumnId),
    ColumnMissingFromOrder(ColumnId),
    DanglingTaskId {
        column_id: ColumnId,
        task_id: TaskId,
    },
    DuplicateMembership {
        task_id: TaskId,
        first_column: ColumnId,
        second_column: ColumnId,
    },
    OrphanTask(TaskId),
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownColumnInOrder(id) => write!(f, "column order lists unknown column {id}"),
            Self::DuplicateColumnInOrder(id) => {
                write!(f, "column order lists column {id} more than once")
            }
            Self::ColumnMissingFromOrder(id) => write!(f, "column {id} missing from column order"),
            Self::DanglingTaskId { column_id, task_id } => {
                write!(f, "column {column_id} lists unknown task {task_id}")
            }
            Self::DuplicateMembership {
                task_id,
                first_column,
                second_column,
            } => write!(
                f,
                "task {task_id} listed by both {first_column} and {second_column}"
            ),
            Self::OrphanTask(id) => write!(f, "task {id} is not listed by any column"),
        }
    }
}

impl Error for IntegrityError {}

/// Ordered boards plus the active-board pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardCollection {
    boards: Vec<Board>,
    active_board_id: Option<BoardId>,
}

impl BoardCollection {
    /// Builds a collection that activates the first board.
    pub fn new(boards: Vec<Board>) -> Self {
        Self::with_active(boards, None)
    }

    /// Builds a collection with a preferred active board.
    ///
    /// Falls back to the first board when `active` is absent or names a board
    /// that is not in `boards`.
    pub fn with_active(boards: Vec<Board>, active: Option<BoardId>) -> Self {
        let mut collection = Self {
            boards,
            active_board_id: active,
        };
        collection.repair_active();
        collection
    }

    /// Collection shown on first run: just [`Board::seed_default`].
    pub fn seed_default() -> Self {
        Self::new(vec![Board::seed_default()])
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn active_board_id(&self) -> Option<&str> {
        self.active_board_id.as_deref()
    }

    pub fn board(&self, board_id: &str) -> Option<&Board> {
        self.boards.iter().find(|board| board.id == board_id)
    }

    pub fn active_board(&self) -> Option<&Board> {
        self.active_board_id
            .as_deref()
            .and_then(|board_id| self.board(board_id))
    }

    pub(crate) fn board_mut(&mut self, board_id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|board| board.id == board_id)
    }

    pub(crate) fn active_board_mut(&mut self) -> Option<&mut Board> {
        let board_id = self.active_board_id.clone()?;
        self.board_mut(&board_id)
    }

    pub(crate) fn push_board(&mut self, board: Board) {
        self.active_board_id = Some(board.id.clone());
        self.boards.push(board);
    }

    /// Removes a board and keeps the active pointer valid.
    pub(crate) fn remove_board(&mut self, board_id: &str) -> Option<Board> {
        let position = self.boards.iter().position(|board| board.id == board_id)?;
        let removed = self.boards.remove(position);
        self.repair_active();
        Some(removed)
    }

    pub(crate) fn set_active(&mut self, board_id: &str) -> bool {
        if self.board(board_id).is_none() {
            return false;
        }
        self.active_board_id = Some(board_id.to_string());
        true
    }

    fn repair_active(&mut self) {
        let valid = self
            .active_board_id
            .as_deref()
            .is_some_and(|id| self.boards.iter().any(|board| board.id == id));
        if !valid {
            self.active_board_id = self.boards.first().map(|board| board.id.clone());
        }
    }
}
