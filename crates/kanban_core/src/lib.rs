//! Core state engine for a single-user kanban board.
//! Boards, columns, tasks and their invariants live here; rendering does not.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::command::{
    BoardCommand, ColumnPosition, DragEndEvent, DragKind, DragLocation, MoveColumnCommand,
    MoveTaskCommand, TaskPosition,
};
pub use engine::error::{EngineError, EngineResult, NotFoundError};
pub use engine::reducer::{apply, Outcome};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::board::{Board, BoardCollection, Column, IntegrityError};
pub use model::ids::{BoardId, ChecklistItemId, ColumnId, LabelId, TaskId};
pub use model::task::{
    default_labels, ChecklistItem, ChecklistProgress, Label, Priority, Task, TaskPatch,
};
pub use model::validation::{format_due_date, ValidationError};
pub use repo::board_store::{
    load_or_seed, BoardStore, MemoryBoardStore, SqliteBoardStore, StorageError, StoreKeys,
    StoreResult, ACTIVE_BOARD_KEY, BOARDS_KEY,
};
pub use search::filter::{project, FilterCriteria};
pub use service::board_service::BoardService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
