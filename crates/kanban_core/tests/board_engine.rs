use kanban_core::{
    default_labels, Board, BoardCollection, BoardService, EngineError, MemoryBoardStore,
    NotFoundError, Priority, Task, TaskPatch, ValidationError,
};

fn seeded_service() -> BoardService<MemoryBoardStore> {
    BoardService::open(MemoryBoardStore::new())
}

fn board_with_tasks(titles: &[(&str, &str, &str)]) -> Board {
    let mut board = Board::with_id("board-1", "Work").unwrap();
    for (task_id, column_id, title) in titles {
        let task = Task::with_id(*task_id, *title).unwrap();
        board
            .columns
            .get_mut(*column_id)
            .unwrap()
            .task_ids
            .push(task.id.clone());
        board.tasks.insert(task.id.clone(), task);
    }
    board
}

#[test]
fn add_task_appends_to_column_with_defaults() {
    let mut service = seeded_service();

    let task_id = service.add_task("col-2", "Write design doc").unwrap();

    let board = service.active_board().unwrap();
    assert_eq!(board.tasks.len(), 2);
    let task = board.task(&task_id).unwrap();
    assert_eq!(task.title, "Write design doc");
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.description, "");
    assert!(task.labels.is_empty());
    assert!(task.checklists.is_empty());
    assert_eq!(board.columns["col-2"].task_ids.last(), Some(&task_id));
}

#[test]
fn add_task_rejects_blank_title_and_keeps_state() {
    let mut service = seeded_service();
    let before = service.collection().clone();

    let err = service.add_task("col-1", "   ").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::BlankTaskTitle)
    ));
    assert_eq!(service.collection(), &before);
}

#[test]
fn add_task_to_unknown_column_is_not_found() {
    let mut service = seeded_service();
    let err = service.add_task("col-404", "Orphan").unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound(NotFoundError::Column(ref id)) if id == "col-404"
    ));
}

#[test]
fn delete_column_cascades_to_its_tasks() {
    let board = board_with_tasks(&[
        ("t4", "col-1", "Keep me"),
        ("t5", "col-2", "Drop five"),
        ("t6", "col-2", "Drop six"),
    ]);
    let mut service = BoardService::with_collection(
        BoardCollection::new(vec![board]),
        MemoryBoardStore::new(),
    );

    service.delete_column("col-2").unwrap();

    let board = service.active_board().unwrap();
    assert!(board.task("t5").is_none());
    assert!(board.task("t6").is_none());
    assert!(board.task("t4").is_some());
    assert!(!board.columns.contains_key("col-2"));
    assert_eq!(board.column_order, vec!["col-1"]);
    board.check_integrity().unwrap();
}

#[test]
fn toggle_label_twice_restores_original_labels() {
    let board = board_with_tasks(&[("t1", "col-1", "Label me")]);
    let mut service = BoardService::with_collection(
        BoardCollection::new(vec![board]),
        MemoryBoardStore::new(),
    );
    let urgent = default_labels()
        .into_iter()
        .find(|label| label.id == "l1")
        .unwrap();

    assert!(service.toggle_label("t1", &urgent).unwrap());
    assert!(service.active_board().unwrap().task("t1").unwrap().has_label("l1"));

    assert!(!service.toggle_label("t1", &urgent).unwrap());
    assert!(service
        .active_board()
        .unwrap()
        .task("t1")
        .unwrap()
        .labels
        .is_empty());
}

#[test]
fn delete_task_requires_the_listing_column() {
    let mut service = seeded_service();

    let err = service.delete_task("task-1", "col-2").unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound(NotFoundError::TaskNotInColumn { .. })
    ));
    assert!(service.active_board().unwrap().task("task-1").is_some());

    service.delete_task("task-1", "col-1").unwrap();
    let board = service.active_board().unwrap();
    assert!(board.tasks.is_empty());
    assert!(board.columns["col-1"].task_ids.is_empty());
}

#[test]
fn update_task_merges_only_given_fields() {
    let mut service = seeded_service();

    let changed = service
        .update_task(
            "task-1",
            TaskPatch::new()
                .title("  Renamed  ")
                .priority(Priority::High),
        )
        .unwrap();
    assert!(changed);

    let task = service.active_board().unwrap().task("task-1").unwrap();
    assert_eq!(task.title, "Renamed");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.description, "This is a sample task.");

    assert!(!service.update_task("task-1", TaskPatch::new()).unwrap());
}

#[test]
fn due_date_is_stored_in_display_form_and_can_be_cleared() {
    let mut service = seeded_service();

    assert!(service.set_due_date("task-1", "2026-10-05").unwrap());
    assert_eq!(
        service
            .active_board()
            .unwrap()
            .task("task-1")
            .unwrap()
            .due_date
            .as_deref(),
        Some("5 October")
    );

    let err = service.set_due_date("task-1", "2026-02-30").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::InvalidDueDate(_))
    ));

    assert!(service.clear_due_date("task-1").unwrap());
    assert!(service
        .active_board()
        .unwrap()
        .task("task-1")
        .unwrap()
        .due_date
        .is_none());
}

#[test]
fn checklist_items_toggle_and_delete() {
    let mut service = seeded_service();

    let first = service.add_checklist_item("task-1", "Read intro").unwrap();
    let second = service.add_checklist_item("task-1", "Try a drag").unwrap();
    service.toggle_checklist_item("task-1", &first).unwrap();

    let progress = service
        .active_board()
        .unwrap()
        .task("task-1")
        .unwrap()
        .checklist_progress();
    assert_eq!((progress.completed, progress.total, progress.percent), (1, 2, 50));

    service.delete_checklist_item("task-1", &second).unwrap();
    let err = service.toggle_checklist_item("task-1", &second).unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound(NotFoundError::ChecklistItem { .. })
    ));

    let err = service.add_checklist_item("task-1", " ").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::BlankChecklistText)
    ));
}

#[test]
fn create_board_seeds_two_columns_and_becomes_active() {
    let mut service = seeded_service();

    let board_id = service.create_board("Side project").unwrap();

    assert_eq!(service.boards().len(), 2);
    assert_eq!(service.active_board_id(), Some(board_id.as_str()));
    let board = service.active_board().unwrap();
    assert_eq!(board.title, "Side project");
    assert!(board.tasks.is_empty());
    let titles: Vec<&str> = board
        .ordered_columns()
        .map(|column| column.title.as_str())
        .collect();
    assert_eq!(titles, vec!["To Do", "In Progress"]);
}

#[test]
fn deleting_active_board_falls_back_to_first_remaining() {
    let mut service = seeded_service();
    let second = service.create_board("Second").unwrap();

    service.delete_board(&second).unwrap();
    assert_eq!(service.active_board_id(), Some("board-1"));

    service.delete_board("board-1").unwrap();
    assert!(service.boards().is_empty());
    assert_eq!(service.active_board_id(), None);

    let err = service.add_column("Backlog").unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound(NotFoundError::NoActiveBoard)
    ));
}

#[test]
fn set_active_board_rejects_unknown_ids() {
    let mut service = seeded_service();
    let second = service.create_board("Second").unwrap();

    service.set_active_board("board-1").unwrap();
    assert_eq!(service.active_board_id(), Some("board-1"));

    let err = service.set_active_board("board-missing").unwrap_err();
    assert!(matches!(err, EngineError::NotFound(NotFoundError::Board(_))));
    assert_eq!(service.active_board_id(), Some("board-1"));
    assert!(service.collection().board(&second).is_some());
}

#[test]
fn blank_or_identical_renames_are_ignored() {
    let mut service = seeded_service();

    assert!(!service.rename_column("col-1", "  ").unwrap());
    assert!(!service.rename_column("col-1", "To Do").unwrap());
    assert!(service.rename_column("col-1", " Backlog ").unwrap());
    assert_eq!(service.active_board().unwrap().columns["col-1"].title, "Backlog");

    assert!(!service.rename_board("board-1", "").unwrap());
    assert!(service.rename_board("board-1", "Personal").unwrap());
    assert_eq!(service.active_board().unwrap().title, "Personal");
}

#[test]
fn add_column_appends_to_column_order() {
    let mut service = seeded_service();

    let column_id = service.add_column("Review").unwrap();

    let board = service.active_board().unwrap();
    assert_eq!(board.column_order.last(), Some(&column_id));
    assert!(board.columns[&column_id].task_ids.is_empty());
    assert_eq!(board.columns[&column_id].title, "Review");
}
