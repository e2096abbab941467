use kanban_core::{
    apply, BoardCollection, BoardCommand, ColumnPosition, EngineError, MoveColumnCommand,
    MoveTaskCommand, TaskPosition,
};
use std::collections::BTreeMap;

/// Small deterministic generator so the command stream is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

fn next_command(state: &BoardCollection, rng: &mut Lcg, step: usize) -> BoardCommand {
    let boards = state.boards();
    if boards.is_empty() {
        return BoardCommand::CreateBoard {
            title: format!("Board {step}"),
        };
    }
    match rng.next(20) {
        0 if boards.len() < 4 => {
            return BoardCommand::CreateBoard {
                title: format!("Board {step}"),
            }
        }
        1 => {
            return BoardCommand::DeleteBoard {
                board_id: boards[rng.next(boards.len())].id.clone(),
            }
        }
        2 | 3 => {
            return BoardCommand::SetActiveBoard {
                board_id: boards[rng.next(boards.len())].id.clone(),
            }
        }
        _ => {}
    }

    let board = state.active_board().unwrap();
    let columns: Vec<_> = board.column_order.clone();
    let column_id = columns[rng.next(columns.len())].clone();
    let column_ids = &board.columns[&column_id].task_ids;

    match rng.next(7) {
        0 | 1 => BoardCommand::AddTask {
            column_id,
            title: format!("Generated {step}"),
        },
        2 if columns.len() < 6 => BoardCommand::AddColumn {
            title: format!("Column {step}"),
        },
        3 if columns.len() > 1 && rng.next(3) == 0 => BoardCommand::DeleteColumn { column_id },
        4 => {
            let source = rng.next(columns.len());
            BoardCommand::MoveColumn(MoveColumnCommand {
                source: ColumnPosition { index: source },
                destination: Some(ColumnPosition {
                    index: rng.next(columns.len()),
                }),
                column_id: columns[source].clone(),
            })
        }
        5 if !column_ids.is_empty() => {
            let index = rng.next(column_ids.len());
            BoardCommand::DeleteTask {
                task_id: column_ids[index].clone(),
                column_id,
            }
        }
        _ if !column_ids.is_empty() => {
            let index = rng.next(column_ids.len());
            let task_id = column_ids[index].clone();
            let target = columns[rng.next(columns.len())].clone();
            let target_len = board.columns[&target].task_ids.len();
            let max_index = if target == column_id {
                target_len - 1
            } else {
                target_len
            };
            BoardCommand::MoveTask(MoveTaskCommand {
                source: TaskPosition::new(column_id, index),
                destination: Some(TaskPosition::new(target, rng.next(max_index + 1))),
                task_id,
            })
        }
        _ => BoardCommand::AddTask {
            column_id,
            title: format!("Filler {step}"),
        },
    }
}

/// Occurrences of each `(board, task)` pair across every column list.
fn memberships(state: &BoardCollection) -> BTreeMap<(String, String), usize> {
    let mut counts = BTreeMap::new();
    for board in state.boards() {
        for column in board.columns.values() {
            for task_id in &column.task_ids {
                *counts
                    .entry((board.id.clone(), task_id.clone()))
                    .or_insert(0) += 1;
            }
        }
    }
    counts
}

fn assert_active_pointer(state: &BoardCollection, step: usize) {
    match state.active_board_id() {
        Some(board_id) => assert!(
            state.board(board_id).is_some(),
            "active board {board_id} missing at step {step}"
        ),
        None => assert!(state.is_empty(), "no active board at step {step}"),
    }
}

#[test]
fn generated_command_stream_preserves_board_invariants() {
    let mut state = BoardCollection::seed_default();
    let mut rng = Lcg(0x5eed);
    let mut board_commands = 0;

    for step in 0..600 {
        let command = next_command(&state, &mut rng, step);
        let is_move = matches!(command, BoardCommand::MoveTask(_));
        if matches!(
            command,
            BoardCommand::CreateBoard { .. }
                | BoardCommand::DeleteBoard { .. }
                | BoardCommand::SetActiveBoard { .. }
        ) {
            board_commands += 1;
        }
        let before = memberships(&state);

        apply(&mut state, command).unwrap();

        for board in state.boards() {
            board.check_integrity().unwrap();
        }
        assert_active_pointer(&state, step);
        if is_move {
            assert_eq!(memberships(&state), before, "move changed memberships at {step}");
        }
    }
    assert!(board_commands > 0);
}

#[test]
fn rejected_commands_leave_state_identical() {
    let mut state = BoardCollection::seed_default();
    let before = state.clone();

    let rejected = [
        BoardCommand::AddTask {
            column_id: "col-1".to_string(),
            title: " ".to_string(),
        },
        BoardCommand::DeleteColumn {
            column_id: "col-missing".to_string(),
        },
        BoardCommand::SetDueDate {
            task_id: "task-1".to_string(),
            date: "2023-02-29".to_string(),
        },
        BoardCommand::MoveTask(MoveTaskCommand {
            source: TaskPosition::new("col-1", 0),
            destination: Some(TaskPosition::new("col-3", 4)),
            task_id: "task-1".to_string(),
        }),
    ];

    for command in rejected {
        let err = apply(&mut state, command).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(_) | EngineError::NotFound(_) | EngineError::InvariantViolation(_)
        ));
        assert_eq!(state, before);
    }
}
