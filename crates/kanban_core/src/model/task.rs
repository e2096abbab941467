//! Task domain model.
//!
//! # Responsibility
//! - Define the task record with its labels and checklist.
//! - Provide the typed partial-update value used by `updateTask`.
//!
//! # Invariants
//! - `title` is trimmed and never blank.
//! - `labels` holds at most one entry per label `id`.
//! - Missing or `null` collection fields deserialize as empty, never absent.

use crate::model::ids::{generate_id, ChecklistItemId, LabelId, TaskId, CHECKLIST_ITEM_PREFIX, TASK_PREFIX};
use crate::model::validation::{normalize_text, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Task urgency. New tasks start at `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ValidationError::UnknownPriority(other.to_string())),
        }
    }
}

/// Colored tag attached to a task. Identity is `id`; `color` is a style token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub text: String,
    pub color: String,
}

impl Label {
    pub fn new(id: impl Into<String>, text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            color: color.into(),
        }
    }
}

/// Built-in label palette offered by the task editor.
pub fn default_labels() -> Vec<Label> {
    vec![
        Label::new("l1", "Urgent", "bg-red-500"),
        Label::new("l2", "Feature", "bg-blue-500"),
        Label::new("l3", "Bug", "bg-orange-500"),
        Label::new("l4", "Tech Debt", "bg-purple-500"),
        Label::new("l5", "Design", "bg-pink-500"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Checklist completion summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistProgress {
    pub completed: usize,
    pub total: usize,
    /// Rounded percentage; `0` for an empty checklist.
    pub percent: u8,
}

/// Unit of work owned by one board and listed by one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<Label>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checklists: Vec<ChecklistItem>,
    /// Display-formatted due date, see [`crate::format_due_date`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Task {
    /// Creates a task with a generated ID and default fields.
    ///
    /// # Invariants
    /// - `priority` is `Medium`; description, labels and checklist are empty.
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_id(generate_id(TASK_PREFIX), title)
    }

    /// Creates a task with a caller-provided ID.
    ///
    /// Used by seed data and import paths where identity already exists.
    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: id.into(),
            title: normalize_text(title, ValidationError::BlankTaskTitle)?,
            description: String::new(),
            priority: Priority::default(),
            labels: Vec::new(),
            checklists: Vec::new(),
            due_date: None,
        })
    }

    /// Merges `patch` into this task.
    ///
    /// Returns whether any field actually changed. The patch is validated
    /// before anything is written, so a rejected patch leaves the task as is.
    pub fn apply_patch(&mut self, patch: &TaskPatch) -> Result<bool, ValidationError> {
        let title = match &patch.title {
            Some(title) => Some(normalize_text(title.as_str(), ValidationError::BlankTaskTitle)?),
            None => None,
        };

        let before = self.clone();
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = &patch.due_date {
            self.due_date = due_date.clone();
        }
        if let Some(labels) = &patch.labels {
            self.labels = dedup_labels(labels);
        }
        if let Some(checklists) = &patch.checklists {
            self.checklists = checklists.clone();
        }
        Ok(*self != before)
    }

    /// Adds `label` when no label with its ID is attached, removes it otherwise.
    ///
    /// Returns `true` when the label is attached after the call.
    pub fn toggle_label(&mut self, label: &Label) -> bool {
        if let Some(position) = self.labels.iter().position(|l| l.id == label.id) {
            self.labels.remove(position);
            false
        } else {
            self.labels.push(label.clone());
            true
        }
    }

    pub fn has_label(&self, label_id: &str) -> bool {
        self.labels.iter().any(|label| label.id == label_id)
    }

    /// Appends an unchecked checklist item and returns its ID.
    pub fn add_checklist_item(
        &mut self,
        text: impl Into<String>,
    ) -> Result<ChecklistItemId, ValidationError> {
        let text = normalize_text(text, ValidationError::BlankChecklistText)?;
        let id = generate_id(CHECKLIST_ITEM_PREFIX);
        self.checklists.push(ChecklistItem {
            id: id.clone(),
            text,
            completed: false,
        });
        Ok(id)
    }

    /// Flips `completed` on one item. Returns the new state, or `None` when
    /// the item does not exist.
    pub fn toggle_checklist_item(&mut self, item_id: &str) -> Option<bool> {
        let item = self.checklists.iter_mut().find(|item| item.id == item_id)?;
        item.completed = !item.completed;
        Some(item.completed)
    }

    pub fn remove_checklist_item(&mut self, item_id: &str) -> Option<ChecklistItem> {
        let position = self.checklists.iter().position(|item| item.id == item_id)?;
        Some(self.checklists.remove(position))
    }

    pub fn checklist_progress(&self) -> ChecklistProgress {
        let total = self.checklists.len();
        let completed = self.checklists.iter().filter(|item| item.completed).count();
        let percent = if total == 0 {
            0
        } else {
            ((completed as f64 * 100.0) / total as f64).round() as u8
        };
        ChecklistProgress {
            completed,
            total,
            percent,
        }
    }
}

/// Typed partial update for [`Task::apply_patch`].
///
/// `None` leaves a field untouched. `due_date` is doubly optional so a patch
/// can clear the date with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<String>>,
    pub labels: Option<Vec<Label>>,
    pub checklists: Option<Vec<ChecklistItem>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(Some(due_date.into()));
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    pub fn labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn checklists(mut self, checklists: Vec<ChecklistItem>) -> Self {
        self.checklists = Some(checklists);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn dedup_labels(labels: &[Label]) -> Vec<Label> {
    let mut out: Vec<Label> = Vec::with_capacity(labels.len());
    for label in labels {
        if !out.iter().any(|existing| existing.id == label.id) {
            out.push(label.clone());
        }
    }
    out
}

/// Older stored shapes may carry `null` where a collection is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{default_labels, Priority, Task, TaskPatch};

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!(" HIGH ".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn apply_patch_reports_no_change_for_identical_values() {
        let mut task = Task::new("Write docs").unwrap();
        let changed = task
            .apply_patch(&TaskPatch::new().priority(Priority::Medium))
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn apply_patch_rejects_blank_title_without_partial_write() {
        let mut task = Task::new("Write docs").unwrap();
        let patch = TaskPatch::new().title("   ").description("changed");
        assert!(task.apply_patch(&patch).is_err());
        assert_eq!(task.description, "");
        assert_eq!(task.title, "Write docs");
    }

    #[test]
    fn patch_labels_are_deduplicated_by_id() {
        let mut task = Task::new("Label me").unwrap();
        let urgent = default_labels()[0].clone();
        task.apply_patch(&TaskPatch::new().labels(vec![urgent.clone(), urgent]))
            .unwrap();
        assert_eq!(task.labels.len(), 1);
    }

    #[test]
    fn checklist_progress_rounds_percentage() {
        let mut task = Task::new("Checklist").unwrap();
        assert_eq!(task.checklist_progress().percent, 0);

        let first = task.add_checklist_item("one").unwrap();
        task.add_checklist_item("two").unwrap();
        task.add_checklist_item("three").unwrap();
        task.toggle_checklist_item(&first);

        let progress = task.checklist_progress();
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percent, 33);
    }
}
