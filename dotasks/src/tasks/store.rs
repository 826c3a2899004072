//! In-memory task list with selection and edit-focus state machines.
//!
//! Two orthogonal modes are tracked: at most one task holds edit focus,
//! and selection mode gathers a delete-set. The two are mutually
//! exclusive: entering selection mode ends editing, and editing cannot
//! start while selection mode is active.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use dotasks_proto::task::{
    DEFAULT_PALETTE, MAX_TASK_TEXT_CHARS, MAX_TASKS, Task, TaskDocument, TaskId,
};

use super::TaskError;

/// Capacity and palette bounds enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    max_tasks: usize,
    max_text_chars: usize,
    palette_size: u32,
}

impl StoreLimits {
    /// Creates limits. A palette size of zero is raised to one.
    #[must_use]
    pub fn new(max_tasks: usize, max_text_chars: usize, palette_size: u32) -> Self {
        Self {
            max_tasks,
            max_text_chars,
            palette_size: palette_size.max(1),
        }
    }

    /// Maximum number of tasks in the list.
    #[must_use]
    pub const fn max_tasks(&self) -> usize {
        self.max_tasks
    }

    /// Maximum text length in characters.
    #[must_use]
    pub const fn max_text_chars(&self) -> usize {
        self.max_text_chars
    }

    /// Number of statuses in the palette.
    #[must_use]
    pub const fn palette_size(&self) -> u32 {
        self.palette_size
    }

    fn truncate(&self, text: &str) -> String {
        text.chars().take(self.max_text_chars).collect()
    }
}

impl Default for StoreLimits {
    #[allow(clippy::cast_possible_truncation)]
    fn default() -> Self {
        Self::new(MAX_TASKS, MAX_TASK_TEXT_CHARS, DEFAULT_PALETTE.len() as u32)
    }
}

/// What a mutation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The list was replaced wholesale from storage.
    Hydrated,
    /// A blank task was appended and took edit focus.
    TaskAdded(TaskId),
    /// Text of the task under edit changed.
    TextChanged(TaskId),
    /// A task advanced to the next status.
    StatusCycled {
        /// The task.
        id: TaskId,
        /// Its new status.
        status: u32,
    },
    /// A task joined or left the selected set.
    SelectionToggled {
        /// The task.
        id: TaskId,
        /// Whether it is now selected.
        selected: bool,
    },
    /// Selection mode was entered or left.
    SelectionModeChanged {
        /// Whether selection mode is now active.
        active: bool,
    },
    /// Selected tasks were removed.
    TasksDeleted(Vec<TaskId>),
    /// A task took edit focus.
    EditingStarted(TaskId),
    /// A task lost edit focus.
    EditingEnded(TaskId),
    /// The list order was replaced.
    Reordered,
}

impl Change {
    /// Whether this change should be written to storage.
    ///
    /// Keystroke-level text edits and selection changes are not persisted;
    /// the text lands on disk once the edit session ends.
    #[must_use]
    pub const fn persists(&self) -> bool {
        matches!(
            self,
            Self::TaskAdded(_)
                | Self::StatusCycled { .. }
                | Self::TasksDeleted(_)
                | Self::EditingEnded(_)
                | Self::Reordered
        )
    }
}

/// Immutable view of the store, handed to renderers and subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Tasks in display order.
    pub tasks: Vec<Task>,
    /// Ids currently marked for deletion.
    pub selected: BTreeSet<TaskId>,
    /// Whether selection mode is active.
    pub selection_mode: bool,
    /// The task holding edit focus, if any.
    pub editing: Option<TaskId>,
    /// Whether the add affordance should be offered.
    pub can_add: bool,
}

impl Snapshot {
    /// Whether the task is in the selected set.
    #[must_use]
    pub fn is_selected(&self, id: &TaskId) -> bool {
        self.selected.contains(id)
    }

    /// Whether the task holds edit focus.
    #[must_use]
    pub fn is_editing(&self, id: &TaskId) -> bool {
        self.editing.as_ref() == Some(id)
    }

    /// Position of a task in display order.
    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// The persisted form of this snapshot (selection and focus dropped).
    #[must_use]
    pub fn to_document(&self) -> TaskDocument {
        TaskDocument::new(self.tasks.clone())
    }
}

/// Delivered to subscribers after every successful mutation.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    /// What changed.
    pub change: Change,
    /// State after the change.
    pub snapshot: Arc<Snapshot>,
}

/// Handle returned by [`TaskListStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreEvent) + Send>;

/// Sole owner and mutator of the task list.
pub struct TaskListStore {
    tasks: Vec<Task>,
    selected: BTreeSet<TaskId>,
    selection_mode: bool,
    editing: Option<TaskId>,
    limits: StoreLimits,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl TaskListStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            tasks: Vec::new(),
            selected: BTreeSet::new(),
            selection_mode: false,
            editing: None,
            limits,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The limits this store enforces.
    #[must_use]
    pub const fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Tasks in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether selection mode is active.
    #[must_use]
    pub const fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    /// The task holding edit focus.
    #[must_use]
    pub const fn editing(&self) -> Option<&TaskId> {
        self.editing.as_ref()
    }

    /// Ids currently selected.
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<TaskId> {
        &self.selected
    }

    /// Whether [`add_task`](Self::add_task) would succeed.
    #[must_use]
    pub fn can_add(&self) -> bool {
        !self.selection_mode && self.tasks.len() < self.limits.max_tasks
    }

    /// Builds an immutable snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            selected: self.selected.clone(),
            selection_mode: self.selection_mode,
            editing: self.editing.clone(),
            can_add: self.can_add(),
        }
    }

    /// Registers a callback invoked after every successful mutation.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Replaces the list with tasks read from storage.
    ///
    /// The tasks are normalized first (see [`normalize_tasks`]); selection,
    /// selection mode and edit focus are cleared.
    pub fn hydrate(&mut self, tasks: Vec<Task>) {
        self.tasks = normalize_tasks(self.limits, tasks);
        self.selected.clear();
        self.selection_mode = false;
        self.editing = None;
        tracing::debug!(count = self.tasks.len(), "task list hydrated");
        self.notify(Change::Hydrated);
    }

    /// Appends a blank task and gives it edit focus.
    ///
    /// Returns `None` without changing anything when the list is full or
    /// selection mode is active.
    pub fn add_task(&mut self) -> Option<TaskId> {
        if self.selection_mode {
            tracing::debug!("add ignored in selection mode");
            return None;
        }
        if self.tasks.len() >= self.limits.max_tasks {
            tracing::debug!(max = self.limits.max_tasks, "add ignored, task list full");
            return None;
        }

        let mut task = Task::new();
        while self.index_of(&task.id).is_some() {
            task.id = TaskId::new();
        }
        let id = task.id.clone();
        self.end_editing();
        self.tasks.push(task);
        self.editing = Some(id.clone());
        self.notify(Change::TaskAdded(id.clone()));
        Some(id)
    }

    /// Replaces a task's text, truncated to the character limit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if the id is unknown.
    pub fn set_task_text(&mut self, id: &TaskId, text: &str) -> Result<(), TaskError> {
        let text = self.limits.truncate(text);
        let index = self.require(id)?;
        if self.tasks[index].text == text {
            return Ok(());
        }
        self.tasks[index].text = text;
        self.notify(Change::TextChanged(id.clone()));
        Ok(())
    }

    /// Advances a task to the next status, wrapping at the palette end.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] if the id is unknown.
    pub fn cycle_status(&mut self, id: &TaskId) -> Result<u32, TaskError> {
        let index = self.require(id)?;
        let status = (self.tasks[index].status + 1) % self.limits.palette_size;
        self.tasks[index].status = status;
        self.notify(Change::StatusCycled {
            id: id.clone(),
            status,
        });
        Ok(status)
    }

    /// Flips a task's membership in the selected set.
    ///
    /// Returns whether the task is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::SelectionInactive`] outside selection mode, or
    /// [`TaskError::TaskNotFound`] if the id is unknown.
    pub fn toggle_select(&mut self, id: &TaskId) -> Result<bool, TaskError> {
        if !self.selection_mode {
            return Err(TaskError::SelectionInactive);
        }
        self.require(id)?;
        let selected = if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        };
        self.notify(Change::SelectionToggled {
            id: id.clone(),
            selected,
        });
        Ok(selected)
    }

    /// Enters selection mode, ending any edit session first.
    pub fn enter_selection_mode(&mut self) {
        if self.selection_mode {
            return;
        }
        self.end_editing();
        self.selected.clear();
        self.selection_mode = true;
        self.notify(Change::SelectionModeChanged { active: true });
    }

    /// Leaves selection mode, clearing the selected set and edit focus.
    pub fn exit_selection_mode(&mut self) {
        if !self.selection_mode {
            return;
        }
        self.end_editing();
        self.selected.clear();
        self.selection_mode = false;
        self.notify(Change::SelectionModeChanged { active: false });
    }

    /// Enters selection mode if inactive, leaves it otherwise.
    ///
    /// Returns whether selection mode is active afterwards.
    pub fn toggle_selection_mode(&mut self) -> bool {
        if self.selection_mode {
            self.exit_selection_mode();
        } else {
            self.enter_selection_mode();
        }
        self.selection_mode
    }

    /// Removes every selected task and leaves selection mode.
    ///
    /// Returns the removed ids in their former display order.
    pub fn delete_selected(&mut self) -> Vec<TaskId> {
        let was_active = self.selection_mode;
        let selected = std::mem::take(&mut self.selected);
        let mut removed = Vec::new();
        self.tasks.retain(|task| {
            if selected.contains(&task.id) {
                removed.push(task.id.clone());
                false
            } else {
                true
            }
        });
        self.selection_mode = false;

        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "selected tasks deleted");
            self.notify(Change::TasksDeleted(removed.clone()));
        } else if was_active {
            self.notify(Change::SelectionModeChanged { active: false });
        }
        removed
    }

    /// Gives a task edit focus, taking it from any other task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::SelectionActive`] in selection mode, or
    /// [`TaskError::TaskNotFound`] if the id is unknown.
    pub fn start_editing(&mut self, id: &TaskId) -> Result<(), TaskError> {
        if self.selection_mode {
            return Err(TaskError::SelectionActive);
        }
        self.require(id)?;
        if self.editing.as_ref() == Some(id) {
            return Ok(());
        }
        self.end_editing();
        self.editing = Some(id.clone());
        self.notify(Change::EditingStarted(id.clone()));
        Ok(())
    }

    /// Clears edit focus. Returns the task that held it.
    pub fn end_editing(&mut self) -> Option<TaskId> {
        let id = self.editing.take()?;
        self.notify(Change::EditingEnded(id.clone()));
        Some(id)
    }

    /// Replaces the display order.
    ///
    /// `new_order` must name every current task exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::OrderMismatch`] if `new_order` adds, drops or
    /// repeats an id. The store is unchanged in that case.
    pub fn reorder(&mut self, new_order: &[TaskId]) -> Result<(), TaskError> {
        if new_order.len() != self.tasks.len() {
            return Err(TaskError::OrderMismatch(format!(
                "expected {} ids, got {}",
                self.tasks.len(),
                new_order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(new_order.len());
        for id in new_order {
            if self.index_of(id).is_none() {
                return Err(TaskError::OrderMismatch(format!("unknown id {id}")));
            }
            if !seen.insert(id) {
                return Err(TaskError::OrderMismatch(format!("duplicate id {id}")));
            }
        }
        if self.tasks.iter().map(|t| &t.id).eq(new_order.iter()) {
            return Ok(());
        }

        let mut by_id: HashMap<TaskId, Task> = self
            .tasks
            .drain(..)
            .map(|task| (task.id.clone(), task))
            .collect();
        self.tasks = new_order.iter().filter_map(|id| by_id.remove(id)).collect();
        self.notify(Change::Reordered);
        Ok(())
    }

    fn index_of(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    fn require(&self, id: &TaskId) -> Result<usize, TaskError> {
        self.index_of(id)
            .ok_or_else(|| TaskError::TaskNotFound(id.to_string()))
    }

    fn notify(&mut self, change: Change) {
        if self.subscribers.is_empty() {
            return;
        }
        let event = StoreEvent {
            change,
            snapshot: Arc::new(self.snapshot()),
        };
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

impl Default for TaskListStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

/// Brings stored tasks back inside the store invariants.
///
/// Duplicate ids keep their first occurrence, statuses wrap into the
/// palette, text is truncated and the list is capped at the task limit.
#[must_use]
pub fn normalize_tasks(limits: StoreLimits, tasks: Vec<Task>) -> Vec<Task> {
    let total = tasks.len();
    let mut seen = HashSet::with_capacity(total);
    let mut adjusted = 0usize;

    let normalized: Vec<Task> = tasks
        .into_iter()
        .filter(|task| seen.insert(task.id.clone()))
        .take(limits.max_tasks)
        .map(|mut task| {
            let status = task.status % limits.palette_size;
            let text = limits.truncate(&task.text);
            if status != task.status || text.len() != task.text.len() {
                adjusted += 1;
            }
            task.status = status;
            task.text = text;
            task
        })
        .collect();

    let dropped = total - normalized.len();
    if dropped > 0 || adjusted > 0 {
        tracing::warn!(dropped, adjusted, "stored tasks normalized");
    }
    normalized
}
