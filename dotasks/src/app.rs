//! Application wiring: store, persistence policy and lifecycle signals.
//!
//! [`App::launch`] loads (or resets) the stored list, hydrates the store,
//! starts the [`DebouncedWriter`] and subscribes the persistence policy:
//! structural changes schedule a save, keystroke-level text edits only mark
//! the list dirty until the edit session ends or the app is backgrounded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dotasks_proto::task::TaskId;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::intent::{HELP, Intent, IntentError, TaskRef};
use crate::persist::{
    DebouncedWriter, PersistWarning, TaskStorage, default_examples, load_or_reset,
};
use crate::tasks::{Change, Snapshot, TaskError, TaskListStore};
use crate::theme::Theme;
use crate::ui::Renderer;

/// Errors surfaced to the user while applying an intent.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    /// The store rejected the operation.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// The intent named something that does not exist.
    #[error(transparent)]
    Intent(#[from] IntentError),
}

/// What the driver should do after an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (or was requested); redraw.
    Render,
    /// Show a message without redrawing.
    Message(String),
    /// Exit the loop.
    Quit,
}

/// A running task list bound to its storage.
pub struct App {
    store: TaskListStore,
    writer: DebouncedWriter,
    text_dirty: Arc<AtomicBool>,
    renderer: Renderer,
}

impl App {
    /// Loads the stored list and starts persistence.
    ///
    /// Returns the app and the receiver for [`PersistWarning`]s. Must be
    /// called within a tokio runtime.
    pub async fn launch<S>(storage: S, config: &AppConfig) -> (Self, mpsc::Receiver<PersistWarning>)
    where
        S: TaskStorage + 'static,
    {
        let limits = config.limits();
        let defaults = if config.seed_examples {
            default_examples()
        } else {
            Vec::new()
        };
        let tasks = load_or_reset(&storage, limits, defaults).await;

        let mut store = TaskListStore::new(limits);
        store.hydrate(tasks);

        let (writer, warnings) =
            DebouncedWriter::spawn(storage, config.debounce, config.warning_buffer);

        let text_dirty = Arc::new(AtomicBool::new(false));
        let scheduler = writer.scheduler();
        let dirty = Arc::clone(&text_dirty);
        store.subscribe(move |event| {
            if event.change.persists() {
                dirty.store(false, Ordering::SeqCst);
                scheduler.schedule(event.snapshot.to_document());
            } else if matches!(event.change, Change::TextChanged(_)) {
                dirty.store(true, Ordering::SeqCst);
            }
        });

        let renderer = Renderer::new(
            config.palette.clone(),
            Theme::for_appearance(config.appearance),
            config.color,
        );

        tracing::info!(tasks = store.len(), "app launched");
        let app = Self {
            store,
            writer,
            text_dirty,
            renderer,
        };
        (app, warnings)
    }

    /// The store, for reading state.
    #[must_use]
    pub const fn store(&self) -> &TaskListStore {
        &self.store
    }

    /// The store, for direct mutation.
    pub const fn store_mut(&mut self) -> &mut TaskListStore {
        &mut self.store
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Current state as console text.
    #[must_use]
    pub fn render(&self) -> String {
        self.renderer.render(&self.store.snapshot())
    }

    /// Applies one intent. Rejections become [`Outcome::Message`].
    pub async fn apply(&mut self, intent: Intent) -> Outcome {
        match self.dispatch(intent).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(error = %err, "intent rejected");
                Outcome::Message(err.to_string())
            }
        }
    }

    async fn dispatch(&mut self, intent: Intent) -> Result<Outcome, CommandError> {
        match intent {
            Intent::Add => {
                if self.store.add_task().is_some() {
                    Ok(Outcome::Render)
                } else if self.store.selection_mode() {
                    Ok(Outcome::Message("leave selection mode to add tasks".into()))
                } else {
                    Ok(Outcome::Message(format!(
                        "task list is full ({} tasks)",
                        self.store.limits().max_tasks()
                    )))
                }
            }
            Intent::Text { target, text } => {
                let id = self.resolve(&target)?;
                if self.store.editing() == Some(&id) {
                    self.store.set_task_text(&id, &text)?;
                } else {
                    // Not under edit: a complete edit session.
                    self.store.start_editing(&id)?;
                    self.store.set_task_text(&id, &text)?;
                    self.store.end_editing();
                }
                Ok(Outcome::Render)
            }
            Intent::Cycle(target) => {
                let id = self.resolve(&target)?;
                self.store.cycle_status(&id)?;
                Ok(Outcome::Render)
            }
            Intent::Select => {
                self.store.toggle_selection_mode();
                Ok(Outcome::Render)
            }
            Intent::Toggle(target) => {
                let id = self.resolve(&target)?;
                self.store.toggle_select(&id)?;
                Ok(Outcome::Render)
            }
            Intent::Delete => {
                if !self.store.selection_mode() {
                    return Err(TaskError::SelectionInactive.into());
                }
                self.store.delete_selected();
                Ok(Outcome::Render)
            }
            Intent::Edit(target) => {
                let id = self.resolve(&target)?;
                self.store.start_editing(&id)?;
                Ok(Outcome::Render)
            }
            Intent::Done => {
                self.store.end_editing();
                Ok(Outcome::Render)
            }
            Intent::Move { target, to } => {
                let id = self.resolve(&target)?;
                self.move_task(&id, to)?;
                Ok(Outcome::Render)
            }
            Intent::Order(refs) => {
                let order = refs
                    .iter()
                    .map(|r| self.resolve(r))
                    .collect::<Result<Vec<_>, _>>()?;
                self.store.reorder(&order)?;
                Ok(Outcome::Render)
            }
            Intent::List => Ok(Outcome::Render),
            Intent::Background => {
                if self.on_background().await {
                    Ok(Outcome::Message("saved".into()))
                } else {
                    Ok(Outcome::Message("could not save tasks".into()))
                }
            }
            Intent::Help => Ok(Outcome::Message(HELP.to_string())),
            Intent::Quit => Ok(Outcome::Quit),
        }
    }

    fn resolve(&self, target: &TaskRef) -> Result<TaskId, IntentError> {
        target.resolve(&self.store.snapshot())
    }

    /// Moves one task to a 1-based position, clamped to the list end.
    fn move_task(&mut self, id: &TaskId, to: usize) -> Result<(), TaskError> {
        let mut order: Vec<TaskId> = self.store.tasks().iter().map(|t| t.id.clone()).collect();
        let from = order
            .iter()
            .position(|x| x == id)
            .ok_or_else(|| TaskError::TaskNotFound(id.to_string()))?;
        let moved = order.remove(from);
        let to = to.saturating_sub(1).min(order.len());
        order.insert(to, moved);
        self.store.reorder(&order)
    }

    /// The app is leaving the foreground: write everything now.
    ///
    /// Text typed into a task still under edit is included. Returns whether
    /// the write succeeded.
    pub async fn on_background(&self) -> bool {
        self.schedule_if_dirty();
        self.writer.flush().await
    }

    /// The on-screen keyboard was dismissed: end the edit session.
    pub fn on_keyboard_hidden(&mut self) {
        self.store.end_editing();
    }

    /// Writes pending changes and stops the writer.
    pub async fn shutdown(self) {
        self.schedule_if_dirty();
        self.writer.shutdown().await;
        tracing::info!("app shut down");
    }

    fn schedule_if_dirty(&self) {
        if self.text_dirty.swap(false, Ordering::SeqCst) {
            self.writer.schedule(self.store.snapshot().to_document());
        }
    }
}
