//! Line-oriented intents for the console driver.
//!
//! One intent per line, a verb followed by arguments. Tasks are referenced
//! either by id or by 1-based position written as `#n`.

use std::str::FromStr;

use dotasks_proto::task::TaskId;

use crate::tasks::Snapshot;

/// Errors from parsing or resolving an intent.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntentError {
    /// The line was blank.
    #[error("empty command")]
    Empty,
    /// The verb is not recognized.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    /// A required argument is missing.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    /// A position reference is not a positive integer.
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    /// A reference does not name a current task.
    #[error("no task at {0}")]
    NoSuchTask(String),
}

/// A task named by id or by 1-based display position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    Id(TaskId),
    Position(usize),
}

impl TaskRef {
    /// Resolves the reference against a snapshot.
    ///
    /// Ids are passed through unchecked so the store reports unknown ids.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::NoSuchTask`] for an out-of-range position.
    pub fn resolve(&self, snapshot: &Snapshot) -> Result<TaskId, IntentError> {
        match self {
            Self::Id(id) => Ok(id.clone()),
            Self::Position(n) => n
                .checked_sub(1)
                .and_then(|i| snapshot.tasks.get(i))
                .map(|t| t.id.clone())
                .ok_or_else(|| IntentError::NoSuchTask(format!("#{n}"))),
        }
    }
}

impl FromStr for TaskRef {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('#') {
            Some(digits) => match digits.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Self::Position(n)),
                _ => Err(IntentError::InvalidPosition(s.to_string())),
            },
            None => Ok(Self::Id(TaskId::from(s))),
        }
    }
}

/// A user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Append a blank task and edit it.
    Add,
    /// Replace a task's text. Outside an edit session this is a complete edit.
    Text { target: TaskRef, text: String },
    /// Advance a task's status.
    Cycle(TaskRef),
    /// Enter or leave selection mode.
    Select,
    /// Flip a task's selection.
    Toggle(TaskRef),
    /// Delete the selected tasks.
    Delete,
    /// Give a task edit focus.
    Edit(TaskRef),
    /// End the current edit.
    Done,
    /// Move one task to a 1-based position.
    Move { target: TaskRef, to: usize },
    /// Replace the whole order.
    Order(Vec<TaskRef>),
    /// Print the list.
    List,
    /// Simulate the app going to the background.
    Background,
    /// Print command help.
    Help,
    /// Save and exit.
    Quit,
}

/// Command summary printed by `help`.
pub const HELP: &str = "\
commands:
  add                 append a blank task and edit it
  text <task> <text>  set a task's text (saved unless under edit)
  cycle <task>        advance a task's status
  select              enter or leave selection mode
  toggle <task>       select or deselect a task
  delete              delete selected tasks
  edit <task>         start editing a task
  done                stop editing
  move <task> <pos>   move a task to a position
  order <task>...     set the full order
  list                show the list
  bg                  save now
  quit                save and exit
<task> is an id or #n for the n-th task";

impl FromStr for Intent {
    type Err = IntentError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(v, r)| (v, r.trim()));

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(IntentError::Empty),
            "add" | "a" => Ok(Self::Add),
            "text" | "t" => {
                let (target, text) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(t, x)| (t, x.trim_start()));
                Ok(Self::Text {
                    target: required(target, "task")?.parse()?,
                    text: text.to_string(),
                })
            }
            "cycle" | "c" => Ok(Self::Cycle(required(rest, "task")?.parse()?)),
            "select" | "s" => Ok(Self::Select),
            "toggle" => Ok(Self::Toggle(required(rest, "task")?.parse()?)),
            "delete" | "d" => Ok(Self::Delete),
            "edit" | "e" => Ok(Self::Edit(required(rest, "task")?.parse()?)),
            "done" => Ok(Self::Done),
            "move" | "m" => {
                let mut args = rest.split_whitespace();
                let target = required(args.next().unwrap_or_default(), "task")?.parse()?;
                let to = required(args.next().unwrap_or_default(), "position")?;
                let to = match to.trim_start_matches('#').parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(IntentError::InvalidPosition(to.to_string())),
                };
                Ok(Self::Move { target, to })
            }
            "order" => {
                let refs = rest
                    .split_whitespace()
                    .map(str::parse)
                    .collect::<Result<Vec<TaskRef>, _>>()?;
                Ok(Self::Order(refs))
            }
            "list" | "ls" | "l" => Ok(Self::List),
            "bg" | "background" => Ok(Self::Background),
            "help" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(IntentError::UnknownCommand(other.to_string())),
        }
    }
}

fn required<'a>(arg: &'a str, name: &'static str) -> Result<&'a str, IntentError> {
    if arg.is_empty() {
        Err(IntentError::MissingArgument(name))
    } else {
        Ok(arg)
    }
}
