//! doTasks: single-list task keeper with a debounced JSON store.

pub mod app;
pub mod config;
pub mod intent;
pub mod persist;
pub mod tasks;
pub mod theme;
pub mod ui;
