//! Text rendering of store snapshots for the console.

use std::fmt::Write as _;

use crossterm::style::{Color, Stylize};

use crate::tasks::Snapshot;
use crate::theme::{Palette, Theme};

/// Renders snapshots as plain or truecolor text.
#[derive(Debug, Clone)]
pub struct Renderer {
    palette: Palette,
    theme: Theme,
    color: bool,
}

impl Renderer {
    #[must_use]
    pub const fn new(palette: Palette, theme: Theme, color: bool) -> Self {
        Self {
            palette,
            theme,
            color,
        }
    }

    /// One header line, then one line per task.
    ///
    /// Each task line shows its position, a selection or edit marker, the
    /// status swatch and the text.
    #[must_use]
    pub fn render(&self, snapshot: &Snapshot) -> String {
        let mut out = String::new();
        let mode = if snapshot.selection_mode {
            format!("selecting ({} marked)", snapshot.selected.len())
        } else if snapshot.can_add {
            "ready".to_string()
        } else {
            "list full".to_string()
        };
        let _ = writeln!(
            out,
            "{}",
            self.paint(&format!("doTasks · {mode}"), self.theme.accent)
        );

        if snapshot.tasks.is_empty() {
            out.push_str("  (no tasks)\n");
            return out;
        }

        for (index, task) in snapshot.tasks.iter().enumerate() {
            let marker = if snapshot.selection_mode {
                if snapshot.is_selected(&task.id) {
                    self.paint("[x]", self.theme.delete)
                } else {
                    "[ ]".to_string()
                }
            } else if snapshot.is_editing(&task.id) {
                self.paint(" > ", self.theme.focus)
            } else {
                "   ".to_string()
            };
            let swatch = self.swatch(task.status);
            let text = if task.text.is_empty() { "…" } else { task.text.as_str() };
            let _ = writeln!(
                out,
                "{:>3}. {marker} {swatch} {}  ({})",
                index + 1,
                self.paint(text, self.theme.text),
                task.id
            );
        }
        out
    }

    fn swatch(&self, status: u32) -> String {
        if self.color {
            "  ".on(self.palette.term_color(status)).to_string()
        } else {
            format!("{} {}", status, self.palette.color(status))
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }
}
