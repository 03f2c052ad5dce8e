//! Progress output for provisioning runs.
//!
//! Success is quiet apart from per-task progress messages: a colored banner
//! per task and an indented line per step. Failures print to stderr.

use colored::Colorize;

/// Indent prefix for step-level progress lines.
const INDENT: &str = "→ ";

/// Progress reporter for tasks and steps.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    use_color: bool,
}

impl Reporter {
    /// Create a new reporter. Color is disabled when requested or when the
    /// NO_COLOR environment variable is set.
    pub fn new(use_color: bool) -> Self {
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        Self { use_color }
    }

    /// Announce a task starting.
    pub fn task(&self, message: &str) {
        if self.use_color {
            println!("{}", message.green());
        } else {
            println!("{}", message);
        }
    }

    /// Announce a disruptive task starting (reboot, firmware update).
    pub fn alert(&self, message: &str) {
        if self.use_color {
            println!("{}", message.red());
        } else {
            println!("{}", message);
        }
    }

    /// Report one step inside a task.
    pub fn step(&self, message: &str) {
        println!("{}{}", INDENT, message);
    }

    /// Echo captured command output (status task).
    pub fn command_output(&self, output: &str) {
        let trimmed = output.trim_end();
        if !trimmed.is_empty() {
            println!("{}", trimmed);
        }
    }

    /// Report a failure.
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{}", message.red().bold());
        } else {
            eprintln!("{}", message);
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true)
    }
}
