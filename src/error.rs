//! Error types for piforge.
//!
//! This module defines the error taxonomy used throughout piforge. Failures
//! are not caught or translated inside tasks except where a call site is
//! explicitly marked tolerant; everything else propagates up to the CLI.

use thiserror::Error;

/// Result type alias for piforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for piforge.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure: the host is unreachable or the command
    /// channel broke. Fatal; aborts the current task chain.
    #[error("Connection error: {0}")]
    Connection(#[from] crate::connection::ConnectionError),

    /// A command on the remote host returned a non-zero exit status.
    #[error("Remote command `{command}` failed with exit code {exit_code}: {stderr}")]
    RemoteCommand {
        /// The rendered command line that failed
        command: String,
        /// Exit code reported by the remote host
        exit_code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// A configuration template could not be rendered. Raised before any
    /// remote call is issued for the file in question.
    #[error("Failed to render template '{template}': {message}")]
    TemplateRender {
        /// Template name
        template: String,
        /// Error message from the template engine
        message: String,
    },

    /// A provisioning task failed; wraps the underlying error with the
    /// task's identity so the user sees where the sequence stopped.
    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        /// Task name
        task: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new remote command error.
    pub fn remote_command(
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::RemoteCommand {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new template render error.
    pub fn template_render(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateRender {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Wraps an error with the name of the task it occurred in.
    pub fn task_failed(task: impl Into<String>, source: Error) -> Self {
        Self::TaskFailed {
            task: task.into(),
            source: Box::new(source),
        }
    }

    /// Returns the name of the failing task, if this error carries one.
    pub fn task(&self) -> Option<&str> {
        match self {
            Error::TaskFailed { task, source } => Some(source.task().unwrap_or(task)),
            _ => None,
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::RemoteCommand { .. } => 2,
            Error::Connection(_) => 3,
            Error::TemplateRender { .. } => 4,
            Error::Config(_) => 5,
            Error::TaskFailed { source, .. } => source.exit_code(),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::remote_command("ufw enable", 1, "denied").exit_code(), 2);
        assert_eq!(
            Error::Connection(ConnectionError::ConnectionFailed("refused".into())).exit_code(),
            3
        );
        assert_eq!(Error::template_render("motd", "missing var").exit_code(), 4);
        assert_eq!(Error::Config("no host".into()).exit_code(), 5);
    }

    #[test]
    fn test_task_failed_keeps_inner_exit_code() {
        let err = Error::task_failed(
            "install-firewall",
            Error::remote_command("apt-get install -y ufw", 100, "no network"),
        );
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.task(), Some("install-firewall"));
    }

    #[test]
    fn test_task_failed_reports_innermost_task() {
        let err = Error::task_failed(
            "deploy",
            Error::task_failed("install-mpd", Error::Config("bad".into())),
        );
        assert_eq!(err.task(), Some("install-mpd"));
    }
}
