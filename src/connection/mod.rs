//! Connection layer for remote host communication.
//!
//! This module provides a unified interface for executing commands and
//! transferring file content to the target host. All transports implement
//! the [`Connection`] trait.
//!
//! # Supported Transports
//!
//! - **SSH** (via `russh`): remote execution and SFTP file transfer
//! - **Local**: direct execution on the current machine, for development
//!
//! Every call is synchronous from the caller's perspective: the calling
//! task awaits the remote command and resumes only after it completes.
//! There is exactly one connection per invocation; no pooling.

/// Local execution connection implementation.
pub mod local;

/// SSH implementation using russh.
pub mod ssh;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use local::LocalConnection;
pub use ssh::{SshAuth, SshConnection};

/// Errors that can occur during connection operations.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to establish the initial connection to the host.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication was rejected by the remote host.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Command execution failed (not to be confused with a non-zero exit code).
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// File upload or download operation failed.
    #[error("File transfer failed: {0}")]
    TransferFailed(String),

    /// Connection or operation timed out.
    #[error("Connection timeout after {0} seconds")]
    Timeout(u64),

    /// Connection was closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// I/O error during connection operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// The result of executing a command on a connection.
///
/// # Example
///
/// ```
/// use piforge::connection::CommandResult;
///
/// let result = CommandResult::success("hello".into(), String::new());
/// assert!(result.success);
/// assert_eq!(result.exit_code, 0);
/// ```
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code of the command (0 indicates success).
    pub exit_code: i32,
    /// Content written to standard output.
    pub stdout: String,
    /// Content written to standard error.
    pub stderr: String,
    /// Convenience flag: `true` if `exit_code == 0`.
    pub success: bool,
}

impl CommandResult {
    /// Create a new successful command result
    pub fn success(stdout: String, stderr: String) -> Self {
        Self {
            exit_code: 0,
            stdout,
            stderr,
            success: true,
        }
    }

    /// Create a new failed command result
    pub fn failure(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            success: false,
        }
    }

    /// Get the combined output (stdout + stderr)
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Options for command execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Run the command with privilege escalation
    pub escalate: bool,
    /// User to escalate to (default: root)
    pub escalate_user: Option<String>,
    /// Method for privilege escalation (sudo, su, doas)
    pub escalate_method: Option<String>,
}

impl ExecuteOptions {
    /// Create new execute options
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable privilege escalation
    pub fn with_escalation(mut self, method: Option<String>, user: Option<String>) -> Self {
        self.escalate = true;
        self.escalate_method = method;
        self.escalate_user = user;
        self
    }
}

/// The main connection trait that all transport implementations must implement
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the connection identifier (user@host or hostname)
    fn identifier(&self) -> &str;

    /// Execute a command on the remote host
    async fn execute(
        &self,
        command: &str,
        options: Option<ExecuteOptions>,
    ) -> ConnectionResult<CommandResult>;

    /// Write content directly to a remote file as the login user
    async fn upload_content(&self, content: &[u8], remote_path: &Path) -> ConnectionResult<()>;

    /// Read the content of a remote file
    async fn download_content(&self, remote_path: &Path) -> ConnectionResult<Vec<u8>>;

    /// Check if a path exists on the remote host
    async fn path_exists(&self, path: &Path) -> ConnectionResult<bool>;

    /// Check if a path is a directory on the remote host
    async fn is_directory(&self, path: &Path) -> ConnectionResult<bool>;

    /// Close the connection
    async fn close(&self) -> ConnectionResult<()>;
}

/// Build the escalated form of a rendered command line.
///
/// The inner command is passed to `sh -c` as a single quoted word so the
/// escalation wrapper composes with working-directory and environment
/// prefixes already present in the line.
pub(crate) fn escalate_command(command: &str, options: &ExecuteOptions) -> String {
    if !options.escalate {
        return command.to_string();
    }

    let method = options.escalate_method.as_deref().unwrap_or("sudo");
    let user = options.escalate_user.as_deref().unwrap_or("root");
    let quoted = shell_words::quote(command);

    match method {
        "su" => format!("su - {} -c {}", user, quoted),
        "doas" => format!("doas -u {} sh -c {}", user, quoted),
        _ => format!("sudo -u {} -- sh -c {}", user, quoted),
    }
}
