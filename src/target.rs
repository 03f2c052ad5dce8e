//! Remote executor shim over a [`Connection`].
//!
//! A [`Target`] couples the connection with the privilege-escalation
//! settings and translates non-zero exit codes into [`Error::RemoteCommand`]
//! so tasks can use `?` on every step. Call sites that tolerate a failing
//! command use the `_tolerant` variants, which hand the raw result back.

use std::path::Path;
use std::sync::Arc;

use crate::command::Cmd;
use crate::connection::{CommandResult, Connection, ExecuteOptions};
use crate::error::{Error, Result};

/// Privilege escalation settings for a target.
#[derive(Debug, Clone)]
pub struct Escalation {
    /// Escalation method: sudo, su, or doas
    pub method: String,
    /// User to escalate to
    pub user: String,
}

impl Default for Escalation {
    fn default() -> Self {
        Self {
            method: "sudo".to_string(),
            user: "root".to_string(),
        }
    }
}

/// Handle to the single remote host being provisioned.
#[derive(Clone)]
pub struct Target {
    connection: Arc<dyn Connection>,
    escalation: Escalation,
}

impl Target {
    /// Create a target over an established connection.
    pub fn new(connection: Arc<dyn Connection>, escalation: Escalation) -> Self {
        Self {
            connection,
            escalation,
        }
    }

    /// The connection identifier (user@host).
    pub fn identifier(&self) -> &str {
        self.connection.identifier()
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    fn escalated_options(&self) -> ExecuteOptions {
        ExecuteOptions::new().with_escalation(
            Some(self.escalation.method.clone()),
            Some(self.escalation.user.clone()),
        )
    }

    async fn run_checked(&self, cmd: &Cmd, options: Option<ExecuteOptions>) -> Result<CommandResult> {
        let line = cmd.to_shell();
        let result = self.connection.execute(&line, options).await?;
        if result.success {
            Ok(result)
        } else {
            Err(Error::remote_command(line, result.exit_code, result.stderr))
        }
    }

    /// Run a command as the login user. Non-zero exit is an error.
    pub async fn run(&self, cmd: &Cmd) -> Result<CommandResult> {
        self.run_checked(cmd, None).await
    }

    /// Run a command through the privileged channel. Non-zero exit is an error.
    pub async fn run_privileged(&self, cmd: &Cmd) -> Result<CommandResult> {
        self.run_checked(cmd, Some(self.escalated_options())).await
    }

    /// Run a command as the login user, returning the result even on a
    /// non-zero exit. Transport failures still propagate.
    pub async fn run_tolerant(&self, cmd: &Cmd) -> Result<CommandResult> {
        Ok(self.connection.execute(&cmd.to_shell(), None).await?)
    }

    /// Privileged variant of [`Target::run_tolerant`].
    pub async fn run_privileged_tolerant(&self, cmd: &Cmd) -> Result<CommandResult> {
        Ok(self
            .connection
            .execute(&cmd.to_shell(), Some(self.escalated_options()))
            .await?)
    }

    /// Does a file or directory exist at `path` on the target?
    pub async fn file_exists(&self, path: &str) -> Result<bool> {
        Ok(self.connection.path_exists(Path::new(path)).await?)
    }

    /// Is `path` an existing directory on the target?
    pub async fn dir_exists(&self, path: &str) -> Result<bool> {
        Ok(self.connection.is_directory(Path::new(path)).await?)
    }

    /// Write `content` to `path` as the login user.
    pub async fn upload(&self, content: &[u8], path: &str) -> Result<()> {
        Ok(self
            .connection
            .upload_content(content, Path::new(path))
            .await?)
    }

    /// Read the content of `path` as the login user.
    pub async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.connection.download_content(Path::new(path)).await?)
    }
}
