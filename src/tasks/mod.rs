//! Provisioning tasks.
//!
//! Each task is a fixed, linear sequence of remote steps bringing one
//! aspect of the target to its desired state. Tasks compose by plain
//! function calls and share state only through the session memo store.
//! A failing step halts the task and every caller; there is no partial
//! recovery.

pub mod deploy;
pub mod dotfiles;
pub mod firewall;
pub mod firmware;
pub mod motd;
pub mod mpd;
pub mod packages;
pub mod python;
pub mod system;
pub mod wifi;

use std::future::Future;

use crate::config::DotfilesConfig;
use crate::error::{Error, Result};
use crate::output::Reporter;
use crate::session::Session;
use crate::target::Target;

/// Everything a task needs: the remote target, the per-invocation session,
/// the progress reporter, and the bits of configuration tasks consume.
pub struct TaskContext {
    /// The remote host being provisioned
    pub target: Target,
    /// Session-scoped memo store
    pub session: Session,
    /// Progress output
    pub reporter: Reporter,
    /// Dotfiles task settings
    pub dotfiles: DotfilesConfig,
}

impl TaskContext {
    /// Create a context with a fresh session.
    pub fn new(target: Target, dotfiles: DotfilesConfig, reporter: Reporter) -> Self {
        Self {
            target,
            session: Session::new(),
            reporter,
            dotfiles,
        }
    }
}

/// Run a task body, wrapping any failure with the task's name so the user
/// sees where a sequence stopped.
pub async fn run_named<F>(name: &str, task: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    task.await.map_err(|e| Error::task_failed(name, e))
}
