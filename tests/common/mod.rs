//! Shared test utilities for the piforge test suite.
//!
//! Provides a `MockConnection` that stands in for the remote host: it
//! records every command and file transfer, serves scripted results, and
//! emulates just enough of a filesystem (`mktemp`, `cp`, `rm`, `chmod`)
//! for the atomic-write and task tests to observe end state.
//!
//! Include this module in your integration tests:
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use piforge::config::DotfilesConfig;
use piforge::connection::{
    CommandResult, Connection, ConnectionError, ConnectionResult, ExecuteOptions,
};
use piforge::output::Reporter;
use piforge::tasks::TaskContext;
use piforge::{Escalation, Target};

/// A command observed by the mock, with the channel it arrived on.
#[derive(Debug, Clone)]
pub struct RecordedCommand {
    /// The rendered command line
    pub line: String,
    /// Whether privilege escalation was requested
    pub escalated: bool,
}

/// A mock connection for testing purposes.
///
/// Commands are matched against scripted results first (substring match,
/// first registration wins), then against the built-in emulations, then
/// fall through to the default result.
pub struct MockConnection {
    identifier: String,
    commands: RwLock<Vec<RecordedCommand>>,
    scripted: RwLock<Vec<(String, CommandResult)>>,
    default_result: RwLock<CommandResult>,
    fail_after_n: AtomicU32,
    command_count: AtomicU32,
    fail_uploads: AtomicBool,
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    modes: RwLock<HashMap<PathBuf, u32>>,
    dirs: RwLock<HashSet<PathBuf>>,
    mktemp_counter: AtomicU32,
}

impl MockConnection {
    /// Create a new mock connection with the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            commands: RwLock::new(Vec::new()),
            scripted: RwLock::new(Vec::new()),
            default_result: RwLock::new(CommandResult::success(String::new(), String::new())),
            fail_after_n: AtomicU32::new(u32::MAX),
            command_count: AtomicU32::new(0),
            fail_uploads: AtomicBool::new(false),
            files: RwLock::new(HashMap::new()),
            modes: RwLock::new(HashMap::new()),
            dirs: RwLock::new(HashSet::new()),
            mktemp_counter: AtomicU32::new(0),
        }
    }

    /// Script the result for any command line containing `pattern`.
    pub fn set_result(&self, pattern: impl Into<String>, result: CommandResult) {
        self.scripted.write().push((pattern.into(), result));
    }

    /// Set the result for commands with no scripted match or emulation.
    pub fn set_default_result(&self, result: CommandResult) {
        *self.default_result.write() = result;
    }

    /// Fail every operation (transport-level) after N successful commands.
    pub fn fail_after(&self, n: u32) {
        self.fail_after_n.store(n, Ordering::SeqCst);
    }

    /// Make every upload fail (transport-level).
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Seed a file on the emulated host.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), content.into());
    }

    /// Seed a directory on the emulated host.
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.dirs.write().insert(path.into());
    }

    /// Content of an emulated file, if present.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.read().get(path.as_ref()).cloned()
    }

    /// Content of an emulated file as UTF-8.
    pub fn file_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.file(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Permission bits set on an emulated file via chmod.
    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        self.modes.read().get(path.as_ref()).copied()
    }

    /// Every command observed so far.
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.read().clone()
    }

    /// Every command line observed so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.commands.read().iter().map(|c| c.line.clone()).collect()
    }

    /// Number of observed commands containing `pattern`.
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.commands
            .read()
            .iter()
            .filter(|c| c.line.contains(pattern))
            .count()
    }

    fn check_should_fail(&self) -> bool {
        self.command_count.load(Ordering::SeqCst) >= self.fail_after_n.load(Ordering::SeqCst)
    }

    /// Emulate the handful of commands the atomic writer and tasks lean on.
    fn emulate(&self, line: &str) -> Option<CommandResult> {
        let words = shell_words::split(line).ok()?;
        match words.first().map(String::as_str) {
            Some("mktemp") if words.len() == 1 => {
                let n = self.mktemp_counter.fetch_add(1, Ordering::SeqCst);
                let path = format!("/tmp/piforge.mock.{}", n);
                self.files.write().insert(PathBuf::from(&path), Vec::new());
                Some(CommandResult::success(format!("{}\n", path), String::new()))
            }
            Some("cp") if words.len() == 3 => {
                let (src, dst) = (PathBuf::from(&words[1]), PathBuf::from(&words[2]));
                let content = self.files.read().get(&src).cloned();
                match content {
                    Some(content) => {
                        self.files.write().insert(dst, content);
                        Some(CommandResult::success(String::new(), String::new()))
                    }
                    None => Some(CommandResult::failure(
                        1,
                        String::new(),
                        format!("cp: cannot stat '{}': No such file or directory", words[1]),
                    )),
                }
            }
            // `cp -r` (dotfiles) is recorded but not emulated
            Some("rm") if words.len() == 2 => {
                let removed = self.files.write().remove(Path::new(&words[1])).is_some();
                if removed {
                    Some(CommandResult::success(String::new(), String::new()))
                } else {
                    Some(CommandResult::failure(
                        1,
                        String::new(),
                        format!("rm: cannot remove '{}': No such file or directory", words[1]),
                    ))
                }
            }
            Some("chmod") if words.len() == 3 => {
                if let Ok(mode) = u32::from_str_radix(&words[1], 8) {
                    self.modes.write().insert(PathBuf::from(&words[2]), mode);
                }
                Some(CommandResult::success(String::new(), String::new()))
            }
            Some("printenv") if words.get(1).map(String::as_str) == Some("HOME") => {
                Some(CommandResult::success("/home/pi\n".to_string(), String::new()))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn execute(
        &self,
        command: &str,
        options: Option<ExecuteOptions>,
    ) -> ConnectionResult<CommandResult> {
        if self.check_should_fail() {
            return Err(ConnectionError::ConnectionFailed(
                "Mock connection failed".to_string(),
            ));
        }

        self.command_count.fetch_add(1, Ordering::SeqCst);
        self.commands.write().push(RecordedCommand {
            line: command.to_string(),
            escalated: options.map(|o| o.escalate).unwrap_or(false),
        });

        for (pattern, result) in self.scripted.read().iter() {
            if command.contains(pattern.as_str()) {
                return Ok(result.clone());
            }
        }

        if let Some(result) = self.emulate(command) {
            return Ok(result);
        }

        Ok(self.default_result.read().clone())
    }

    async fn upload_content(&self, content: &[u8], remote_path: &Path) -> ConnectionResult<()> {
        if self.check_should_fail() || self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ConnectionError::TransferFailed(
                "Mock upload failed".to_string(),
            ));
        }

        self.files
            .write()
            .insert(remote_path.to_path_buf(), content.to_vec());
        Ok(())
    }

    async fn download_content(&self, remote_path: &Path) -> ConnectionResult<Vec<u8>> {
        if self.check_should_fail() {
            return Err(ConnectionError::TransferFailed(
                "Mock download failed".to_string(),
            ));
        }

        self.files
            .read()
            .get(remote_path)
            .cloned()
            .ok_or_else(|| {
                ConnectionError::TransferFailed(format!(
                    "File not found in mock filesystem: {:?}",
                    remote_path
                ))
            })
    }

    async fn path_exists(&self, path: &Path) -> ConnectionResult<bool> {
        Ok(self.files.read().contains_key(path) || self.dirs.read().contains(path))
    }

    async fn is_directory(&self, path: &Path) -> ConnectionResult<bool> {
        Ok(self.dirs.read().contains(path))
    }

    async fn close(&self) -> ConnectionResult<()> {
        Ok(())
    }
}

/// Build a task context over a mock connection with defaults.
pub fn test_context(conn: &Arc<MockConnection>) -> TaskContext {
    let connection: Arc<dyn Connection> = conn.clone();
    let target = Target::new(connection, Escalation::default());
    TaskContext::new(target, DotfilesConfig::default(), Reporter::new(false))
}
