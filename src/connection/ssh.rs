//! SSH connection module
//!
//! This module provides SSH connectivity using the russh crate, a pure
//! Rust, async-native SSH implementation. Commands run over exec channels;
//! file content moves over SFTP. One connection serves the whole session.

use async_trait::async_trait;
use russh::client::{Handle, Handler};
use russh::keys::key::PublicKey;
use russh::keys::load_secret_key;
use russh::{ChannelMsg, Disconnect};
use russh_keys::agent::client::AgentClient;
use russh_sftp::client::SftpSession;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::{
    escalate_command, CommandResult, Connection, ConnectionError, ConnectionResult, ExecuteOptions,
};

/// Authentication settings for an SSH connection.
#[derive(Debug, Clone)]
pub struct SshAuth {
    /// Explicit identity file to try first
    pub identity_file: Option<PathBuf>,
    /// Password for password authentication (and key passphrases)
    pub password: Option<String>,
    /// Whether to try the SSH agent before keys
    pub use_agent: bool,
    /// Timeout for the initial TCP connect and handshake
    pub connect_timeout: Duration,
}

impl Default for SshAuth {
    fn default() -> Self {
        Self {
            identity_file: None,
            password: None,
            use_agent: true,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Client handler with accept-new host key behavior.
///
/// Matches `StrictHostKeyChecking=accept-new`: the key presented on first
/// contact is trusted. Single-target provisioning of a freshly imaged board
/// has no prior known_hosts entry to verify against.
struct ClientHandler {
    host: String,
}

#[async_trait]
impl Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!(host = %self.host, "Accepting server host key");
        Ok(true)
    }
}

/// SSH connection to the provisioning target.
pub struct SshConnection {
    /// Session identifier (user@host:port)
    identifier: String,
    /// Russh client handle.
    /// Read lock: channel operations; write lock: close only.
    handle: Arc<RwLock<Option<Handle<ClientHandler>>>>,
}

impl SshConnection {
    /// Connect and authenticate to `user@host:port`.
    pub async fn connect(
        host: &str,
        port: u16,
        user: &str,
        auth: &SshAuth,
    ) -> ConnectionResult<Self> {
        let identifier = format!("{}@{}:{}", user, host, port);
        debug!(host = %host, port = %port, user = %user, "Connecting via SSH");

        let mut config = russh::client::Config::default();
        config.inactivity_timeout = None;
        let config = Arc::new(config);

        let addr = format!("{}:{}", host, port);
        let socket = tokio::time::timeout(
            auth.connect_timeout,
            tokio::net::TcpStream::connect(&addr),
        )
        .await
        .map_err(|_| ConnectionError::Timeout(auth.connect_timeout.as_secs()))?
        .map_err(|e| {
            ConnectionError::ConnectionFailed(format!("Failed to connect to {}: {}", addr, e))
        })?;

        socket.set_nodelay(true).map_err(|e| {
            ConnectionError::ConnectionFailed(format!("Failed to set TCP_NODELAY: {}", e))
        })?;

        let handler = ClientHandler {
            host: host.to_string(),
        };

        let mut session = russh::client::connect_stream(config, socket, handler)
            .await
            .map_err(|e| {
                ConnectionError::ConnectionFailed(format!("SSH handshake failed: {}", e))
            })?;

        Self::authenticate(&mut session, user, auth).await?;

        debug!(identifier = %identifier, "SSH connection established");
        Ok(Self {
            identifier,
            handle: Arc::new(RwLock::new(Some(session))),
        })
    }

    /// Perform SSH authentication: agent, explicit identity file, default
    /// identity files, then password.
    async fn authenticate(
        session: &mut Handle<ClientHandler>,
        user: &str,
        auth: &SshAuth,
    ) -> ConnectionResult<()> {
        if auth.use_agent && Self::try_agent_auth(session, user).await.is_ok() {
            debug!("Authenticated using SSH agent");
            return Ok(());
        }

        if let Some(identity_file) = &auth.identity_file {
            if Self::try_key_auth(session, user, identity_file, auth.password.as_deref())
                .await
                .is_ok()
            {
                debug!(key = %identity_file.display(), "Authenticated using key");
                return Ok(());
            }
        }

        for key_path in default_identity_files() {
            if Self::try_key_auth(session, user, &key_path, auth.password.as_deref())
                .await
                .is_ok()
            {
                debug!(key = %key_path.display(), "Authenticated using key");
                return Ok(());
            }
        }

        if let Some(password) = &auth.password {
            let authenticated = session
                .authenticate_password(user, password)
                .await
                .map_err(|e| {
                    ConnectionError::AuthenticationFailed(format!(
                        "Password authentication failed: {}",
                        e
                    ))
                })?;

            if authenticated {
                debug!("Authenticated using password");
                return Ok(());
            }
        }

        Err(ConnectionError::AuthenticationFailed(
            "All authentication methods failed".to_string(),
        ))
    }

    /// Try SSH agent authentication via SSH_AUTH_SOCK.
    async fn try_agent_auth(
        session: &mut Handle<ClientHandler>,
        user: &str,
    ) -> ConnectionResult<()> {
        let mut agent = AgentClient::connect_env().await.map_err(|e| {
            ConnectionError::AuthenticationFailed(format!("Failed to connect to SSH agent: {}", e))
        })?;

        let identities = agent.request_identities().await.map_err(|e| {
            ConnectionError::AuthenticationFailed(format!("Failed to get agent identities: {}", e))
        })?;

        if identities.is_empty() {
            return Err(ConnectionError::AuthenticationFailed(
                "SSH agent has no identities".to_string(),
            ));
        }

        debug!(identity_count = %identities.len(), "Found SSH agent identities");

        for identity in identities {
            let (returned_agent, result) = session
                .authenticate_future(user, identity.clone(), agent)
                .await;
            agent = returned_agent;

            match result {
                Ok(true) => {
                    debug!("SSH agent authentication successful");
                    return Ok(());
                }
                Ok(false) => {
                    trace!("Identity rejected, trying next");
                }
                Err(e) => {
                    trace!(error = %e, "Agent authentication attempt failed");
                }
            }
        }

        Err(ConnectionError::AuthenticationFailed(
            "All SSH agent identities rejected".to_string(),
        ))
    }

    /// Try key-based authentication with one identity file.
    async fn try_key_auth(
        session: &mut Handle<ClientHandler>,
        user: &str,
        key_path: &Path,
        passphrase: Option<&str>,
    ) -> ConnectionResult<()> {
        if !key_path.exists() {
            return Err(ConnectionError::AuthenticationFailed(format!(
                "Key file not found: {}",
                key_path.display()
            )));
        }

        let key_pair = load_secret_key(key_path, passphrase).map_err(|e| {
            ConnectionError::AuthenticationFailed(format!(
                "Failed to load key {}: {}",
                key_path.display(),
                e
            ))
        })?;

        let authenticated = session
            .authenticate_publickey(user, Arc::new(key_pair))
            .await
            .map_err(|e| {
                ConnectionError::AuthenticationFailed(format!(
                    "Key authentication failed for {}: {}",
                    key_path.display(),
                    e
                ))
            })?;

        if authenticated {
            Ok(())
        } else {
            Err(ConnectionError::AuthenticationFailed(
                "Key authentication failed".to_string(),
            ))
        }
    }

    /// Open an SFTP session on a fresh channel.
    async fn open_sftp(handle: &Handle<ClientHandler>) -> ConnectionResult<SftpSession> {
        let channel = handle.channel_open_session().await.map_err(|e| {
            ConnectionError::TransferFailed(format!("Failed to open SFTP channel: {}", e))
        })?;

        channel.request_subsystem(true, "sftp").await.map_err(|e| {
            ConnectionError::TransferFailed(format!("Failed to request SFTP subsystem: {}", e))
        })?;

        SftpSession::new(channel.into_stream()).await.map_err(|e| {
            ConnectionError::TransferFailed(format!("Failed to start SFTP session: {}", e))
        })
    }
}

#[async_trait]
impl Connection for SshConnection {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn execute(
        &self,
        command: &str,
        options: Option<ExecuteOptions>,
    ) -> ConnectionResult<CommandResult> {
        let options = options.unwrap_or_default();
        let full_command = escalate_command(command, &options);

        trace!(command = %full_command, "Executing remote command");

        let handle_guard = self.handle.read().await;
        let handle = handle_guard
            .as_ref()
            .ok_or(ConnectionError::ConnectionClosed)?;

        let mut channel = handle.channel_open_session().await.map_err(|e| {
            ConnectionError::ExecutionFailed(format!("Failed to open channel: {}", e))
        })?;

        drop(handle_guard);

        channel.exec(true, full_command).await.map_err(|e| {
            ConnectionError::ExecutionFailed(format!("Failed to execute command: {}", e))
        })?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_code = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => {
                    stdout.extend_from_slice(data);
                }
                ChannelMsg::ExtendedData { ref data, ext } => {
                    // Extended data type 1 is stderr
                    if ext == 1 {
                        stderr.extend_from_slice(data);
                    }
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    exit_code = Some(exit_status);
                }
                ChannelMsg::Close => {
                    break;
                }
                _ => {}
            }
        }

        let _ = channel.eof().await;

        // No exit status means the channel died under the command
        let exit_code: i32 = exit_code.map(|e| e as i32).unwrap_or(i32::MAX);
        let stdout_str = String::from_utf8_lossy(&stdout).to_string();
        let stderr_str = String::from_utf8_lossy(&stderr).to_string();

        trace!(exit_code = %exit_code, "Command completed");

        if exit_code == 0 {
            Ok(CommandResult::success(stdout_str, stderr_str))
        } else {
            Ok(CommandResult::failure(exit_code, stdout_str, stderr_str))
        }
    }

    async fn upload_content(&self, content: &[u8], remote_path: &Path) -> ConnectionResult<()> {
        debug!(remote = %remote_path.display(), size = %content.len(), "Uploading content via SFTP");

        let handle_guard = self.handle.read().await;
        let handle = handle_guard
            .as_ref()
            .ok_or(ConnectionError::ConnectionClosed)?;

        let sftp = Self::open_sftp(handle).await?;
        drop(handle_guard);

        let remote_path_str = remote_path.to_string_lossy().to_string();
        let mut remote_file = sftp.create(&remote_path_str).await.map_err(|e| {
            ConnectionError::TransferFailed(format!(
                "Failed to create remote file {}: {}",
                remote_path.display(),
                e
            ))
        })?;

        remote_file.write_all(content).await.map_err(|e| {
            ConnectionError::TransferFailed(format!("Failed to write to remote file: {}", e))
        })?;

        drop(remote_file);

        Ok(())
    }

    async fn download_content(&self, remote_path: &Path) -> ConnectionResult<Vec<u8>> {
        debug!(remote = %remote_path.display(), "Downloading content via SFTP");

        let handle_guard = self.handle.read().await;
        let handle = handle_guard
            .as_ref()
            .ok_or(ConnectionError::ConnectionClosed)?;

        let sftp = Self::open_sftp(handle).await?;
        drop(handle_guard);

        let remote_path_str = remote_path.to_string_lossy().to_string();
        let mut remote_file = sftp.open(&remote_path_str).await.map_err(|e| {
            ConnectionError::TransferFailed(format!(
                "Failed to open remote file {}: {}",
                remote_path.display(),
                e
            ))
        })?;

        let mut content = Vec::new();
        remote_file.read_to_end(&mut content).await.map_err(|e| {
            ConnectionError::TransferFailed(format!("Failed to read remote file: {}", e))
        })?;

        Ok(content)
    }

    async fn path_exists(&self, path: &Path) -> ConnectionResult<bool> {
        trace!(path = %path.display(), "Checking if path exists via SFTP");

        let handle_guard = self.handle.read().await;
        let handle = handle_guard
            .as_ref()
            .ok_or(ConnectionError::ConnectionClosed)?;

        let sftp = Self::open_sftp(handle).await?;
        drop(handle_guard);

        let path_str = path.to_string_lossy().to_string();
        match sftp.try_exists(&path_str).await {
            Ok(exists) => Ok(exists),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Error checking path existence");
                Ok(false)
            }
        }
    }

    async fn is_directory(&self, path: &Path) -> ConnectionResult<bool> {
        trace!(path = %path.display(), "Checking if path is directory via SFTP");

        let handle_guard = self.handle.read().await;
        let handle = handle_guard
            .as_ref()
            .ok_or(ConnectionError::ConnectionClosed)?;

        let sftp = Self::open_sftp(handle).await?;
        drop(handle_guard);

        let path_str = path.to_string_lossy().to_string();
        match sftp.metadata(&path_str).await {
            Ok(attrs) => Ok(attrs.is_dir()),
            Err(_) => Ok(false),
        }
    }

    async fn close(&self) -> ConnectionResult<()> {
        let handle = self.handle.write().await.take();
        if let Some(handle) = handle {
            let _ = handle
                .disconnect(Disconnect::ByApplication, "Connection closed by client", "en")
                .await;
        }
        Ok(())
    }
}

/// Default identity files to try, in order.
fn default_identity_files() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    let ssh_dir = home.join(".ssh");
    ["id_ed25519", "id_rsa", "id_ecdsa"]
        .iter()
        .map(|name| ssh_dir.join(name))
        .filter(|path| path.exists())
        .collect()
}
