//! # piforge
//!
//! A fast, safe remote provisioning tool for single-board computers.
//!
//! piforge brings one board to a known-good state over SSH: packages,
//! firewall rules, dotfiles, a media daemon, a colour message-of-the-day,
//! WiFi configuration, and firmware updates. Tasks are short, strictly
//! sequential sequences of remote steps built on a small core:
//!
//! - a [`Session`] memo store so composed tasks never repeat an
//!   idempotent check within one invocation,
//! - an atomic file writer ([`fs::write_file`]) that stages to a temp
//!   path and moves into place through the privileged channel, so the
//!   target path never holds a partial file,
//! - a structured command builder ([`Cmd`]) that keeps caller-supplied
//!   parameters from ever being parsed as shell syntax,
//! - a [`Target`] executor shim over pluggable [`connection`] transports
//!   (SSH via russh, or local execution).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use piforge::config::DotfilesConfig;
//! use piforge::connection::{SshAuth, SshConnection};
//! use piforge::output::Reporter;
//! use piforge::tasks::{self, TaskContext};
//! use piforge::{Escalation, Target};
//!
//! # async fn run() -> piforge::Result<()> {
//! let conn = SshConnection::connect("rpi.local", 22, "pi", &SshAuth::default()).await?;
//! let target = Target::new(Arc::new(conn), Escalation::default());
//! let ctx = TaskContext::new(target, DotfilesConfig::default(), Reporter::default());
//!
//! tasks::deploy::deploy(&ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod fs;
pub mod output;
pub mod pkg;
pub mod session;
pub mod target;
pub mod tasks;
pub mod template;

pub use command::Cmd;
pub use error::{Error, Result};
pub use session::{MemoDomain, Session};
pub use target::{Escalation, Target};
