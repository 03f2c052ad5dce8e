//! Structured shell command construction.
//!
//! Every command sent to a remote host is built as a program plus an
//! argument vector and only rendered to a shell line at the transport
//! boundary, with each word quoted by `shell-words`. Caller-supplied
//! parameters (an SSID, a pre-shared key, a port) can never change the
//! shape of the command they are passed to.

use std::fmt;

/// A shell command under construction.
///
/// # Example
///
/// ```
/// use piforge::Cmd;
///
/// let cmd = Cmd::new("ufw")
///     .args(["allow", "proto", "tcp", "from", "any", "to", "any", "port"])
///     .arg("6600");
/// assert_eq!(cmd.to_shell(), "ufw allow proto tcp from any to any port 6600");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<String>,
}

impl Cmd {
    /// Create a new command for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the command. The key must be a
    /// plain identifier; the value is quoted when rendered.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Run the command from the given working directory.
    pub fn cwd(mut self, dir: impl Into<String>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Render to a single shell line with every word quoted.
    pub fn to_shell(&self) -> String {
        let mut line = String::new();

        if let Some(cwd) = &self.cwd {
            line.push_str("cd ");
            line.push_str(&shell_words::quote(cwd));
            line.push_str(" && ");
        }

        for (key, value) in &self.env {
            line.push_str(key);
            line.push('=');
            line.push_str(&shell_words::quote(value));
            line.push(' ');
        }

        let words: Vec<&str> = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect();
        line.push_str(&shell_words::join(words));
        line
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_shell())
    }
}
