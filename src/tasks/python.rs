//! Global Python environment setup.

use crate::error::Result;
use crate::fs;
use crate::pkg;
use crate::tasks::TaskContext;

/// Tools installed globally via pip.
const GLOBAL_TOOLS: &[&str] = &["ipython", "ipdb", "virtualenv", "virtualenvwrapper"];

/// Lines added to .bashrc so virtualenvwrapper is available in every shell.
pub const BASHRC_LINES: &[&str] = &[
    "export WORKON_HOME=~/.virtualenvs",
    ". $(which virtualenvwrapper.sh)",
];

/// Installs virtualenvwrapper and some common global python packages.
pub async fn setup_python(ctx: &TaskContext) -> Result<()> {
    ctx.reporter.task("Setting up global python environment");

    for tool in GLOBAL_TOOLS {
        pkg::ensure_global_tool(ctx, tool).await?;
    }

    ctx.reporter.step("adding virtualenvwrapper to .bashrc");
    for line in BASHRC_LINES {
        fs::append_line(&ctx.target, ".bashrc", line).await?;
    }
    Ok(())
}
