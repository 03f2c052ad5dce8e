//! Dotfiles installation from a git repository.

use crate::command::Cmd;
use crate::error::{Error, Result};
use crate::tasks::TaskContext;

const CHECKOUT_DIR: &str = "/tmp/dotfiles";

/// Copies down the configured dotfiles repository and installs the files
/// relevant to the board into the login user's home directory.
pub async fn install_dotfiles(ctx: &TaskContext) -> Result<()> {
    ctx.reporter.task("Installing dotfiles");

    if ctx.target.dir_exists(CHECKOUT_DIR).await? {
        ctx.target
            .run(&Cmd::new("git").arg("pull").cwd(CHECKOUT_DIR))
            .await?;
    } else {
        ctx.target
            .run(
                &Cmd::new("git")
                    .args(["clone", ctx.dotfiles.repo.as_str(), "dotfiles"])
                    .cwd("/tmp"),
            )
            .await?;
    }

    let home = home_dir(ctx).await?;
    for file in &ctx.dotfiles.files {
        ctx.reporter.step(file);
        ctx.target
            .run(
                &Cmd::new("cp")
                    .arg("-r")
                    .arg(format!("{}/{}", CHECKOUT_DIR, file))
                    .arg(format!("{}/", home)),
            )
            .await?;
    }
    Ok(())
}

/// The login user's home directory on the target.
async fn home_dir(ctx: &TaskContext) -> Result<String> {
    let result = ctx.target.run(&Cmd::new("printenv").arg("HOME")).await?;
    let home = result.stdout.trim().to_string();
    if home.is_empty() {
        return Err(Error::remote_command(
            "printenv HOME",
            result.exit_code,
            "HOME is not set on the target",
        ));
    }
    Ok(home)
}
