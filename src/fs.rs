//! Remote file plumbing: atomic privileged writes and dotfile appends.

use crate::command::Cmd;
use crate::error::{Error, Result};
use crate::target::Target;

/// Write `contents` to `remote_path` as the privileged user without the
/// target path ever holding a partial file.
///
/// The contents are staged to a `mktemp` path as the login user, then
/// copied into place, chmod-ed, and the staging file removed, all through
/// the privileged channel. The observable state of `remote_path` is always
/// either the previous version or the complete new version.
///
/// If a step fails the operation aborts where it stands; the staging file
/// may be left behind. Cleanup on the failure path is best-effort only.
pub async fn write_file(
    target: &Target,
    remote_path: &str,
    contents: &str,
    mode: u32,
) -> Result<()> {
    let staged = target.run(&Cmd::new("mktemp")).await?;
    let staging_path = staged.stdout.trim().to_string();
    if staging_path.is_empty() {
        return Err(Error::remote_command(
            "mktemp",
            staged.exit_code,
            "mktemp returned no path",
        ));
    }

    target.upload(contents.as_bytes(), &staging_path).await?;

    target
        .run_privileged(&Cmd::new("cp").arg(staging_path.as_str()).arg(remote_path))
        .await?;
    target
        .run_privileged(
            &Cmd::new("chmod")
                .arg(format!("{:o}", mode))
                .arg(remote_path),
        )
        .await?;
    target
        .run_privileged(&Cmd::new("rm").arg(staging_path.as_str()))
        .await?;

    Ok(())
}

/// Append `line` to `path` as the login user unless an identical line is
/// already present. Returns whether the file changed.
///
/// Relative paths resolve against the login user's home directory, which
/// is where dotfiles live.
pub async fn append_line(target: &Target, path: &str, line: &str) -> Result<bool> {
    let existing = if target.file_exists(path).await? {
        String::from_utf8_lossy(&target.read_file(path).await?).into_owned()
    } else {
        String::new()
    };

    if existing.lines().any(|l| l == line) {
        return Ok(false);
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(line);
    updated.push('\n');

    target.upload(updated.as_bytes(), path).await?;
    Ok(true)
}
