//! Package-manager collaborator (apt) with session memoization.
//!
//! Every "ensure" style operation consults the session memo store first and
//! marks it after success, so composing tasks can ask for the same package
//! repeatedly at the cost of a single remote round trip per session.

use tracing::debug;

use crate::command::Cmd;
use crate::error::Result;
use crate::session::MemoDomain;
use crate::tasks::TaskContext;

/// Refresh the package cache. Runs at most once per session.
pub async fn update(ctx: &TaskContext) -> Result<()> {
    if ctx.session.cache_updated() {
        debug!("package cache already updated this session");
        return Ok(());
    }
    ctx.reporter.step("updating package lists");
    ctx.target
        .run_privileged(
            &Cmd::new("apt-get")
                .arg("update")
                .env("DEBIAN_FRONTEND", "noninteractive"),
        )
        .await?;
    ctx.session.mark_cache_updated();
    Ok(())
}

/// Upgrade all installed packages.
pub async fn upgrade(ctx: &TaskContext) -> Result<()> {
    ctx.target
        .run_privileged(
            &Cmd::new("apt-get")
                .args(["upgrade", "-y"])
                .env("DEBIAN_FRONTEND", "noninteractive"),
        )
        .await?;
    Ok(())
}

/// Clear the local package cache.
pub async fn clean(ctx: &TaskContext) -> Result<()> {
    ctx.target
        .run_privileged(&Cmd::new("apt-get").arg("clean"))
        .await?;
    Ok(())
}

/// Is the package already installed on the target?
async fn installed(ctx: &TaskContext, name: &str) -> Result<bool> {
    // dpkg-query exits non-zero for packages it has never heard of
    let check = ctx
        .target
        .run_tolerant(&Cmd::new("dpkg-query").args(["-W", "-f", "${Status}"]).arg(name))
        .await?;
    Ok(check.success && check.stdout.contains("install ok installed"))
}

/// Make sure a package is installed. Checked at most once per session per
/// name regardless of how many tasks ask for it.
pub async fn ensure(ctx: &TaskContext, name: &str) -> Result<()> {
    if ctx.session.checked(MemoDomain::Package, name) {
        debug!(package = %name, "package already ensured this session");
        return Ok(());
    }
    ctx.reporter.step(&format!("checking {}", name));
    if !installed(ctx, name).await? {
        ctx.target
            .run_privileged(
                &Cmd::new("apt-get")
                    .args(["install", "-y"])
                    .arg(name)
                    .env("DEBIAN_FRONTEND", "noninteractive"),
            )
            .await?;
    }
    ctx.session.mark(MemoDomain::Package, name);
    Ok(())
}

/// Install a tool globally via pip. Checked at most once per session per
/// name; pip itself is ensured first.
pub async fn ensure_global_tool(ctx: &TaskContext, name: &str) -> Result<()> {
    if ctx.session.checked(MemoDomain::GlobalTool, name) {
        debug!(tool = %name, "global tool already ensured this session");
        return Ok(());
    }
    ensure(ctx, "python3-pip").await?;
    ctx.reporter.step(&format!("checking {}", name));
    ctx.target
        .run_privileged(&Cmd::new("pip3").arg("install").arg(name))
        .await?;
    ctx.session.mark(MemoDomain::GlobalTool, name);
    Ok(())
}

/// Download a file from a URL and install it executable at `dest`,
/// replacing any existing copy. Make sure you trust the URL.
pub async fn install_binary_from_url(ctx: &TaskContext, url: &str, dest: &str) -> Result<()> {
    ctx.reporter.step(&format!("installing {} to {}", url, dest));
    if ctx.target.file_exists(dest).await? {
        ctx.target
            .run_privileged(&Cmd::new("rm").arg(dest))
            .await?;
    }
    ctx.target
        .run_privileged(&Cmd::new("wget").arg(url).arg("-O").arg(dest))
        .await?;
    ctx.target
        .run_privileged(&Cmd::new("chmod").arg("+x").arg(dest))
        .await?;
    Ok(())
}
