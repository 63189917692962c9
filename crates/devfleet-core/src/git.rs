//! Subprocess wrappers over the `git` binary for repository scaffolding.
//!
//! Every function shells out to the first `git` found on PATH. Failures are
//! plain `Result`s; the setup pipeline downgrades them to report entries.

use crate::error::{FleetError, Result};
use crate::process::stderr_or_status;
use std::path::{Path, PathBuf};
use std::process::Command;

fn git_binary() -> Result<PathBuf> {
    which::which("git").map_err(|_| FleetError::GitNotFound)
}

fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let git = git_binary()?;
    let mut cmd = Command::new(git);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    let output = cmd.args(args).output()?;
    if !output.status.success() {
        return Err(FleetError::CommandFailed(format!(
            "git {}: {}",
            args.join(" "),
            stderr_or_status(&output)
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Clone `remote` into `target`. The target must not exist yet.
pub fn clone(remote: &str, target: &Path) -> Result<()> {
    if target.exists() {
        return Err(FleetError::CommandFailed(format!(
            "clone target already exists: {}",
            target.display()
        )));
    }
    let target_str = target.to_string_lossy();
    run_git(None, &["clone", remote, &target_str])?;
    Ok(())
}

pub fn fetch(repo: &Path) -> Result<()> {
    run_git(Some(repo), &["fetch"])?;
    Ok(())
}

/// Remote-tracking branch names (`origin/develop`, ...), symbolic refs
/// excluded.
pub fn remote_branches(repo: &Path) -> Result<Vec<String>> {
    let stdout = run_git(Some(repo), &["branch", "-r"])?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("->"))
        .map(str::to_string)
        .collect())
}

pub fn checkout(repo: &Path, branch: &str) -> Result<()> {
    run_git(Some(repo), &["checkout", branch])?;
    Ok(())
}

/// Check out `preferred` when it exists on the remote, `fallback` otherwise.
/// Returns the branch actually checked out.
pub fn checkout_with_fallback<'a>(
    repo: &Path,
    preferred: &'a str,
    fallback: &'a str,
) -> Result<&'a str> {
    let remote = format!("origin/{preferred}");
    let branch = if remote_branches(repo)?.iter().any(|b| b == &remote) {
        preferred
    } else {
        fallback
    };
    checkout(repo, branch)?;
    Ok(branch)
}
