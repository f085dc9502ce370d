//! Version control system integration for fetching diffs.
//!
//! Supports both jj (Jujutsu) and git repositories.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context};
use tracing::debug;

/// Detected VCS type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsType {
    Jj,
    Git,
}

impl VcsType {
    const fn program(self) -> &'static str {
        match self {
            Self::Jj => "jj",
            Self::Git => "git",
        }
    }
}

/// Detect the VCS type for a directory
#[must_use]
pub fn detect_vcs(path: &Path) -> Option<VcsType> {
    // Check for jj first (it can coexist with git)
    if path.join(".jj").exists() {
        return Some(VcsType::Jj);
    }
    if path.join(".git").exists() {
        return Some(VcsType::Git);
    }
    None
}

fn require_vcs(repo_path: &Path) -> anyhow::Result<VcsType> {
    detect_vcs(repo_path)
        .with_context(|| format!("No jj or git repository at {}", repo_path.display()))
}

/// Full git-format diff of every file between two revisions.
///
/// If `to` is None, diffs against the working copy.
///
/// # Errors
///
/// Returns an error if no repository is found or the VCS command fails.
pub fn full_diff(repo_path: &Path, from: &str, to: Option<&str>) -> anyhow::Result<String> {
    let vcs = require_vcs(repo_path)?;
    let mut cmd = Command::new(vcs.program());
    cmd.current_dir(repo_path);

    match vcs {
        VcsType::Jj => {
            cmd.arg("diff").arg("--git");
            cmd.arg("--from").arg(from);
            if let Some(to) = to {
                cmd.arg("--to").arg(to);
            }
        }
        VcsType::Git => {
            cmd.arg("diff");
            if let Some(to) = to {
                cmd.arg(format!("{from}..{to}"));
            } else {
                cmd.arg(from);
            }
        }
    }

    run(vcs, &mut cmd)
}

/// Full description of a revision.
///
/// # Errors
///
/// Returns an error if no repository is found or the VCS command fails.
pub fn commit_message(repo_path: &Path, rev: &str) -> anyhow::Result<String> {
    let vcs = require_vcs(repo_path)?;
    let mut cmd = Command::new(vcs.program());
    cmd.current_dir(repo_path);

    match vcs {
        VcsType::Jj => {
            cmd.args(["log", "--no-graph", "-r", rev, "-T", "description"]);
        }
        VcsType::Git => {
            cmd.args(["log", "-1", "--format=%B", rev]);
        }
    }

    run(vcs, &mut cmd)
}

fn run(vcs: VcsType, cmd: &mut Command) -> anyhow::Result<String> {
    debug!(?cmd, "running vcs command");
    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {}", vcs.program()))?;
    if !output.status.success() {
        bail!(
            "{} failed: {}",
            vcs.program(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_vcs_none() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(detect_vcs(temp.path()), None);
        assert!(full_diff(temp.path(), "@-", None).is_err());
    }

    #[test]
    fn test_detect_vcs_prefers_jj() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        assert_eq!(detect_vcs(temp.path()), Some(VcsType::Git));
        std::fs::create_dir(temp.path().join(".jj")).unwrap();
        assert_eq!(detect_vcs(temp.path()), Some(VcsType::Jj));
    }
}
