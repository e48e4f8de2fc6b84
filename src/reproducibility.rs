use serde::Serialize;
use std::process::Command;

/// Version-control state of the working tree the process runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitStatus {
    #[serde(rename = "git_root")]
    pub root: String,
    /// Remote URL joined with the current commit, empty when no remote is
    /// configured.
    #[serde(rename = "git_url")]
    pub url: String,
    #[serde(rename = "git_has_uncommitted_changes")]
    pub has_uncommitted_changes: bool,
}

/// How and when the process was invoked. Captured once from the real
/// environment in production; tests construct the struct directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunContext {
    pub command_line: String,
    pub time: String,
    #[serde(flatten)]
    pub git: Option<GitStatus>,
}

impl RunContext {
    /// Reads process arguments, the current local time and, when the process
    /// runs inside a git working tree, the git state. A missing git binary or
    /// a directory outside any working tree silently yields no git block.
    pub fn capture() -> Self {
        Self {
            command_line: std::env::args().collect::<Vec<_>>().join(" "),
            time: chrono::Local::now().format("%c").to_string(),
            git: probe_git(),
        }
    }
}

fn probe_git() -> Option<GitStatus> {
    let root = git_output(&["rev-parse", "--show-toplevel"])?;
    let commit = git_output(&["rev-parse", "HEAD"])?;
    let url = git_output(&["remote", "get-url", "origin"])
        .map(|remote| format!("{}/tree/{}", remote.trim_end_matches(".git"), commit))
        .unwrap_or_default();
    let has_uncommitted_changes = !git_output(&["status", "--porcelain"])?.is_empty();
    Some(GitStatus {
        root,
        url,
        has_uncommitted_changes,
    })
}

fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    Some(stdout.trim().to_string())
}
