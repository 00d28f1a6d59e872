use crate::git::commit::{Commit, parse_oneline_log, short_hash};
use crate::shell::{CommandOutput, CommandRunner, command_line};
use std::path::{Path, PathBuf};
use tracing::debug;

const GIT: &str = "git";

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Error running git command '{command}': {stderr}")]
    Command { command: String, stderr: String },

    #[error("Failed to start git command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No editor configured in git config, $EDITOR or $VISUAL.")]
    NoEditor,
}

/// The Heroku git remote for an application.
pub fn remote_url(app_name: &str) -> String {
    format!("git@heroku.com:{app_name}.git")
}

/// Git commands bound to one work tree. Every command passes `--git-dir`
/// and `--work-tree` so the process working directory does not matter.
pub struct GitRepo<R> {
    work_dir: PathBuf,
    runner: R,
}

impl<R: CommandRunner> GitRepo<R> {
    pub fn new(work_dir: &Path, runner: R) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            runner,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn args(&self, command: &[&str]) -> Vec<String> {
        let git_dir = self.work_dir.join(".git");
        let mut args = vec![
            format!("--git-dir={}", git_dir.display()),
            format!("--work-tree={}", self.work_dir.display()),
        ];
        args.extend(command.iter().map(|arg| arg.to_string()));
        args
    }

    async fn output(&self, command: &[&str]) -> Result<CommandOutput, GitError> {
        let args = self.args(command);
        self.runner
            .output(GIT, &args)
            .await
            .map_err(|source| GitError::Spawn {
                command: command_line(GIT, &args),
                source,
            })
    }

    /// Runs a git command (without the `git` prefix) and returns stdout.
    pub async fn run_git_cmd(&self, command: &[&str]) -> Result<String, GitError> {
        let output = self.output(command).await?;
        if !output.success() {
            return Err(GitError::Command {
                command: command_line(GIT, &self.args(command)),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    pub async fn current_branch(&self) -> Result<String, GitError> {
        Ok(self
            .run_git_cmd(&["rev-parse", "--abbrev-ref", "HEAD"])
            .await?
            .trim()
            .to_string())
    }

    /// Short hash of the latest commit on `branch`.
    pub async fn branch_head(&self, branch: &str) -> Result<String, GitError> {
        Ok(short_hash(&self.run_git_cmd(&["rev-parse", branch]).await?))
    }

    /// Non-merge commits after `commit_from` up to `commit_to`.
    pub async fn commits(&self, commit_from: &str, commit_to: &str) -> Result<Vec<Commit>, GitError> {
        let range = format!("{commit_from}..{commit_to}");
        let raw = self
            .run_git_cmd(&["log", "--oneline", "--no-merges", &range])
            .await?;
        Ok(parse_oneline_log(&raw))
    }

    /// Names of the files changed between two commits, sorted.
    pub async fn files(&self, commit_from: &str, commit_to: &str) -> Result<Vec<String>, GitError> {
        let range = format!("{commit_from}..{commit_to}");
        let raw = self.run_git_cmd(&["diff", "--name-only", &range]).await?;
        let mut files: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        files.sort();
        Ok(files)
    }

    /// Creates the annotated tag `tag` on `commit`.
    pub async fn apply_tag(&self, commit: &str, tag: &str, message: &str) -> Result<(), GitError> {
        self.run_git_cmd(&["tag", "-a", tag, "-m", message, commit])
            .await?;
        Ok(())
    }

    /// `core.editor` from git config, else `fallback`.
    pub async fn editor(&self, fallback: Option<&str>) -> Result<String, GitError> {
        let configured = match self.output(&["config", "--get", "core.editor"]).await {
            Ok(output) if output.success() => Some(output.stdout.trim().to_string()),
            Ok(output) => {
                debug!("core.editor not set (exit status {})", output.status_code);
                None
            }
            Err(error) => {
                debug!("Could not read core.editor: {error}");
                None
            }
        };

        configured
            .filter(|editor| !editor.is_empty())
            .or_else(|| fallback.map(str::to_string))
            .filter(|editor| !editor.trim().is_empty())
            .ok_or(GitError::NoEditor)
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }
}
