use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::DateTime;
use git2::{
    BranchType, Commit, Delta, Diff, DiffFormat, Oid, PushOptions, RemoteCallbacks,
    Repository as Git2Repo, Sort,
};

use crate::domain::change_set::truncate_diff;
use crate::domain::{CommitInfo, FileDelta, FileStatus};
use crate::error::{GitStoryError, Result};

/// [super::Repository] backed by libgit2.
///
/// Holds the repository path rather than an open handle; each operation
/// opens its own handle on a blocking thread so independent reads can run
/// concurrently.
#[derive(Debug, Clone)]
pub struct Git2Repository {
    path: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path.as_ref()).map_err(|e| {
            GitStoryError::repository(format!(
                "Not in a git repository ({}): {}",
                path.as_ref().display(),
                e.message()
            ))
        })?;

        Ok(Git2Repository {
            path: repo.path().to_path_buf(),
        })
    }

    /// Path of the `.git` directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_repo<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Git2Repo) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let repo = Git2Repo::open(&path)?;
            op(&repo)
        })
        .await
        .map_err(|e| GitStoryError::repository(format!("git task failed: {}", e)))?
    }
}

#[async_trait]
impl super::Repository for Git2Repository {
    async fn current_branch(&self) -> Result<String> {
        self.with_repo(current_branch).await
    }

    async fn commits_between(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>> {
        let (from, to) = (from.to_string(), to.to_string());
        self.with_repo(move |repo| commits_between(repo, &from, &to))
            .await
    }

    async fn diff_text(&self, from: &str, to: &str) -> Result<String> {
        let (from, to) = (from.to_string(), to.to_string());
        self.with_repo(move |repo| diff_text(repo, &from, &to)).await
    }

    async fn diff_summary(&self, from: &str, to: &str) -> Result<Vec<FileDelta>> {
        let (from, to) = (from.to_string(), to.to_string());
        self.with_repo(move |repo| diff_summary(repo, &from, &to))
            .await
    }

    async fn create_and_checkout_branch(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.with_repo(move |repo| create_and_checkout_branch(repo, &name))
            .await
    }

    async fn push_branch(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
        let (remote, branch) = (remote.to_string(), branch.to_string());
        self.with_repo(move |repo| push_branch(repo, &remote, &branch, set_upstream))
            .await
    }

    async fn delete_local_branch(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.with_repo(move |repo| {
            repo.find_branch(&name, BranchType::Local)?.delete()?;
            Ok(())
        })
        .await
    }

    async fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<()> {
        let (remote, name) = (remote.to_string(), name.to_string());
        self.with_repo(move |repo| delete_remote_branch(repo, &remote, &name))
            .await
    }
}

fn current_branch(repo: &Git2Repo) -> Result<String> {
    let head = repo.head().map_err(|e| {
        GitStoryError::repository(format!("Cannot read HEAD: {}", e.message()))
    })?;

    if !head.is_branch() {
        return Err(GitStoryError::repository(
            "HEAD is detached; check out a branch first",
        ));
    }

    head.shorthand()
        .map(str::to_string)
        .ok_or_else(|| GitStoryError::repository("Branch name is not valid UTF-8"))
}

fn resolve_commit<'r>(repo: &'r Git2Repo, spec: &str) -> Result<Commit<'r>> {
    repo.revparse_single(spec)
        .and_then(|object| object.peel_to_commit())
        .map_err(|e| GitStoryError::repository(format!("Cannot resolve '{}': {}", spec, e.message())))
}

fn commits_between(repo: &Git2Repo, from: &str, to: &str) -> Result<Vec<CommitInfo>> {
    let from_oid = resolve_commit(repo, from)?.id();
    let to_oid = resolve_commit(repo, to)?.id();

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(to_oid)?;
    revwalk.hide(from_oid)?;

    let mut commits = Vec::new();

    for oid_result in revwalk {
        let commit = repo.find_commit(oid_result?)?;

        let message = commit.message().unwrap_or("(empty message)");
        let author = commit.author().name().unwrap_or("unknown").to_string();
        let timestamp = DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default();

        commits.push(CommitInfo::new(
            &commit.id().to_string(),
            message,
            author,
            timestamp,
        ));
    }

    // Revwalk yields newest first
    commits.reverse();
    Ok(commits)
}

fn branch_diff<'r>(repo: &'r Git2Repo, from: &str, to: &str) -> Result<Diff<'r>> {
    let from_commit = resolve_commit(repo, from)?;
    let to_commit = resolve_commit(repo, to)?;

    let base_oid: Oid = repo.merge_base(from_commit.id(), to_commit.id())?;
    let base_tree = repo.find_commit(base_oid)?.tree()?;
    let head_tree = to_commit.tree()?;

    let mut diff = repo.diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)?;
    diff.find_similar(None)?;
    Ok(diff)
}

fn diff_text(repo: &Git2Repo, from: &str, to: &str) -> Result<String> {
    let diff = branch_diff(repo, from, to)?;
    let mut text = String::new();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            text.push(line.origin());
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;

    Ok(truncate_diff(&text))
}

fn diff_summary(repo: &Git2Repo, from: &str, to: &str) -> Result<Vec<FileDelta>> {
    let diff = branch_diff(repo, from, to)?;
    let mut files = Vec::new();

    for (index, delta) in diff.deltas().enumerate() {
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Binary files have no patch and count as zero lines
        let (insertions, deletions) = match git2::Patch::from_diff(&diff, index)? {
            Some(patch) => {
                let (_context, additions, deletions) = patch.line_stats()?;
                (additions, deletions)
            }
            None => (0, 0),
        };

        files.push(FileDelta {
            path,
            insertions,
            deletions,
            status: file_status(delta.status()),
        });
    }

    Ok(files)
}

fn file_status(delta: Delta) -> FileStatus {
    match delta {
        Delta::Added | Delta::Untracked => FileStatus::Added,
        Delta::Deleted => FileStatus::Deleted,
        Delta::Renamed => FileStatus::Renamed,
        Delta::Copied => FileStatus::Copied,
        Delta::Typechange => FileStatus::TypeChanged,
        _ => FileStatus::Modified,
    }
}

fn create_and_checkout_branch(repo: &Git2Repo, name: &str) -> Result<()> {
    let head = repo.head()?.peel_to_commit()?;
    repo.branch(name, &head, false)?;

    // Same commit, so only HEAD moves; the working tree is untouched
    repo.set_head(&format!("refs/heads/{}", name))?;
    Ok(())
}

/// Build remote callbacks that authenticate via SSH keys, the SSH agent or
/// the configured credential helper, and fail on rejected references.
fn remote_callbacks(config: &git2::Config) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        attempts += 1;
        if attempts > 3 {
            return Err(git2::Error::from_str("authentication failed"));
        }

        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if attempts == 1 {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
        }

        if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            if let Ok(cred) = git2::Cred::credential_helper(config, url, username_from_url) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "remote rejected {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

fn push_refspec(repo: &Git2Repo, remote_name: &str, refspec: &str) -> Result<()> {
    let mut remote = repo.find_remote(remote_name).map_err(|e| {
        GitStoryError::repository(format!("Remote '{}' not found: {}", remote_name, e.message()))
    })?;

    let config = repo.config()?;
    let mut push_options = PushOptions::new();
    push_options.remote_callbacks(remote_callbacks(&config));

    remote
        .push(&[refspec], Some(&mut push_options))
        .map_err(|e| {
            if e.class() == git2::ErrorClass::Net {
                GitStoryError::repository(format!("Network error during push: {}", e.message()))
            } else {
                GitStoryError::repository(format!("Push of '{}' failed: {}", refspec, e.message()))
            }
        })
}

fn push_branch(repo: &Git2Repo, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
    let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
    push_refspec(repo, remote, &refspec)?;

    if set_upstream {
        let mut config = repo.config()?;
        config.set_str(&format!("branch.{}.remote", branch), remote)?;
        config.set_str(
            &format!("branch.{}.merge", branch),
            &format!("refs/heads/{}", branch),
        )?;
    }

    Ok(())
}

fn delete_remote_branch(repo: &Git2Repo, remote: &str, name: &str) -> Result<()> {
    push_refspec(repo, remote, &format!(":refs/heads/{}", name))?;

    // Drop the stale remote-tracking ref if the push left it behind
    if let Ok(mut tracking) = repo.find_reference(&format!("refs/remotes/{}/{}", remote, name)) {
        if let Err(e) = tracking.delete() {
            tracing::debug!(error = %e, "Could not remove remote-tracking ref");
        }
    }

    Ok(())
}
