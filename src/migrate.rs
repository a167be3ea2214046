//! Migrate one repository from a server to another
use std::{
    fs::{create_dir_all, remove_dir_all},
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};
use rand::{distr::Alphanumeric, rng, Rng};

use crate::errors::MigrateError;
use crate::runner::GitRunner;
use crate::task::{MigrationOutcome, MigrationStep, MigrationTask};

/// Name of the remote pointing to the target server
pub const NEW_REMOTE: &str = "new-origin";

/// Directory holding the local mirror clones of a run
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root of the workspace
    root: PathBuf,

    /// Keep the clones once migrated
    keep: bool,
}

impl Workspace {
    /// Create a fresh workspace inside `base` (the temp dir by default)
    /// # Errors
    /// Error if the directory can't be created
    pub fn create(base: Option<&Path>, keep: bool) -> Result<Self, MigrateError> {
        let rand_string: String = rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let base = match base {
            Some(dir) => dir.to_path_buf(),
            None => std::env::temp_dir(),
        };
        let root = base.join(format!("git-migrate-{rand_string}"));
        create_dir_all(&root)?;
        debug!("Created workspace {}", root.display());
        Ok(Self { root, keep })
    }

    /// Root of the workspace
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name of the mirror clone of `repo_name`
    pub fn clone_dir_name(repo_name: &str) -> String {
        format!("{repo_name}.git")
    }

    /// Path of the mirror clone of `repo_name`
    pub fn repo_path(&self, repo_name: &str) -> PathBuf {
        self.root.join(Self::clone_dir_name(repo_name))
    }

    /// Remove the clone of `repo_name`, unless clones are kept
    fn discard(&self, repo_name: &str) {
        if self.keep {
            return;
        }
        let path = self.repo_path(repo_name);
        if !path.exists() {
            return;
        }
        match remove_dir_all(&path) {
            Ok(_) => debug!("Deleted local repository {}", path.display()),
            Err(e) => warn!("Failed to clean up {}: {e}", path.display()),
        }
    }

    /// Remove the whole workspace, unless clones are kept
    pub fn cleanup(self) {
        if self.keep {
            info!("Local clones kept in {}", self.root.display());
            return;
        }
        info!("Cleaning up {}", self.root.display());
        if let Err(e) = remove_dir_all(&self.root) {
            warn!("Failed to clean up {}: {e}", self.root.display());
        }
    }
}

/// Migrates repositories with a [`GitRunner`]
pub struct Migrator<R: GitRunner> {
    /// Runs the git commands
    runner: R,

    /// Where the mirror clones live
    workspace: Workspace,
}

impl<R: GitRunner> Migrator<R> {
    /// Create a migrator
    pub fn new(runner: R, workspace: Workspace) -> Self {
        Self { runner, workspace }
    }

    /// Runner used for the git commands
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Workspace of the migrator
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Give back the workspace, to clean it up
    pub fn into_workspace(self) -> Workspace {
        self.workspace
    }

    /// Migrate one repository: mirror clone, add the target remote, push branches then tags
    ///
    /// Stops at the first failing step. Never returns an error: failures are in the outcome.
    pub async fn migrate(&self, task: &MigrationTask) -> MigrationOutcome {
        let outcome = self.run_steps(task).await;
        self.workspace.discard(task.repo_name());
        outcome
    }

    /// Run the steps of a migration in order
    async fn run_steps(&self, task: &MigrationTask) -> MigrationOutcome {
        let repo_name = task.repo_name();
        let (source_url, target_url) = match (task.source_url(), task.target_url()) {
            (Ok(source), Ok(target)) => (source, target),
            (Err(e), _) | (_, Err(e)) => {
                error!("{repo_name}: {e}");
                return MigrationOutcome::failure(repo_name, MigrationStep::Prepare, e.to_string());
            }
        };
        info!("Start migrating {source_url} to {target_url}");

        let repo_path = self.workspace.repo_path(repo_name);
        let steps = [
            (
                MigrationStep::Clone,
                git_args(&[
                    "clone",
                    "--mirror",
                    &source_url,
                    &Workspace::clone_dir_name(repo_name),
                ]),
                self.workspace.root(),
            ),
            (
                MigrationStep::AddRemote,
                git_args(&["remote", "add", NEW_REMOTE, &target_url]),
                repo_path.as_path(),
            ),
            (
                MigrationStep::PushBranches,
                git_args(&["push", NEW_REMOTE, "--all"]),
                repo_path.as_path(),
            ),
            (
                MigrationStep::PushTags,
                git_args(&["push", NEW_REMOTE, "--tags"]),
                repo_path.as_path(),
            ),
        ];
        for (step, args, cwd) in steps {
            info!("{repo_name}: git {}", args.join(" "));
            match self.runner.run(&args, Some(cwd)).await {
                Ok(result) if result.succeeded => {
                    if !result.output.is_empty() {
                        debug!("{repo_name}: {}", result.output);
                    }
                }
                Ok(result) => {
                    error!("{repo_name}: {step} failed: {}", result.output);
                    return MigrationOutcome::failure(repo_name, step, result.output);
                }
                Err(e) => {
                    error!("{repo_name}: {step} failed: {e}");
                    return MigrationOutcome::failure(repo_name, step, e.to_string());
                }
            }
        }
        info!("Successfully migrated repository: {repo_name}");
        MigrationOutcome::success(repo_name)
    }
}

/// Owned argument vector
fn git_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}
