//! Migrate a list of repositories, one after the other
use log::{error, info};

use crate::migrate::Migrator;
use crate::runner::GitRunner;
use crate::task::{MigrationOutcome, MigrationTask};

/// Migrate every task in order
///
/// A failing task does not stop the next ones: every task gets an outcome, in input order.
pub async fn run_all<R: GitRunner>(
    migrator: &Migrator<R>,
    tasks: &[MigrationTask],
) -> Vec<MigrationOutcome> {
    let total = tasks.len();
    let mut outcomes = Vec::with_capacity(total);
    for (idx, task) in tasks.iter().enumerate() {
        info!("[{}/{}] {}", idx + 1, total, task.repo_name());
        let outcome = migrator.migrate(task).await;
        if !outcome.succeeded {
            error!("Failed to migrate repository: {}", task.repo_name());
        }
        outcomes.push(outcome);
    }
    outcomes
}

/// Whether every migration succeeded
pub fn all_succeeded(outcomes: &[MigrationOutcome]) -> bool {
    outcomes.iter().all(|outcome| outcome.succeeded)
}
