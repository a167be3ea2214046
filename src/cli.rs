//! Command line options for the git-migrate tool
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::{
    batch::{all_succeeded, run_all},
    config::MigrateConfig,
    errors::MigrateError,
    migrate::{Migrator, Workspace},
    runner::GitCli,
    task::MigrationOutcome,
    utils::yes_no_input,
};

/// git-migrate - Transfers git repositories from one server to another
#[derive(Parser, Default, Clone, Debug)]
#[command(version, after_help = "Good luck and enjoy your coffee")]
pub struct MigrateCli {
    /// Path to TOML configuration file
    #[arg(
        short,
        long,
        conflicts_with_all = ["source", "target", "repos", "source_group", "target_group", "ssh"]
    )]
    pub config: Option<PathBuf>,

    /// Source git server to migrate from
    #[arg(short, long)]
    pub source: Option<String>,

    /// Target git server to migrate to
    #[arg(short, long)]
    pub target: Option<String>,

    /// Repositories to migrate (comma separated), or a .txt file with one name per line
    #[arg(short, long, num_args = 1.., value_delimiter = ',')]
    pub repos: Vec<String>,

    /// Group which the repositories belong to in the source
    #[arg(long)]
    pub source_group: Option<String>,

    /// Group which the repositories belong to in the target
    #[arg(long)]
    pub target_group: Option<String>,

    /// Use SSH for git operations instead of HTTPS
    #[arg(long)]
    pub ssh: bool,

    /// Directory in which the local mirror clones are made (default: temp dir)
    #[arg(short, long)]
    pub workdir: Option<PathBuf>,

    /// Keep the local mirror clones
    #[arg(short, long)]
    pub keep: bool,

    /// Don't ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Print the report as JSON (needs --yes, stdout only carries the report)
    #[arg(long, requires = "yes")]
    pub json: bool,

    /// git executable to use
    #[arg(long, default_value = "git")]
    pub git_binary: PathBuf,

    /// Show the default config path
    #[arg(long)]
    pub show_config_path: bool,

    /// Verbose mode (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl MigrateCli {
    /// Whether any migration parameter was given on the command line
    pub fn has_task_args(&self) -> bool {
        self.source.is_some()
            || self.target.is_some()
            || !self.repos.is_empty()
            || self.source_group.is_some()
            || self.target_group.is_some()
            || self.ssh
    }

    /// Log level matching the verbosity
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Run the git-migrate tool with the provided command line options
///
/// Returns whether every repository was migrated.
/// # Errors
/// Error if the configuration is invalid or the workspace can't be created
pub async fn migrate_main(args: MigrateCli) -> Result<bool, MigrateError> {
    if args.show_config_path {
        println!("{}", MigrateConfig::get_config_path()?.display());
        return Ok(true);
    }
    let config = MigrateConfig::try_new(args)?;
    let tasks = config.tasks()?;
    let cli_args = &config.cli_args;
    if !cli_args.yes {
        println!(
            "Migrating from {} to {}:",
            config.settings.source, config.settings.target
        );
        for task in &tasks {
            println!("- {}", task.repo_name());
        }
        let question = format!(
            "Do you want to start migrating {} repositories? (y/n)",
            tasks.len()
        );
        if !yes_no_input(question)? {
            println!("Nothing migrated");
            return Ok(true);
        }
    }

    let workspace = Workspace::create(cli_args.workdir.as_deref(), cli_args.keep)?;
    let migrator = Migrator::new(GitCli::new(cli_args.git_binary.clone()), workspace);
    let outcomes = run_all(&migrator, &tasks).await;
    migrator.into_workspace().cleanup();

    if cli_args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print!("{}", format_report(&outcomes));
    }
    Ok(all_succeeded(&outcomes))
}

/// Human readable report, one line per repository and a summary
pub fn format_report(outcomes: &[MigrationOutcome]) -> String {
    let mut report = String::new();
    for outcome in outcomes {
        if outcome.succeeded {
            report.push_str(&format!("OK      {}\n", outcome.repo_name));
            continue;
        }
        let step = outcome.failure_reason.as_deref().unwrap_or("unknown");
        match outcome.details.as_deref().and_then(|d| d.lines().last()) {
            Some(detail) => {
                report.push_str(&format!("FAILED  {} at {step}: {detail}\n", outcome.repo_name))
            }
            None => report.push_str(&format!("FAILED  {} at {step}\n", outcome.repo_name)),
        }
    }
    let migrated = outcomes.iter().filter(|o| o.succeeded).count();
    report.push_str(&format!(
        "Migrated {migrated}/{} repositories\n",
        outcomes.len()
    ));
    report
}
