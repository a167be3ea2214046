//! # git-migrate
//!
//! Transfers git repositories from one server to another: each repository is
//! mirror-cloned from the source and all its branches and tags are pushed to the target.
//!
//! ## Usage
//!
//! ```txt
//! Usage: git-migrate [OPTIONS]
//!
//! Options:
//!  -c, --config <CONFIG>              Path to TOML configuration file
//!  -s, --source <SOURCE>              Source git server to migrate from
//!  -t, --target <TARGET>              Target git server to migrate to
//!  -r, --repos <REPOS>...             Repositories to migrate (comma separated), or a .txt file
//!      --source-group <SOURCE_GROUP>  Group which the repositories belong to in the source
//!      --target-group <TARGET_GROUP>  Group which the repositories belong to in the target
//!      --ssh                          Use SSH for git operations instead of HTTPS
//!  -w, --workdir <WORKDIR>            Directory in which the local mirror clones are made
//!  -k, --keep                         Keep the local mirror clones
//!  -y, --yes                          Don't ask for confirmation
//!      --json                         Print the report as JSON (needs --yes)
//!      --git-binary <GIT_BINARY>      git executable to use [default: git]
//!      --show-config-path             Show the default config path
//!  -v, --verbose...                   Verbose mode (-v, -vv)
//!  -h, --help                         Print help
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub(crate) mod batch;
pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod migrate;
pub(crate) mod remote_url;
pub(crate) mod runner;
pub(crate) mod task;
pub(crate) mod utils;

pub use batch::{all_succeeded, run_all};
pub use cli::{format_report, migrate_main, MigrateCli};
pub use config::{MigrateConfig, Settings};
pub use errors::{MigrateError, MigrateErrorKind};
pub use migrate::{Migrator, Workspace, NEW_REMOTE};
pub use remote_url::build_url;
pub use runner::{CommandResult, GitCli, GitRunner, RunFuture};
pub use task::{MigrationOutcome, MigrationStep, MigrationTask};
