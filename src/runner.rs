//! Running the external git executable
use std::{
    ffi::OsString,
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    process::Stdio,
};

use log::trace;
use tokio::process::Command;

use crate::errors::{MigrateError, MigrateErrorKind};

/// Result of one git invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command exited with code zero
    pub succeeded: bool,

    /// stdout on success, stderr on failure
    pub output: String,
}

/// Future returned by [`GitRunner::run`]
pub type RunFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CommandResult, MigrateError>> + Send + 'a>>;

/// Something able to run git commands
pub trait GitRunner: Sync + Send {
    /// Run git with `args`, inside `cwd` if given
    ///
    /// A non-zero exit is a failed [`CommandResult`], not an error.
    fn run<'a>(&'a self, args: &'a [String], cwd: Option<&'a Path>) -> RunFuture<'a>;
}

/// Runs the git executable as a subprocess
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Program to launch
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    /// Use `program` as the git executable
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl GitRunner for GitCli {
    fn run<'a>(&'a self, args: &'a [String], cwd: Option<&'a Path>) -> RunFuture<'a> {
        Box::pin(async move {
            let mut command = Command::new(&self.program);
            command
                .args(args)
                .env("GIT_TERMINAL_PROMPT", "0")
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            if let Some(dir) = cwd {
                command.current_dir(dir);
            }
            trace!(
                "Running {} {} in {}",
                self.program.to_string_lossy(),
                args.join(" "),
                cwd.map(PathBuf::from).unwrap_or_default().display()
            );
            let output = command.output().await.map_err(|e| {
                MigrateError::new(MigrateErrorKind::Spawn).with_source(format!(
                    "{}: {e}",
                    self.program.to_string_lossy()
                ))
            })?;
            if output.status.success() {
                Ok(CommandResult {
                    succeeded: true,
                    output: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
                })
            } else {
                Ok(CommandResult {
                    succeeded: false,
                    output: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
                })
            }
        })
    }
}
