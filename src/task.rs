//! Migration tasks and their outcomes
use std::fmt;

use serde::Serialize;
use url::Url;

use crate::errors::{MigrateError, MigrateErrorKind};
use crate::remote_url::build_url;

/// One repository to move from the source server to the target server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTask {
    /// Name of the repository
    repo_name: String,

    /// Source git server
    source_host: String,

    /// Target git server
    target_host: String,

    /// Group of the repository on the source server
    source_group: String,

    /// Group of the repository on the target server
    target_group: String,

    /// Use SSH instead of HTTPS
    use_ssh: bool,
}

impl MigrationTask {
    /// Create a validated task
    /// # Errors
    /// Error if the hosts are equal or if a host, group or repository name is malformed
    pub fn new(
        repo_name: &str,
        source_host: &str,
        source_group: &str,
        target_host: &str,
        target_group: &str,
        use_ssh: bool,
    ) -> Result<Self, MigrateError> {
        check_hosts(source_host, target_host)?;
        validate_group(source_group)?;
        validate_group(target_group)?;
        validate_repo_name(repo_name)?;
        Ok(Self {
            repo_name: repo_name.to_string(),
            source_host: source_host.to_string(),
            target_host: target_host.to_string(),
            source_group: source_group.to_string(),
            target_group: target_group.to_string(),
            use_ssh,
        })
    }

    /// Name of the repository
    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    /// Source git server
    pub fn source_host(&self) -> &str {
        &self.source_host
    }

    /// Target git server
    pub fn target_host(&self) -> &str {
        &self.target_host
    }

    /// Group on the source server
    pub fn source_group(&self) -> &str {
        &self.source_group
    }

    /// Group on the target server
    pub fn target_group(&self) -> &str {
        &self.target_group
    }

    /// Whether SSH is used
    pub fn use_ssh(&self) -> bool {
        self.use_ssh
    }

    /// URL to clone from
    /// # Errors
    /// Error if the URL can't be built
    pub fn source_url(&self) -> Result<String, MigrateError> {
        build_url(
            &self.source_host,
            &self.source_group,
            &self.repo_name,
            self.use_ssh,
        )
    }

    /// URL to push to
    /// # Errors
    /// Error if the URL can't be built
    pub fn target_url(&self) -> Result<String, MigrateError> {
        build_url(
            &self.target_host,
            &self.target_group,
            &self.repo_name,
            self.use_ssh,
        )
    }
}

/// Invalid input error with a message
fn invalid(text: &str) -> MigrateError {
    MigrateError::new(MigrateErrorKind::InvalidInput).with_text(text)
}

/// Check both hosts and make sure they differ
/// # Errors
/// Error if a host is malformed or if both hosts are the same
pub(crate) fn check_hosts(source_host: &str, target_host: &str) -> Result<(), MigrateError> {
    validate_host(source_host)?;
    validate_host(target_host)?;
    if source_host.eq_ignore_ascii_case(target_host) {
        return Err(invalid("Source and target cannot be equal"));
    }
    Ok(())
}

/// A host must be usable as the authority of an https URL, nothing more
fn validate_host(host: &str) -> Result<(), MigrateError> {
    if host.is_empty() {
        return Err(invalid("host can't be empty"));
    }
    if host.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(invalid(&format!("invalid host '{host}'")));
    }
    let parsed = Url::parse(&format!("https://{host}/"))
        .map_err(|e| invalid(&format!("invalid host '{host}': {e}")))?;
    let is_bare_host = parsed.host_str().is_some()
        && parsed.username().is_empty()
        && parsed.password().is_none()
        && parsed.path() == "/"
        && parsed.query().is_none()
        && parsed.fragment().is_none();
    if !is_bare_host {
        return Err(invalid(&format!("invalid host '{host}'")));
    }
    Ok(())
}

/// Groups may be nested (`org/sub`), each segment follows the repository name rules
fn validate_group(group: &str) -> Result<(), MigrateError> {
    if group.is_empty() {
        return Err(invalid("group can't be empty"));
    }
    for segment in group.split('/') {
        validate_segment(segment).map_err(|reason| {
            invalid(&format!("invalid group '{group}': {reason}"))
        })?;
    }
    Ok(())
}

/// Repository names end up in URLs and in local paths
/// # Errors
/// Error if the name is empty, escapes its directory or contains unsupported characters
pub fn validate_repo_name(name: &str) -> Result<(), MigrateError> {
    validate_segment(name)
        .map_err(|reason| invalid(&format!("invalid repository name '{name}': {reason}")))
}

/// Shared rule for repository names and group segments
fn validate_segment(segment: &str) -> Result<(), &'static str> {
    if segment.is_empty() {
        return Err("empty name");
    }
    if segment.starts_with('-') || segment.starts_with('.') {
        return Err("can't start with '-' or '.'");
    }
    if segment.contains("..") {
        return Err("can't contain '..'");
    }
    if !segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err("only letters, digits, '-', '_' and '.' are allowed");
    }
    Ok(())
}

/// Steps of a repository migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStep {
    /// Building the source and target URLs
    Prepare,

    /// Mirror clone of the source
    Clone,

    /// Adding the target as a remote
    AddRemote,

    /// Pushing all branches
    PushBranches,

    /// Pushing all tags
    PushTags,
}

impl MigrationStep {
    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStep::Prepare => "prepare",
            MigrationStep::Clone => "clone",
            MigrationStep::AddRemote => "add-remote",
            MigrationStep::PushBranches => "push-branches",
            MigrationStep::PushTags => "push-tags",
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one repository migration
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Name of the repository
    pub repo_name: String,

    /// Whether every step succeeded
    pub succeeded: bool,

    /// Name of the failing step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Output of the failing command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl MigrationOutcome {
    /// Successful migration
    pub fn success(repo_name: &str) -> Self {
        Self {
            repo_name: repo_name.to_string(),
            succeeded: true,
            failure_reason: None,
            details: None,
        }
    }

    /// Migration stopped at `step`
    pub fn failure<S: Into<String>>(repo_name: &str, step: MigrationStep, details: S) -> Self {
        let details: String = details.into();
        Self {
            repo_name: repo_name.to_string(),
            succeeded: false,
            failure_reason: Some(step.to_string()),
            details: (!details.is_empty()).then_some(details),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn task(repo: &str, source: &str, target: &str) -> Result<MigrationTask, MigrateError> {
        MigrationTask::new(repo, source, "team", target, "team", false)
    }

    #[test]
    fn valid_task() {
        let task = MigrationTask::new(
            "alpha",
            "old.example.com",
            "team",
            "new.example.com",
            "org/team",
            true,
        )
        .unwrap();
        assert_eq!(task.repo_name(), "alpha");
        assert_eq!(
            task.source_url().unwrap(),
            "git@old.example.com:team/alpha.git"
        );
        assert_eq!(
            task.target_url().unwrap(),
            "git@new.example.com:org/team/alpha.git"
        );
    }

    #[test]
    fn equal_hosts_are_rejected() {
        let err = task("alpha", "git.example.com", "git.example.com").unwrap_err();
        assert_eq!(err.kind(), &MigrateErrorKind::InvalidInput);
        let err = task("alpha", "git.example.com", "GIT.example.com").unwrap_err();
        assert_eq!(err.kind(), &MigrateErrorKind::InvalidInput);
    }

    #[test]
    fn host_with_port_is_accepted() {
        assert!(task("alpha", "old.example.com:8443", "new.example.com").is_ok());
    }

    #[test]
    fn malformed_hosts_are_rejected() {
        for host in ["", "user@host", "host/path", "host name", "host?x=1"] {
            assert!(task("alpha", host, "new.example.com").is_err(), "{host}");
        }
    }

    #[test]
    fn unsafe_repo_names_are_rejected() {
        for name in [
            "",
            "..",
            "../etc",
            "a/b",
            "-upload-pack=evil",
            ".hidden",
            "a..b",
            "name;rm -rf",
            "$(id)",
            "a b",
        ] {
            let err = task(name, "old.example.com", "new.example.com").unwrap_err();
            assert_eq!(err.kind(), &MigrateErrorKind::InvalidInput, "{name}");
        }
    }

    #[test]
    fn usual_repo_names_are_accepted() {
        for name in ["alpha", "my-repo", "my_repo", "repo.js", "Repo2"] {
            assert!(task(name, "old.example.com", "new.example.com").is_ok(), "{name}");
        }
    }

    #[test]
    fn bad_group_segments_are_rejected() {
        for group in ["", "org/", "/org", "org/../x", "org//sub"] {
            let res =
                MigrationTask::new("a", "old.example.com", group, "new.example.com", "t", false);
            assert!(res.is_err(), "{group}");
        }
    }

    #[test]
    fn failure_outcome_names_the_step() {
        let outcome = MigrationOutcome::failure("alpha", MigrationStep::AddRemote, "");
        assert!(!outcome.succeeded);
        assert_eq!(outcome.failure_reason.as_deref(), Some("add-remote"));
        assert_eq!(outcome.details, None);
    }
}
