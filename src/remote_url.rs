//! Repository URL construction
use crate::errors::{MigrateError, MigrateErrorKind};

/// Build the clone/push URL of a repository
///
/// `git@{host}:{group}/{repo}.git` over SSH, `https://{host}/{group}/{repo}.git` otherwise.
/// # Errors
/// Error if the host, group or repository name is empty
pub fn build_url(
    host: &str,
    group: &str,
    repo: &str,
    use_ssh: bool,
) -> Result<String, MigrateError> {
    for (what, value) in [("host", host), ("group", group), ("repository", repo)] {
        if value.is_empty() {
            return Err(MigrateError::new(MigrateErrorKind::InvalidInput)
                .with_text(&format!("{what} can't be empty")));
        }
    }
    if use_ssh {
        Ok(format!("git@{host}:{group}/{repo}.git"))
    } else {
        Ok(format!("https://{host}/{group}/{repo}.git"))
    }
}
