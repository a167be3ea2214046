//! Configuration handling
use std::{
    collections::HashSet,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use home::home_dir;
use log::debug;
use serde::Deserialize;

use crate::{
    cli::MigrateCli,
    errors::{MigrateError, MigrateErrorKind},
    task::{check_hosts, MigrationTask},
};

/// Configuration data
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    /// path to the configuration file, if one was used
    pub config_path: Option<PathBuf>,

    /// resolved settings
    pub settings: Settings,

    /// CLI arguments
    pub cli_args: MigrateCli,
}

/// Everything needed to build the migration tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Source git server
    pub source: String,

    /// Group on the source server
    pub source_group: String,

    /// Target git server
    pub target: String,

    /// Group on the target server
    pub target_group: String,

    /// Repositories to migrate, in order
    pub repos: Vec<String>,

    /// Use SSH instead of HTTPS
    pub use_ssh: bool,
}

/// Content of the TOML configuration file
#[derive(Deserialize, Default, Clone, Debug)]
pub struct ConfigData {
    /// Source section
    #[serde(rename = "Source")]
    pub source: SourceSection,

    /// Target section
    #[serde(rename = "Target")]
    pub target: TargetSection,

    /// Repository list section
    #[serde(rename = "Repos")]
    pub repos: ReposSection,

    /// Transport section
    #[serde(rename = "SSH", default)]
    pub ssh: SshSection,
}

/// `[Source]` section
#[derive(Deserialize, Default, Clone, Debug)]
pub struct SourceSection {
    /// Source git server
    pub source: String,

    /// Group on the source server
    #[serde(rename = "source-group")]
    pub source_group: String,
}

/// `[Target]` section
#[derive(Deserialize, Default, Clone, Debug)]
pub struct TargetSection {
    /// Target git server
    pub target: String,

    /// Group on the target server
    #[serde(rename = "target-group")]
    pub target_group: String,
}

/// `[Repos]` section
#[derive(Deserialize, Default, Clone, Debug)]
pub struct ReposSection {
    /// Inline repository names
    #[serde(default)]
    pub reps: Vec<String>,

    /// Plain-text list of repository names, relative to the config file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// `[SSH]` section
#[derive(Deserialize, Default, Clone, Debug)]
pub struct SshSection {
    /// Use SSH instead of HTTPS
    #[serde(default)]
    pub use_ssh: bool,
}

impl ConfigData {
    /// Read a TOML configuration file
    /// # Errors
    /// Error if the file can't be read or parsed
    pub fn from_path(path: &Path) -> Result<Self, MigrateError> {
        let contents = read_to_string(path).map_err(|e| {
            MigrateError::new(MigrateErrorKind::Config)
                .with_source(format!("Config file '{}': {e}", path.display()))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Flatten the sections, reading the repository file if any
    /// # Errors
    /// Error if the repository file can't be read
    pub fn into_settings(self, base_dir: &Path) -> Result<Settings, MigrateError> {
        let mut repos = parse_repo_names(&self.repos.reps);
        if let Some(file) = &self.repos.file {
            repos.extend(read_repo_list(&base_dir.join(file))?);
        }
        Ok(Settings {
            source: self.source.source,
            source_group: self.source.source_group,
            target: self.target.target,
            target_group: self.target.target_group,
            repos,
            use_ssh: self.ssh.use_ssh,
        })
    }
}

impl Settings {
    /// Settings given on the command line
    /// # Errors
    /// Error if a parameter is missing or if the repository file can't be read
    pub fn from_cli(args: &MigrateCli) -> Result<Self, MigrateError> {
        let missing: Vec<&str> = [
            ("--source", args.source.is_none()),
            ("--target", args.target.is_none()),
            ("--repos", args.repos.is_empty()),
            ("--source-group", args.source_group.is_none()),
            ("--target-group", args.target_group.is_none()),
        ]
        .into_iter()
        .filter_map(|(flag, is_missing)| is_missing.then_some(flag))
        .collect();
        if !missing.is_empty() {
            return Err(MigrateError::new(MigrateErrorKind::Config).with_text(&format!(
                "All arguments are required when not using a config file, missing {}",
                missing.join(", ")
            )));
        }
        let repos = match args.repos.as_slice() {
            [single] if single.trim().ends_with(".txt") => {
                read_repo_list(Path::new(single.trim()))?
            }
            names => parse_repo_names(names),
        };
        Ok(Self {
            source: args.source.clone().unwrap_or_default(),
            source_group: args.source_group.clone().unwrap_or_default(),
            target: args.target.clone().unwrap_or_default(),
            target_group: args.target_group.clone().unwrap_or_default(),
            repos,
            use_ssh: args.ssh,
        })
    }

    /// Validate the settings and build one task per repository
    /// # Errors
    /// Error if the hosts are equal, if there is no repository, if a repository is listed
    /// twice or if a value is malformed
    pub fn into_tasks(self) -> Result<Vec<MigrationTask>, MigrateError> {
        check_hosts(&self.source, &self.target)?;
        if self.repos.is_empty() {
            return Err(
                MigrateError::new(MigrateErrorKind::Config).with_text("No repositories to migrate")
            );
        }
        // clones live side by side as `<name>.git`, case-insensitive filesystems included
        let mut seen = HashSet::new();
        for repo in &self.repos {
            if !seen.insert(repo.to_ascii_lowercase()) {
                return Err(MigrateError::new(MigrateErrorKind::Config)
                    .with_text(&format!("Repository '{repo}' is listed more than once")));
            }
        }
        self.repos
            .iter()
            .map(|repo| {
                MigrationTask::new(
                    repo,
                    &self.source,
                    &self.source_group,
                    &self.target,
                    &self.target_group,
                    self.use_ssh,
                )
            })
            .collect()
    }
}

impl MigrateConfig {
    /// Resolve the configuration from the command line, a config file or the default config file
    /// # Errors
    /// Error if the config file can't be read or if parameters are missing
    pub fn try_new(cli_args: MigrateCli) -> Result<Self, MigrateError> {
        let config_path = match &cli_args.config {
            Some(path) => Some(path.clone()),
            None if !cli_args.has_task_args() => {
                let default_path = Self::get_config_path()?;
                default_path.exists().then_some(default_path)
            }
            None => None,
        };
        let settings = match &config_path {
            Some(path) => {
                debug!("Using config file {}", path.display());
                let base_dir = path.parent().unwrap_or(Path::new("."));
                ConfigData::from_path(path)?.into_settings(base_dir)?
            }
            None => Settings::from_cli(&cli_args)?,
        };
        Ok(Self {
            config_path,
            settings,
            cli_args,
        })
    }

    /// Validated tasks, in order
    /// # Errors
    /// Error if the settings are invalid
    pub fn tasks(&self) -> Result<Vec<MigrationTask>, MigrateError> {
        self.settings.clone().into_tasks()
    }

    /// Get the path to the default config file
    /// # Errors
    /// Error if the home directory can't be found
    pub fn get_config_path() -> Result<PathBuf, MigrateError> {
        let home_dir = match home_dir() {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => {
                return Err(MigrateError::new(MigrateErrorKind::Config)
                    .with_text("Unable to get your home dir! home::home_dir() isn't working"))
            }
        };
        Ok(home_dir
            .join(".config")
            .join(".git-migrate")
            .join("config.toml"))
    }
}

/// Trim the names and drop the blank ones
pub fn parse_repo_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.as_ref().trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read repository names from a text file, one per line
/// # Errors
/// Error if the file can't be read
pub fn read_repo_list(path: &Path) -> Result<Vec<String>, MigrateError> {
    let contents = read_to_string(path).map_err(|e| {
        MigrateError::new(MigrateErrorKind::Config)
            .with_source(format!("Repository list '{}': {e}", path.display()))
    })?;
    let lines: Vec<&str> = contents.lines().collect();
    Ok(parse_repo_names(&lines))
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    fn cli(repos: &[&str]) -> MigrateCli {
        MigrateCli {
            source: Some("old.example.com".to_string()),
            target: Some("new.example.com".to_string()),
            source_group: Some("team".to_string()),
            target_group: Some("platform".to_string()),
            repos: repos.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn file_list_matches_inline_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.txt");
        fs::write(&path, "alpha  \nbeta\t\r\n\n  gamma\n").unwrap();
        let from_file = read_repo_list(&path).unwrap();
        let inline = parse_repo_names(&["alpha  ", "beta\t", "  gamma"]);
        assert_eq!(from_file, vec!["alpha", "beta", "gamma"]);
        assert_eq!(from_file, inline);
    }

    #[test]
    fn missing_repo_file() {
        let err = read_repo_list(Path::new("/nonexistent/repos.txt")).unwrap_err();
        assert_eq!(err.kind(), &MigrateErrorKind::Config);
    }

    #[test]
    fn settings_from_cli() {
        let settings = Settings::from_cli(&cli(&["alpha", " beta "])).unwrap();
        assert_eq!(settings.repos, vec!["alpha", "beta"]);
        let tasks = settings.into_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].repo_name(), "beta");
        assert_eq!(tasks[1].target_group(), "platform");
        assert!(!tasks[1].use_ssh());
    }

    #[test]
    fn settings_from_cli_with_repo_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "one\ntwo\n").unwrap();
        let path = path.display().to_string();
        let settings = Settings::from_cli(&cli(&[path.as_str()])).unwrap();
        assert_eq!(settings.repos, vec!["one", "two"]);
    }

    #[test]
    fn missing_cli_parameters_are_named() {
        let args = MigrateCli {
            source: Some("old.example.com".to_string()),
            ..Default::default()
        };
        let err = Settings::from_cli(&args).unwrap_err();
        assert_eq!(err.kind(), &MigrateErrorKind::Config);
        let text = err.to_string();
        assert!(text.contains("--target"));
        assert!(text.contains("--repos"));
        assert!(!text.contains("--source,"));
    }

    #[test]
    fn equal_hosts_fail_before_any_task() {
        let mut args = cli(&["alpha"]);
        args.target = args.source.clone();
        let err = Settings::from_cli(&args)
            .unwrap()
            .into_tasks()
            .unwrap_err();
        assert_eq!(err.kind(), &MigrateErrorKind::InvalidInput);
    }

    #[test]
    fn duplicate_repos_are_rejected() {
        for repos in [&["alpha", "beta", "alpha"][..], &["Alpha", "alpha"][..]] {
            let err = Settings::from_cli(&cli(repos))
                .unwrap()
                .into_tasks()
                .unwrap_err();
            assert_eq!(err.kind(), &MigrateErrorKind::Config);
            assert!(err.to_string().contains("more than once"));
        }
    }

    #[test]
    fn duplicate_in_repo_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("more.txt"), "beta\nalpha \n").unwrap();
        let data = ConfigData {
            repos: ReposSection {
                reps: vec!["alpha".to_string()],
                file: Some(PathBuf::from("more.txt")),
            },
            ..Default::default()
        };
        let mut settings = data.into_settings(dir.path()).unwrap();
        settings.source = "old.example.com".to_string();
        settings.target = "new.example.com".to_string();
        settings.source_group = "team".to_string();
        settings.target_group = "team".to_string();
        let err = settings.into_tasks().unwrap_err();
        assert_eq!(err.kind(), &MigrateErrorKind::Config);
    }

    #[test]
    fn empty_repo_list_is_rejected() {
        let err = Settings::from_cli(&cli(&[" ", ""]))
            .unwrap()
            .into_tasks()
            .unwrap_err();
        assert_eq!(err.kind(), &MigrateErrorKind::Config);
    }

    #[test]
    fn toml_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("more.txt"), "gamma\n").unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[Source]
source = "old.example.com"
source-group = "team"

[Target]
target = "new.example.com"
target-group = "platform"

[Repos]
reps = ["alpha", "beta"]
file = "more.txt"

[SSH]
use_ssh = true
"#,
        )
        .unwrap();
        let args = MigrateCli {
            config: Some(path.clone()),
            ..Default::default()
        };
        let config = MigrateConfig::try_new(args).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.settings,
            Settings {
                source: "old.example.com".to_string(),
                source_group: "team".to_string(),
                target: "new.example.com".to_string(),
                target_group: "platform".to_string(),
                repos: vec!["alpha".into(), "beta".into(), "gamma".into()],
                use_ssh: true,
            }
        );
        let tasks = config.tasks().unwrap();
        assert_eq!(
            tasks[0].source_url().unwrap(),
            "git@old.example.com:team/alpha.git"
        );
    }

    #[test]
    fn ssh_section_is_optional() {
        let data: ConfigData = toml::from_str(
            r#"
[Source]
source = "a.example.com"
source-group = "g"
[Target]
target = "b.example.com"
target-group = "g"
[Repos]
reps = ["r"]
"#,
        )
        .unwrap();
        assert!(!data.ssh.use_ssh);
        assert!(data.repos.file.is_none());
    }

    #[test]
    fn broken_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[Source]\nsource = 1\n").unwrap();
        let err = ConfigData::from_path(&path).unwrap_err();
        assert_eq!(err.kind(), &MigrateErrorKind::Config);
    }
}
