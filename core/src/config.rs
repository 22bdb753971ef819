//! Configuration and credential handling.
//!
//! Two layers with precedence: a TOML file, then `BOARDSYNC_*`
//! environment overrides. The API token is deliberately not part of
//! [`SyncConfig`]: it is loaded separately from `GITHUB_TOKEN` into a
//! [`SecretToken`] whose `Debug` redacts, and it is never serialized.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for ${var}: {value:?} ({expected})")]
    InvalidEnvValue {
        var: String,
        value: String,
        expected: &'static str,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("missing API token: set the {0} environment variable")]
    MissingToken(&'static str),
}

/// Whether the board owner is a user or an organization account. The
/// GraphQL query root differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    User,
    Organization,
}

impl AccountKind {
    /// The query field that roots the project lookup.
    pub fn query_field(self) -> &'static str {
        match self {
            AccountKind::User => "user",
            AccountKind::Organization => "organization",
        }
    }
}

/// Settings for the pitch-status report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PitchConfig {
    /// Project number of the pitch board to scan.
    pub project_number: u64,
    /// Repositories whose issues feed the pitch scan.
    pub repos: Vec<String>,
    /// Label that marks an issue as a pitch.
    #[serde(default = "default_pitch_label")]
    pub label: String,
    /// Heading that identifies the status note card to rewrite.
    #[serde(default = "default_pitch_heading")]
    pub heading: String,
}

fn default_pitch_label() -> String {
    "DS".to_string()
}

fn default_pitch_heading() -> String {
    "# Active Pitches".to_string()
}

/// Board identity and reconciliation policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Login of the account that owns the project board.
    pub owner: String,
    pub account_kind: AccountKind,
    pub project_number: u64,
    /// Repositories whose issues and pull requests are tracked.
    pub repos: Vec<String>,
    /// Days a closed/merged item stays in Done before its card ages out.
    #[serde(default = "default_done_age_out")]
    pub done_age_out_days: i64,
    #[serde(default)]
    pub pitch: Option<PitchConfig>,
}

fn default_done_age_out() -> i64 {
    7
}

impl SyncConfig {
    /// Parse a TOML document and validate.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let cfg: SyncConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a file, apply environment overrides, validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut cfg: SyncConfig = toml::from_str(&text)?;
        cfg.apply_env_overrides(&std::env::vars().collect())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `BOARDSYNC_*` overrides from the given environment map.
    /// Taking the map as an argument keeps this testable without
    /// touching process-global state.
    pub fn apply_env_overrides(
        &mut self,
        env: &HashMap<String, String>,
    ) -> Result<(), ConfigError> {
        if let Some(owner) = env.get("BOARDSYNC_OWNER") {
            self.owner = owner.clone();
        }
        if let Some(number) = env.get("BOARDSYNC_PROJECT_NUMBER") {
            self.project_number =
                number
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnvValue {
                        var: "BOARDSYNC_PROJECT_NUMBER".to_string(),
                        value: number.clone(),
                        expected: "a positive integer",
                    })?;
        }
        if let Some(days) = env.get("BOARDSYNC_DONE_AGE_OUT_DAYS") {
            self.done_age_out_days =
                days.parse().map_err(|_| ConfigError::InvalidEnvValue {
                    var: "BOARDSYNC_DONE_AGE_OUT_DAYS".to_string(),
                    value: days.clone(),
                    expected: "a number of days",
                })?;
        }
        if let Some(repos) = env.get("BOARDSYNC_REPOS") {
            self.repos = repos
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.trim().is_empty() {
            return Err(ConfigError::Invalid("owner must not be empty".to_string()));
        }
        if self.repos.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one tracked repository is required".to_string(),
            ));
        }
        if self.done_age_out_days < 0 {
            return Err(ConfigError::Invalid(
                "done_age_out_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// API credential. Loaded once at process start; redacted in `Debug`,
/// never serialized, never logged.
#[derive(Clone)]
pub struct SecretToken(String);

impl SecretToken {
    pub const ENV_VAR: &'static str = "GITHUB_TOKEN";

    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Read the token from `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(Self::ENV_VAR) {
            Ok(token) if !token.trim().is_empty() => Ok(Self(token)),
            _ => Err(ConfigError::MissingToken(Self::ENV_VAR)),
        }
    }

    /// Expose the raw token for the `Authorization` header. Callers
    /// must not persist or log the returned value.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
        owner = "acme"
        account_kind = "organization"
        project_number = 5
        repos = ["widgets", "gadgets"]
    "#;

    #[test]
    fn minimal_config_applies_defaults() {
        let cfg = SyncConfig::from_toml(MINIMAL).unwrap_or_else(|e| panic!("parse: {e}"));
        assert_eq!(cfg.owner, "acme");
        assert_eq!(cfg.account_kind, AccountKind::Organization);
        assert_eq!(cfg.done_age_out_days, 7);
        assert!(cfg.pitch.is_none());
    }

    #[test]
    fn pitch_section_parses_with_defaults() {
        let text = format!(
            "{MINIMAL}\n[pitch]\nproject_number = 11\nrepos = [\"product\"]\n"
        );
        let cfg = SyncConfig::from_toml(&text).unwrap_or_else(|e| panic!("parse: {e}"));
        let pitch = cfg.pitch.unwrap_or_else(|| panic!("expected pitch section"));
        assert_eq!(pitch.label, "DS");
        assert_eq!(pitch.heading, "# Active Pitches");
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut cfg = SyncConfig::from_toml(MINIMAL).unwrap_or_else(|e| panic!("parse: {e}"));
        let env = HashMap::from([
            ("BOARDSYNC_OWNER".to_string(), "other".to_string()),
            ("BOARDSYNC_PROJECT_NUMBER".to_string(), "9".to_string()),
            (
                "BOARDSYNC_REPOS".to_string(),
                "alpha, beta,".to_string(),
            ),
        ]);
        cfg.apply_env_overrides(&env)
            .unwrap_or_else(|e| panic!("overrides: {e}"));
        assert_eq!(cfg.owner, "other");
        assert_eq!(cfg.project_number, 9);
        assert_eq!(cfg.repos, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn bad_env_number_is_rejected() {
        let mut cfg = SyncConfig::from_toml(MINIMAL).unwrap_or_else(|e| panic!("parse: {e}"));
        let env = HashMap::from([(
            "BOARDSYNC_PROJECT_NUMBER".to_string(),
            "not-a-number".to_string(),
        )]);
        let err = cfg.apply_env_overrides(&env).err();
        assert!(matches!(err, Some(ConfigError::InvalidEnvValue { .. })));
    }

    #[test]
    fn empty_repo_list_is_invalid() {
        let text = r#"
            owner = "acme"
            account_kind = "user"
            project_number = 3
            repos = []
        "#;
        let err = SyncConfig::from_toml(text).err();
        assert!(matches!(err, Some(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_a_config_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = dir.path().join("boardsync.toml");
        std::fs::write(&path, MINIMAL).unwrap_or_else(|e| panic!("write: {e}"));

        let cfg = SyncConfig::load(&path).unwrap_or_else(|e| panic!("load: {e}"));
        assert_eq!(cfg.repos.len(), 2);
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let err = SyncConfig::load(Path::new("/nonexistent/boardsync.toml")).err();
        assert!(matches!(err, Some(ConfigError::Io { .. })));
    }

    #[test]
    fn secret_token_debug_redacts() {
        let token = SecretToken::new("ghp_sensitive".to_string());
        assert_eq!(format!("{token:?}"), "SecretToken(***)");
        assert_eq!(token.reveal(), "ghp_sensitive");
    }
}
