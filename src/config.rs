//! Session configuration: where the Portainer API lives, the access token,
//! and which stack (or `ALL`) the panel controls.
//!
//! Values come from a `.env`-style file, overridden by the process
//! environment and command-line flags. A configuration that fails to load
//! does not abort the program: the session starts in a permanent error
//! state in which every action is disabled.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub const URL_KEY: &str = "PORTAINER_URL";
pub const TOKEN_KEY: &str = "PORTAINER_TOKEN";
pub const STACK_KEY: &str = "STACK_NAME";
pub const ALLOWED_IPS_KEY: &str = "ALLOWED_IPS";

/// Target sentinel selecting the all-stacks grid.
pub const ALL_STACKS: &str = "ALL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid PORTAINER_URL '{0}'")]
    InvalidUrl(String),

    /// The session was started with a broken configuration.
    #[error("{0}")]
    Unavailable(String),
}

/// What the panel controls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Stack(String),
    All,
}

impl Target {
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_STACKS {
            Target::All
        } else {
            Target::Stack(raw.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Target::All)
    }
}

/// How a Swarm start/stop treats per-service update failures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalePolicy {
    /// Update every service, report the failures afterwards.
    #[default]
    BestEffort,
    /// Stop at the first failed service and fail the action.
    AllOrNothing,
}

/// Timing knobs shared by the orchestrator state machines.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    pub refresh_period: Duration,
    pub log_tail: u32,
    pub log_poll: Duration,
    pub restart_poll: Duration,
    pub restart_timeout: Duration,
    pub post_action_refresh: Duration,
    pub request_timeout: Duration,
    pub scale_policy: ScalePolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            refresh_period: Duration::from_secs(30),
            log_tail: 100,
            log_poll: Duration::from_secs(2),
            restart_poll: Duration::from_secs(2),
            restart_timeout: Duration::from_secs(60),
            post_action_refresh: Duration::from_secs(3),
            request_timeout: Duration::from_secs(15),
            scale_policy: ScalePolicy::BestEffort,
        }
    }
}

/// Immutable session configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub token: String,
    pub target: Target,
    /// Set when loading failed; the message is shown and all actions stay disabled.
    pub error: Option<String>,
    pub tuning: Tuning,
}

/// Values supplied on the command line or through the process environment.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub token: Option<String>,
    pub stack: Option<String>,
}

impl Config {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// A session in the permanent error state.
    pub fn errored(error: &ConfigError, tuning: Tuning) -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            target: Target::Stack(String::new()),
            error: Some(error.to_string()),
            tuning,
        }
    }

    /// Fail with the load error if the session is unusable.
    pub fn ensure_usable(&self) -> Result<(), ConfigError> {
        match &self.error {
            Some(msg) => Err(ConfigError::Unavailable(msg.clone())),
            None => Ok(()),
        }
    }

    /// Load from `env_file`, then apply `overrides`. A missing file is only an
    /// error if the overrides do not supply every required value.
    pub fn load(env_file: &Path, overrides: &Overrides, tuning: Tuning) -> Result<Self, ConfigError> {
        let file_vars = read_env_file(env_file)?;
        Self::from_sources(&file_vars, overrides, tuning)
    }

    /// Merge file values with overrides and validate.
    pub fn from_sources(
        file_vars: &HashMap<String, String>,
        overrides: &Overrides,
        tuning: Tuning,
    ) -> Result<Self, ConfigError> {
        let pick = |over: &Option<String>, key: &str| -> Option<String> {
            over.clone()
                .or_else(|| file_vars.get(key).cloned())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let url = pick(&overrides.url, URL_KEY);
        let token = pick(&overrides.token, TOKEN_KEY);
        let stack = pick(&overrides.stack, STACK_KEY);

        if file_vars.contains_key(ALLOWED_IPS_KEY) {
            warn!("{} is set but access gating is not handled by this program", ALLOWED_IPS_KEY);
        }

        let mut missing = Vec::new();
        if url.is_none() {
            missing.push(URL_KEY);
        }
        if token.is_none() {
            missing.push(TOKEN_KEY);
        }
        if stack.is_none() {
            missing.push(STACK_KEY);
        }
        let (Some(url), Some(token), Some(stack)) = (url, token, stack) else {
            return Err(ConfigError::Missing(missing));
        };

        let base_url = normalize_url(&url)?;
        let target = Target::parse(&stack);
        info!(base_url = %base_url, target = ?target, "configuration loaded");

        Ok(Self {
            base_url,
            token,
            target,
            error: None,
            tuning,
        })
    }
}

/// Parse a `.env` file without touching the process environment.
/// A missing file yields an empty map.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("environment file {} not found", path.display());
            return Ok(HashMap::new());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        vars.insert(key, value);
    }
    Ok(vars)
}

fn normalize_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = reqwest::Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn loads_all_values_from_file_vars() {
        let file = vars(&[
            (URL_KEY, "https://portainer.example.com/"),
            (TOKEN_KEY, "ptr_secret"),
            (STACK_KEY, "demo-compose"),
        ]);
        let cfg = Config::from_sources(&file, &Overrides::default(), Tuning::default()).unwrap();
        assert_eq!(cfg.base_url, "https://portainer.example.com");
        assert_eq!(cfg.token, "ptr_secret");
        assert_eq!(cfg.target, Target::Stack("demo-compose".into()));
        assert!(!cfg.has_error());
    }

    #[test]
    fn all_sentinel_selects_grid() {
        let file = vars(&[(URL_KEY, "http://p:9000"), (TOKEN_KEY, "t"), (STACK_KEY, "ALL")]);
        let cfg = Config::from_sources(&file, &Overrides::default(), Tuning::default()).unwrap();
        assert!(cfg.target.is_all());
        // Case-sensitive: "all" is a stack name.
        assert_eq!(Target::parse("all"), Target::Stack("all".into()));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = vars(&[(URL_KEY, "http://file:9000"), (TOKEN_KEY, "file"), (STACK_KEY, "a")]);
        let overrides = Overrides {
            token: Some("cli".into()),
            stack: Some("b".into()),
            ..Default::default()
        };
        let cfg = Config::from_sources(&file, &overrides, Tuning::default()).unwrap();
        assert_eq!(cfg.base_url, "http://file:9000");
        assert_eq!(cfg.token, "cli");
        assert_eq!(cfg.target, Target::Stack("b".into()));
    }

    #[test]
    fn missing_values_are_listed() {
        let file = vars(&[(URL_KEY, "http://p:9000"), (TOKEN_KEY, "  ")]);
        let err = Config::from_sources(&file, &Overrides::default(), Tuning::default()).unwrap_err();
        match err {
            ConfigError::Missing(keys) => assert_eq!(keys, vec![TOKEN_KEY, STACK_KEY]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_http_url() {
        let file = vars(&[(URL_KEY, "ftp://p"), (TOKEN_KEY, "t"), (STACK_KEY, "s")]);
        let err = Config::from_sources(&file, &Overrides::default(), Tuning::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn errored_session_is_unusable() {
        let cfg = Config::errored(&ConfigError::Missing(vec![URL_KEY]), Tuning::default());
        assert!(cfg.has_error());
        let err = cfg.ensure_usable().unwrap_err();
        assert!(err.to_string().contains(URL_KEY));
    }

    #[test]
    fn reads_env_file_with_comments_and_quotes() {
        let dir = std::env::temp_dir().join(format!("stackpanel-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "# panel settings").unwrap();
        writeln!(f, "PORTAINER_URL=\"https://p.example.com\"").unwrap();
        writeln!(f, "PORTAINER_TOKEN='abc=='").unwrap();
        writeln!(f, "STACK_NAME=web").unwrap();
        drop(f);

        let cfg = Config::load(&path, &Overrides::default(), Tuning::default()).unwrap();
        assert_eq!(cfg.base_url, "https://p.example.com");
        assert_eq!(cfg.token, "abc==");
        assert_eq!(cfg.target, Target::Stack("web".into()));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_env_file_falls_back_to_overrides() {
        let overrides = Overrides {
            url: Some("http://p:9000".into()),
            token: Some("t".into()),
            stack: Some("ALL".into()),
        };
        let cfg = Config::load(Path::new("/nonexistent/stackpanel/.env"), &overrides, Tuning::default()).unwrap();
        assert!(cfg.target.is_all());
    }
}
