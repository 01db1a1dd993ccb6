use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use ipcheck::DEFAULT_HTTP_PORT;
use tracing::warn;

/// Runtime settings of the HTTP front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Probe policy file; the per-user default location when unset
    pub policy_path: Option<PathBuf>,
    /// Overrides the policy's batch concurrency width
    pub concurrency: Option<usize>,
    /// Browser origins allowed to call the API; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `IPCHECK_*` variables, falling back to values baked in from
    /// `.env` at build time and then to built-in defaults
    pub fn from_env() -> Self {
        Self {
            bind: setting("IPCHECK_BIND", option_env!("IPCHECK_BIND")).unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed("IPCHECK_PORT", option_env!("IPCHECK_PORT")).unwrap_or(DEFAULT_HTTP_PORT),
            policy_path: setting("IPCHECK_CONFIG", option_env!("IPCHECK_CONFIG")).map(PathBuf::from),
            concurrency: parsed("IPCHECK_CONCURRENCY", option_env!("IPCHECK_CONCURRENCY")),
            cors_origins: setting("IPCHECK_CORS_ORIGIN", option_env!("IPCHECK_CORS_ORIGIN"))
                .map(|raw| split_origins(&raw))
                .unwrap_or_default(),
        }
    }
}

fn setting(name: &str, baked: Option<&'static str>) -> Option<String> {
    env::var(name).ok().or_else(|| baked.map(str::to_string)).filter(|v| !v.trim().is_empty())
}

/// Comma-separated origin list, trailing slashes dropped
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parsed<T: FromStr>(name: &str, baked: Option<&'static str>) -> Option<T> {
    let raw = setting(name, baked)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {name}={raw:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_lists_are_split_and_trimmed() {
        assert_eq!(
            split_origins(" http://localhost:5173/ ,https://report.example,,"),
            vec!["http://localhost:5173", "https://report.example"]
        );
        assert!(split_origins(" , ").is_empty());
    }
}
