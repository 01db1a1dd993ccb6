//! Loading and writing the probe policy as TOML.

use std::{env, fmt, fs, path};

use tracing::info;

use super::types::ProbePolicy;
use crate::error::ConfigError;

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/ipcheck/config.toml or
/// $HOME/.config/...)
pub fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::PathUnavailable);
    };

    Ok(path.join("ipcheck/config.toml"))
}

impl ProbePolicy {
    /// Load the policy from a file
    ///
    /// Uses `$XDG_CONFIG_HOME/ipcheck/config.toml` when no path is given, and
    /// writes a default policy there if the file does not exist yet. The
    /// loaded policy is validated before it is returned.
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let policy = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            Self::from_toml_str(&raw_string)?
        } else {
            info!("No config at {}, writing defaults", config_path.display());
            let policy = Self::default();
            policy.write_config(&config_path)?;
            policy
        };

        policy.validate()?;
        Ok(policy)
    }

    /// Parse a policy from TOML text; missing keys take their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Serialize and write the policy to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }

        fs::write(path, config_str).map_err(ConfigError::Write)
    }
}

impl fmt::Display for ProbePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_0 = write_indented(0);
        let write_1 = write_indented(1);

        let methods = self.methods.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(" -> ");
        let ports = self.tcp.ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ");

        writeln!(f, "Current Probe Policy:")?;
        write_0(f, "Cascade", &methods)?;
        write_0(f, "Concurrency", &self.concurrency)?;
        write_0(f, "Target Deadline (ms)", &self.target_deadline_ms)?;
        write_0(f, "Max Batch Size", &self.max_batch_size)?;
        write_title_1(f, "Echo")?;
        write_1(f, "Enabled", &self.echo.enabled)?;
        write_1(f, "Count", &self.echo.count)?;
        write_1(f, "Timeout (ms)", &self.echo.timeout_ms)?;
        write_title_1(f, "TCP")?;
        write_1(f, "Ports", &ports)?;
        write_1(f, "Timeout (ms)", &self.tcp.timeout_ms)?;
        write_title_1(f, "UDP")?;
        write_1(f, "Port", &self.udp.port)?;
        write_1(f, "Timeout (ms)", &self.udp.timeout_ms)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeMethod;

    #[test]
    fn normalizes_extension() {
        assert_eq!(normalize_toml_path(path::Path::new("/tmp/policy")), path::PathBuf::from("/tmp/policy.toml"));
        assert_eq!(normalize_toml_path(path::Path::new("/tmp/a.json")), path::PathBuf::from("/tmp/a.toml"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let policy = ProbePolicy::from_toml_str(
            r#"
            methods = ["tcp", "udp"]
            concurrency = 2

            [tcp]
            ports = [8443]
            "#,
        )
        .unwrap();

        assert_eq!(policy.methods, vec![ProbeMethod::Tcp, ProbeMethod::Udp]);
        assert_eq!(policy.concurrency, 2);
        assert_eq!(policy.tcp.ports, vec![8443]);
        assert_eq!(policy.tcp.timeout_ms, 1_500);
        assert_eq!(policy.udp.port, 53);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/ipcheck");

        let policy = ProbePolicy::from_config(Some(&path)).unwrap();
        assert_eq!(policy, ProbePolicy::default());
        assert!(dir.path().join("nested/ipcheck.toml").exists());

        let reloaded = ProbePolicy::from_config(Some(&path)).unwrap();
        assert_eq!(reloaded, policy);
    }

    #[test]
    fn invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "concurrency = 0\n").unwrap();

        assert!(matches!(ProbePolicy::from_config(Some(&path)), Err(ConfigError::Invalid(_))));

        fs::write(&path, "concurrency = \"lots\"\n").unwrap();
        assert!(matches!(ProbePolicy::from_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn display_lists_cascade() {
        let rendered = ProbePolicy::default().to_string();
        assert!(rendered.contains("ping -> tcp -> udp"));
        assert!(rendered.contains("80, 443, 22, 8080, 3389, 21, 23"));
    }
}
