use std::env::VarError;
use std::path::PathBuf;

use thiserror::Error;

const OUT_DIR_VAR: &str = "SSDTKIT_OUT_DIR";
const OSI_VAR: &str = "SSDTKIT_OSI";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Where rendered `.dsl` files are written.
    pub out_dir: PathBuf,
    /// Interface name the simulated host answers `true` for.
    pub osi: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for env var {0}")]
    InvalidEnv(&'static str),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            osi: "Darwin".to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::var)
    }

    fn from_vars(var: impl Fn(&'static str) -> Result<String, VarError>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let out_dir = read(&var, OUT_DIR_VAR)?
            .map(PathBuf::from)
            .unwrap_or(defaults.out_dir);
        let osi = read(&var, OSI_VAR)?.unwrap_or(defaults.osi);
        Ok(Self { out_dir, osi })
    }
}

/// `None` when unset; set-but-blank and non-UTF-8 values are rejected.
fn read(
    var: &impl Fn(&'static str) -> Result<String, VarError>,
    name: &'static str,
) -> Result<Option<String>, ConfigError> {
    match var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidEnv(name)),
        Ok(value) => Ok(Some(value.trim().to_owned())),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnv(name)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(vars: &[(&'static str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<_, _> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        Config::from_vars(|name| vars.get(name).cloned().ok_or(VarError::NotPresent))
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(from_map(&[]).unwrap(), Config::default());
    }

    #[test]
    fn reads_both_variables() {
        let config = from_map(&[(OUT_DIR_VAR, "/tmp/acpi"), (OSI_VAR, "Windows 2015")]).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("/tmp/acpi"));
        assert_eq!(config.osi, "Windows 2015");
    }

    #[test]
    fn blank_values_are_invalid() {
        assert_eq!(
            from_map(&[(OSI_VAR, "  ")]),
            Err(ConfigError::InvalidEnv(OSI_VAR))
        );
        assert_eq!(
            from_map(&[(OUT_DIR_VAR, "")]),
            Err(ConfigError::InvalidEnv(OUT_DIR_VAR))
        );
    }
}
