use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::engine::connection::EngineConnection;
use crate::domain::engine::engine_api::{EngineApi, EngineConnector};
use crate::error::{Error, Result};
use crate::loader::parser::parse_yaml_file;

const CONFIG_ENV: &str = "OVIRT_CONFIG";
const CONFIG_DIR: &str = ".ovirt";
const CONFIG_FILE: &str = "ovirt-config.yaml";

/// Engine connection settings, stored in `~/.ovirt/ovirt-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    pub ovirt_url: String,
    pub ovirt_username: String,
    #[serde(default)]
    pub ovirt_password: String,
    #[serde(default)]
    pub ovirt_cafile: String,
    #[serde(default)]
    pub ovirt_ca_bundle: String,
    #[serde(default)]
    pub ovirt_insecure: bool,
}

impl EngineConfig {
    /// Location of the config file: `$OVIRT_CONFIG`, else `~/.ovirt/ovirt-config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let home = std::env::var("HOME").map_err(|_| Error::Config("HOME is not set".to_string()))?;
        Ok(PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn load(path: &str) -> Result<Self> {
        let config: EngineConfig = parse_yaml_file(path)?;
        config.check()?;
        log::debug!("Loaded Engine config for {} from '{}'", config.ovirt_url, path);
        Ok(config)
    }

    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load(&path.to_string_lossy())
    }

    pub fn check(&self) -> Result<()> {
        if self.ovirt_url.is_empty() {
            return Err(Error::Config("ovirt_url must be set".to_string()));
        }
        if self.ovirt_username.is_empty() {
            return Err(Error::Config("ovirt_username must be set".to_string()));
        }
        Ok(())
    }
}

impl EngineConnector for EngineConfig {
    fn connect(&self) -> Result<Box<dyn EngineApi>> {
        let connection = EngineConnection::build(self)?;
        Ok(Box::new(connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "ovirt_url: https://engine.example.com/ovirt-engine/api\novirt_username: admin@internal\novirt_password: secret\novirt_insecure: true"
        )
        .unwrap();

        let config = EngineConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.ovirt_username, "admin@internal");
        assert!(config.ovirt_insecure);
        assert!(config.ovirt_cafile.is_empty());
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let config = EngineConfig { ovirt_username: "admin@internal".to_string(), ..Default::default() };
        assert!(matches!(config.check(), Err(Error::Config(_))));
    }
}
