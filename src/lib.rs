use crate::api::install_config_dto::InstallConfig;
use crate::domain::defaults::set_install_config_defaults;
use crate::error::Result;
use crate::loader::parser::parse_yaml_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Reads `install-config.yaml` and fills in the oVirt platform defaults.
pub fn load_install_config(file_path: &str) -> Result<InstallConfig> {
    let mut install_config: InstallConfig = parse_yaml_file(file_path)?;
    log::info!("Install config '{}' parsed successfully.", file_path);

    set_install_config_defaults(&mut install_config);

    Ok(install_config)
}
