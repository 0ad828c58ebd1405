use crate::domain::engine::connection::EngineConnection;
use crate::domain::engine::engine_api::EngineApi;
use crate::domain::engine::engine_config::EngineConfig;
use crate::error::{Error, Result};

/// Checks that `password` authenticates against the Engine described by `config`.
///
/// Meant as the validator behind an interactive password prompt. The connection
/// only lives for the duration of the check.
pub fn check_credentials(config: &EngineConfig, password: &str) -> Result<()> {
    let candidate = EngineConfig { ovirt_password: password.to_string(), ..config.clone() };

    let connection = EngineConnection::build(&candidate)?;
    connection.test().map_err(|e| Error::Authentication(e.to_string()))?;
    log::info!("Authenticated against {} as {}", candidate.ovirt_url, candidate.ovirt_username);
    Ok(())
}
