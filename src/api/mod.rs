pub mod engine_dto;
pub mod install_config_dto;
pub mod provider_spec_dto;
