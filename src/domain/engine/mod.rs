pub mod connection;
pub mod credentials;
pub mod engine_api;
pub mod engine_config;
pub mod engine_endpoint;
pub mod engine_mock;
