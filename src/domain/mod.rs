pub mod defaults;
pub mod engine;
pub mod field_error;
pub mod image_cache;
pub mod tfvars;
pub mod utils;
pub mod validation;
