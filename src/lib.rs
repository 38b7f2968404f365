pub mod app;
pub mod config;
pub mod entity;
pub mod error;
mod http;
pub mod loader;
pub mod output;
pub mod schema;
pub mod submission;
pub mod taxonomy;
pub mod taxonomy_validator;
pub mod upload;
pub mod validator;
