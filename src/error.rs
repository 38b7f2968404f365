use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ValidatorError {
    #[error("entity not found: {entity_type}/{identifier}")]
    EntityNotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("taxonomy request failed: {0}")]
    TaxonomyHttp(String),

    #[error("taxonomy service returned status {status}: {message}")]
    TaxonomyStatus { status: u16, message: String },

    #[error("unexpected taxonomy response: {0}")]
    TaxonomyResponse(String),

    #[error("schema validation request failed: {0}")]
    SchemaHttp(String),

    #[error("schema validation service returned status {status}: {message}")]
    SchemaStatus { status: u16, message: String },

    #[error("unexpected schema validation response: {0}")]
    SchemaResponse(String),

    #[error("checksum manifest request failed: {0}")]
    ChecksumHttp(String),

    #[error("checksum manifest fetch returned status {status}: {message}")]
    ChecksumStatus { status: u16, message: String },

    #[error("malformed checksum manifest line {line}: {content}")]
    ManifestLine { line: usize, content: String },

    #[error("failed to read submission file at {0}")]
    SubmissionRead(PathBuf),

    #[error("failed to parse submission: {0}")]
    SubmissionParse(String),

    #[error("failed to read schema file at {0}")]
    SchemaRead(PathBuf),

    #[error("failed to parse schema: {0}")]
    SchemaParse(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("{failed} entities could not be validated; first failure: {first}")]
    Incomplete {
        failed: usize,
        first: Box<ValidatorError>,
    },
}

impl ValidatorError {
    /// True for faults raised by one of the remote collaborators.
    pub fn is_remote(&self) -> bool {
        match self {
            ValidatorError::TaxonomyHttp(_)
            | ValidatorError::TaxonomyStatus { .. }
            | ValidatorError::TaxonomyResponse(_)
            | ValidatorError::SchemaHttp(_)
            | ValidatorError::SchemaStatus { .. }
            | ValidatorError::SchemaResponse(_)
            | ValidatorError::ChecksumHttp(_)
            | ValidatorError::ChecksumStatus { .. } => true,
            ValidatorError::Incomplete { first, .. } => first.is_remote(),
            _ => false,
        }
    }
}
