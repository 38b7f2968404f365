use std::collections::HashMap;
use std::fs;
use std::path::Path;

use camino::Utf8Path;
use serde_json::Value;

use crate::error::ValidatorError;
use crate::submission::Submission;

/// Attribute holding an entity's identifier in submission documents.
pub const IDENTIFIER_ATTRIBUTE: &str = "index";

pub fn load_submission(path: &Path) -> Result<Submission, ValidatorError> {
    let content = fs::read_to_string(path)
        .map_err(|_| ValidatorError::SubmissionRead(path.to_path_buf()))?;
    let document: Value = serde_json::from_str(&content)
        .map_err(|err| ValidatorError::SubmissionParse(err.to_string()))?;
    parse_submission(document)
}

/// Builds a submission from an object keyed by entity type, where each value
/// is one attribute object or an array of them.
pub fn parse_submission(document: Value) -> Result<Submission, ValidatorError> {
    let Value::Object(types) = document else {
        return Err(ValidatorError::SubmissionParse(
            "expected an object keyed by entity type".to_string(),
        ));
    };

    let mut submission = Submission::new();
    for (entity_type, records) in types {
        let records = match records {
            Value::Array(records) => records,
            record => vec![record],
        };
        for record in records {
            let Value::Object(attributes) = record else {
                return Err(ValidatorError::SubmissionParse(format!(
                    "{entity_type} entity is not an object"
                )));
            };
            let identifier = match attributes.get(IDENTIFIER_ATTRIBUTE) {
                Some(Value::String(value)) if !value.trim().is_empty() => value.trim().to_string(),
                Some(Value::Number(value)) => value.to_string(),
                _ => {
                    return Err(ValidatorError::SubmissionParse(format!(
                        "{entity_type} entity has no '{IDENTIFIER_ATTRIBUTE}'"
                    )));
                }
            };
            submission.map(&entity_type, &identifier, attributes);
        }
    }
    tracing::debug!(entities = submission.len(), "submission loaded");
    Ok(submission)
}

/// Loads every `*.json` file in `dir` as the schema for the entity type named
/// by its file stem.
pub fn load_schemas(dir: &Utf8Path) -> Result<HashMap<String, Value>, ValidatorError> {
    let entries = dir
        .read_dir_utf8()
        .map_err(|err| ValidatorError::Filesystem(format!("read {dir}: {err}")))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| ValidatorError::Filesystem(err.to_string()))?;
        let path = entry.path();
        if path.extension() == Some("json") && path.is_file() {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    let mut schemas = HashMap::new();
    for path in paths {
        let Some(entity_type) = path.file_stem() else {
            continue;
        };
        let content = fs::read_to_string(&path)
            .map_err(|_| ValidatorError::SchemaRead(path.clone().into_std_path_buf()))?;
        let schema: Value = serde_json::from_str(&content)
            .map_err(|err| ValidatorError::SchemaParse(format!("{path}: {err}")))?;
        schemas.insert(entity_type.to_string(), schema);
    }
    tracing::debug!(schemas = schemas.len(), %dir, "schemas loaded");
    Ok(schemas)
}
