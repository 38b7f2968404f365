use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ValidatorError;
use crate::http::http_client;
use crate::submission::Submission;
use crate::validator::{SubmissionValidator, finish};

pub const DEFAULT_SCHEMA_URL: &str = "http://localhost:3020/validate";

/// One violating field reported by the schema-checking service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchemaViolation {
    #[serde(rename = "dataPath")]
    pub data_path: String,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SchemaViolation {
    /// Field name addressed by the violation path, e.g. `.release_date` → `release_date`.
    pub fn field(&self) -> &str {
        self.data_path
            .strip_prefix('.')
            .unwrap_or(&self.data_path)
    }
}

pub trait SchemaClient: Send + Sync {
    fn validate(&self, schema: &Value, data: &Value) -> Result<Vec<SchemaViolation>, ValidatorError>;
}

#[derive(Clone)]
pub struct SchemaHttpClient {
    client: Client,
    url: String,
}

impl SchemaHttpClient {
    pub fn new(url: &str) -> Result<Self, ValidatorError> {
        let client = http_client(Duration::from_secs(60), ValidatorError::SchemaHttp)?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl SchemaClient for SchemaHttpClient {
    fn validate(&self, schema: &Value, data: &Value) -> Result<Vec<SchemaViolation>, ValidatorError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "schema": schema, "data": data }))
            .send()
            .map_err(|err| ValidatorError::SchemaHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "schema validation request failed".to_string());
            return Err(ValidatorError::SchemaStatus { status, message });
        }
        response
            .json()
            .map_err(|err| ValidatorError::SchemaResponse(err.to_string()))
    }
}

/// Checks entity attributes against the JSON schema registered for their type.
pub struct SchemaValidator<C: SchemaClient> {
    client: C,
    schema_by_type: HashMap<String, Value>,
}

impl<C: SchemaClient> SchemaValidator<C> {
    pub fn new(client: C, schema_by_type: HashMap<String, Value>) -> Self {
        Self {
            client,
            schema_by_type,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Sends each entity of every type, in registration order, and files the
    /// violations returned for it under the entity it was sent for.
    pub fn validate_data(&self, submission: &mut Submission) -> Result<(), ValidatorError> {
        let entity_types: Vec<String> = submission.entity_types().map(str::to_string).collect();
        let mut failures = Vec::new();

        for entity_type in entity_types {
            let Some(schema) = self.schema_by_type.get(&entity_type) else {
                tracing::warn!(%entity_type, "no schema registered; skipping");
                continue;
            };
            for entity in submission.entities_mut(&entity_type) {
                let data = Value::Object(entity.attributes().clone());
                let violations = match self.client.validate(schema, &data) {
                    Ok(violations) => violations,
                    Err(err) => {
                        tracing::warn!(
                            %entity_type,
                            identifier = entity.identifier(),
                            error = %err,
                            "schema validation failed"
                        );
                        failures.push(err);
                        continue;
                    }
                };
                tracing::debug!(
                    %entity_type,
                    identifier = entity.identifier(),
                    violations = violations.len(),
                    "schema checked"
                );
                for violation in violations {
                    let field = violation.field().to_string();
                    for message in violation.errors {
                        entity.add_error(field.clone(), message);
                    }
                }
            }
        }
        finish(failures)
    }
}

impl<C: SchemaClient> SubmissionValidator for SchemaValidator<C> {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn validate_submission(&self, submission: &mut Submission) -> Result<(), ValidatorError> {
        self.validate_data(submission)
    }
}
