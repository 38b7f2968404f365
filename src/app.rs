use serde::Serialize;

use crate::submission::{Submission, SubmissionErrors};
use crate::validator::SubmissionValidator;

#[derive(Debug, Clone, Serialize)]
pub struct ValidatorFault {
    pub validator: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub entities: usize,
    pub errors: SubmissionErrors,
    pub faults: Vec<ValidatorFault>,
    pub validated_at: String,
}

/// Runs a fixed sequence of validators over a submission.
#[derive(Default)]
pub struct App {
    validators: Vec<Box<dyn SubmissionValidator>>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator<V>(mut self, validator: V) -> Self
    where
        V: SubmissionValidator + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|validator| validator.name()).collect()
    }

    /// Every validator runs even if an earlier one faulted; faults are
    /// reported next to whatever errors were recorded.
    pub fn validate(&self, submission: &mut Submission) -> ValidationReport {
        let mut faults = Vec::new();
        for validator in &self.validators {
            let name = validator.name();
            tracing::info!(validator = name, entities = submission.len(), "running validator");
            if let Err(err) = validator.validate_submission(submission) {
                tracing::warn!(validator = name, error = %err, "validator did not complete");
                faults.push(ValidatorFault {
                    validator: name.to_string(),
                    message: err.to_string(),
                });
            }
        }

        let errors = submission.get_all_errors();
        ValidationReport {
            valid: faults.is_empty() && errors.is_empty(),
            entities: submission.len(),
            errors,
            faults,
            validated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
