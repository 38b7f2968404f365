use crate::entity::Entity;
use crate::error::ValidatorError;
use crate::submission::Submission;

/// Validates one entity at a time, recording findings in its ledger.
pub trait EntityValidator {
    fn validate_entity(&self, entity: &mut Entity) -> Result<(), ValidatorError>;
}

/// Validates a whole submission in one pass.
pub trait SubmissionValidator {
    fn name(&self) -> &'static str;
    fn validate_submission(&self, submission: &mut Submission) -> Result<(), ValidatorError>;
}

/// Runs `validator` over every entity. A fault on one entity is logged and
/// does not stop the others; the first fault is reported once the pass ends.
pub fn validate_each<V>(validator: &V, submission: &mut Submission) -> Result<(), ValidatorError>
where
    V: EntityValidator + ?Sized,
{
    let mut failures = Vec::new();
    for entity in submission.iter_mut() {
        if let Err(err) = validator.validate_entity(entity) {
            tracing::warn!(
                entity_type = entity.entity_type(),
                identifier = entity.identifier(),
                error = %err,
                "entity could not be validated"
            );
            failures.push(err);
        }
    }
    finish(failures)
}

pub(crate) fn finish(failures: Vec<ValidatorError>) -> Result<(), ValidatorError> {
    let failed = failures.len();
    match failures.into_iter().next() {
        None => Ok(()),
        Some(first) => Err(ValidatorError::Incomplete {
            failed,
            first: Box::new(first),
        }),
    }
}
