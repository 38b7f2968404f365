use crate::entity::Entity;
use crate::error::ValidatorError;
use crate::submission::Submission;
use crate::taxonomy::{
    SCIENTIFIC_NAME_FIELD, TAX_ID_FIELD, TaxonomyLookup, TaxonomyOutcome, inconsistency_message,
};
use crate::validator::{EntityValidator, SubmissionValidator, validate_each};

/// Checks that an entity's `scientific_name` and `tax_id` are individually
/// valid and refer to the same submittable taxon.
pub struct TaxonomyValidator<L: TaxonomyLookup> {
    lookup: L,
}

impl<L: TaxonomyLookup> TaxonomyValidator<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    fn check_pair(
        &self,
        entity: &mut Entity,
        scientific_name: &str,
        tax_id: &str,
    ) -> Result<(), ValidatorError> {
        let by_name = self.lookup.validate_scientific_name(scientific_name)?;
        let by_id = self.lookup.validate_tax_id(tax_id)?;

        if let Some(message) = by_name.error() {
            entity.add_error(SCIENTIFIC_NAME_FIELD, message);
        }
        if let Some(message) = by_id.error() {
            entity.add_error(TAX_ID_FIELD, message);
        }

        // An unresolvable side can never match the other one.
        let consistent = match (by_name.tax_id(), by_id.tax_id()) {
            (Some(from_name), Some(from_id)) => from_name == from_id,
            _ => false,
        };
        if !consistent {
            let message = inconsistency_message(tax_id, scientific_name);
            entity.add_error(SCIENTIFIC_NAME_FIELD, message.clone());
            entity.add_error(TAX_ID_FIELD, message);
        }
        Ok(())
    }
}

impl<L: TaxonomyLookup> EntityValidator for TaxonomyValidator<L> {
    fn validate_entity(&self, entity: &mut Entity) -> Result<(), ValidatorError> {
        let scientific_name = entity.text_attribute(SCIENTIFIC_NAME_FIELD);
        let tax_id = entity.text_attribute(TAX_ID_FIELD);

        match (scientific_name, tax_id) {
            (None, None) => Ok(()),
            (None, Some(tax_id)) => {
                if let TaxonomyOutcome::Invalid(message) = self.lookup.validate_tax_id(&tax_id)? {
                    entity.add_error(TAX_ID_FIELD, message);
                }
                Ok(())
            }
            (Some(scientific_name), None) => {
                if let TaxonomyOutcome::Invalid(message) =
                    self.lookup.validate_scientific_name(&scientific_name)?
                {
                    entity.add_error(SCIENTIFIC_NAME_FIELD, message);
                }
                Ok(())
            }
            (Some(scientific_name), Some(tax_id)) => {
                self.check_pair(entity, &scientific_name, &tax_id)
            }
        }
    }
}

impl<L: TaxonomyLookup> SubmissionValidator for TaxonomyValidator<L> {
    fn name(&self) -> &'static str {
        "taxonomy"
    }

    fn validate_submission(&self, submission: &mut Submission) -> Result<(), ValidatorError> {
        validate_each(self, submission)
    }
}
