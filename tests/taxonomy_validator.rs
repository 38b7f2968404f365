use std::collections::BTreeMap;

use serde_json::{Value, json};

use submission_validator::entity::{Attributes, Entity, ErrorMap};
use submission_validator::error::ValidatorError;
use submission_validator::submission::Submission;
use submission_validator::taxonomy::{TaxonomyLookup, TaxonomyOutcome, TaxonomyRecord};
use submission_validator::taxonomy_validator::TaxonomyValidator;
use submission_validator::validator::{EntityValidator, SubmissionValidator};

const SARS_COV_2: &str = "Severe acute respiratory syndrome coronavirus 2";

/// Answers name and ID lookups from fixed outcomes; `None` means the lookup
/// must not be called.
struct StubLookup {
    by_name: Option<TaxonomyOutcome>,
    by_id: Option<TaxonomyOutcome>,
}

impl TaxonomyLookup for StubLookup {
    fn validate_tax_id(&self, tax_id: &str) -> Result<TaxonomyOutcome, ValidatorError> {
        self.by_id
            .clone()
            .ok_or_else(|| ValidatorError::TaxonomyHttp(format!("unexpected lookup {tax_id}")))
    }

    fn validate_scientific_name(&self, name: &str) -> Result<TaxonomyOutcome, ValidatorError> {
        self.by_name
            .clone()
            .ok_or_else(|| ValidatorError::TaxonomyHttp(format!("unexpected lookup {name}")))
    }
}

fn human() -> TaxonomyOutcome {
    TaxonomyOutcome::Valid(serde_json::from_value::<TaxonomyRecord>(json!({
        "taxId": "9606",
        "scientificName": "Homo sapiens",
        "commonName": "human",
        "formalName": "true",
        "rank": "species",
        "division": "HUM",
        "geneticCode": "1",
        "mitochondrialGeneticCode": "2",
        "submittable": "true"
    }))
    .unwrap())
}

fn sars_cov_2() -> TaxonomyOutcome {
    TaxonomyOutcome::Valid(serde_json::from_value::<TaxonomyRecord>(json!({
        "taxId": "2697049",
        "scientificName": SARS_COV_2,
        "formalName": "false",
        "rank": "no rank",
        "division": "VRL",
        "geneticCode": "1",
        "submittable": "true"
    }))
    .unwrap())
}

fn invalid(message: &str) -> TaxonomyOutcome {
    TaxonomyOutcome::Invalid(message.to_string())
}

fn sample(attributes: Value) -> Entity {
    let Value::Object(attributes) = attributes else {
        panic!("sample attributes must be an object");
    };
    Entity::new("sample", "sample1", attributes)
}

fn validate(by_name: Option<TaxonomyOutcome>, by_id: Option<TaxonomyOutcome>, entity: &mut Entity) {
    let validator = TaxonomyValidator::new(StubLookup { by_name, by_id });
    validator.validate_entity(entity).unwrap();
}

fn expected(entries: &[(&str, &[&str])]) -> ErrorMap {
    entries
        .iter()
        .map(|(field, messages)| {
            (
                field.to_string(),
                messages.iter().map(|message| message.to_string()).collect(),
            )
        })
        .collect::<BTreeMap<_, _>>()
}

#[test]
fn valid_sample_taxonomy_has_no_errors() {
    let mut entity = sample(json!({"scientific_name": SARS_COV_2, "tax_id": "2697049"}));
    validate(Some(sars_cov_2()), Some(sars_cov_2()), &mut entity);

    assert!(!entity.has_errors());
    assert!(entity.get_errors().is_empty());
}

#[test]
fn valid_tax_id_alone_has_no_errors() {
    let mut entity = sample(json!({"tax_id": "2697049"}));
    validate(None, Some(sars_cov_2()), &mut entity);
    assert!(!entity.has_errors());
}

#[test]
fn valid_name_alone_has_no_errors() {
    let mut entity = sample(json!({"scientific_name": SARS_COV_2}));
    validate(Some(sars_cov_2()), None, &mut entity);
    assert!(!entity.has_errors());
}

#[test]
fn neither_attribute_is_a_no_op() {
    let mut entity = Entity::new("sample", "sample1", Attributes::new());
    validate(None, None, &mut entity);
    assert!(!entity.has_errors());
}

#[test]
fn inconsistent_sample_reports_on_both_fields() {
    let mut entity = sample(json!({"scientific_name": SARS_COV_2, "tax_id": "9606"}));
    validate(Some(sars_cov_2()), Some(human()), &mut entity);

    let consistency = format!(
        "Information is not consistent between taxId: 9606 and scientificName: {SARS_COV_2}"
    );
    assert!(entity.has_errors());
    assert_eq!(
        entity.get_errors(),
        &expected(&[
            ("scientific_name", &[consistency.as_str()]),
            ("tax_id", &[consistency.as_str()]),
        ])
    );
}

#[test]
fn invalid_tax_id_with_name_reports_both_errors() {
    let mut entity = sample(json!({"scientific_name": SARS_COV_2, "tax_id": "999999999999"}));
    let error = "Not valid tax_id: 999999999999.";
    validate(Some(sars_cov_2()), Some(invalid(error)), &mut entity);

    let consistency = format!(
        "Information is not consistent between taxId: 999999999999 and scientificName: {SARS_COV_2}"
    );
    assert_eq!(
        entity.get_errors(),
        &expected(&[
            ("scientific_name", &[consistency.as_str()]),
            ("tax_id", &[error, consistency.as_str()]),
        ])
    );
}

#[test]
fn invalid_tax_id_alone_reports_error() {
    let mut entity = sample(json!({"tax_id": "999999999999"}));
    let error = "Not valid tax_id: 999999999999.";
    validate(None, Some(invalid(error)), &mut entity);

    assert_eq!(entity.get_errors(), &expected(&[("tax_id", &[error])]));
}

#[test]
fn invalid_name_with_tax_id_reports_both_errors() {
    let mut entity = sample(json!({"scientific_name": "Lorem Ipsum", "tax_id": "2697049"}));
    let error = "Not valid scientific_name: Lorem Ipsum.";
    validate(Some(invalid(error)), Some(sars_cov_2()), &mut entity);

    let consistency =
        "Information is not consistent between taxId: 2697049 and scientificName: Lorem Ipsum";
    assert_eq!(
        entity.get_errors(),
        &expected(&[
            ("scientific_name", &[error, consistency]),
            ("tax_id", &[consistency]),
        ])
    );
}

#[test]
fn both_invalid_reports_individual_and_consistency_errors() {
    let mut entity = sample(json!({"scientific_name": "Lorem Ipsum", "tax_id": "0"}));
    let name_error = "Not valid scientific_name: Lorem Ipsum.";
    let id_error = "Not valid tax_id: 0.";
    validate(Some(invalid(name_error)), Some(invalid(id_error)), &mut entity);

    let consistency =
        "Information is not consistent between taxId: 0 and scientificName: Lorem Ipsum";
    assert_eq!(
        entity.get_errors(),
        &expected(&[
            ("scientific_name", &[name_error, consistency]),
            ("tax_id", &[id_error, consistency]),
        ])
    );
}

#[test]
fn invalid_name_alone_reports_error() {
    let mut entity = sample(json!({"scientific_name": "Lorem Ipsum"}));
    let error = "Not valid scientific_name: Lorem Ipsum.";
    validate(Some(invalid(error)), None, &mut entity);

    assert_eq!(
        entity.get_errors(),
        &expected(&[("scientific_name", &[error])])
    );
}

#[test]
fn numeric_tax_id_attribute_is_looked_up() {
    let mut entity = sample(json!({"scientific_name": "Homo sapiens", "tax_id": 9606}));
    validate(Some(human()), Some(human()), &mut entity);
    assert!(!entity.has_errors());
}

#[test]
fn submission_pass_continues_after_a_fault() {
    let mut submission = Submission::new();
    let attributes = |value: Value| -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => Attributes::new(),
        }
    };
    submission.map("sample", "named", attributes(json!({"scientific_name": "Homo sapiens"})));
    submission.map("sample", "by_id", attributes(json!({"tax_id": "1"})));

    // Name lookups fault; ID lookups still run for the following entity.
    let validator = TaxonomyValidator::new(StubLookup {
        by_name: None,
        by_id: Some(invalid("Not valid tax_id: 1.")),
    });
    let err = validator.validate_submission(&mut submission).unwrap_err();

    assert!(matches!(err, ValidatorError::Incomplete { failed: 1, .. }));
    assert!(!submission.get_entity("sample", "named").unwrap().has_errors());
    assert_eq!(
        submission.get_entity("sample", "by_id").unwrap().get_errors(),
        &expected(&[("tax_id", &["Not valid tax_id: 1."])])
    );
}
