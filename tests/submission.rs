use std::collections::BTreeMap;
use std::path::Path;

use assert_matches::assert_matches;

use submission_validator::entity::ErrorMap;
use submission_validator::error::ValidatorError;
use submission_validator::loader::load_submission;
use submission_validator::submission::{Submission, SubmissionErrors, TypeErrors};

fn fixture_submission() -> Submission {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/submission.json");
    load_submission(&path).unwrap()
}

fn errors(entries: &[(&str, &[&str])]) -> ErrorMap {
    entries
        .iter()
        .map(|(field, messages)| {
            (
                field.to_string(),
                messages.iter().map(|message| message.to_string()).collect(),
            )
        })
        .collect()
}

#[test]
fn submission_with_no_errors() {
    let submission = fixture_submission();
    let study = submission.get_entity("study", "PRJEB39632").unwrap();

    assert!(!study.has_errors());
    assert!(submission.get_errors("study").is_empty());
    assert!(!submission.has_errors());
    assert!(submission.get_all_errors().is_empty());
}

#[test]
fn submission_entity_with_error() {
    let mut submission = fixture_submission();
    let message = "should have required property 'release_date'";
    submission
        .get_entity_mut("study", "PRJEB39632")
        .unwrap()
        .add_error("release_date", message);

    let study_errors = errors(&[("release_date", &[message])]);
    let type_errors: TypeErrors = BTreeMap::from([("PRJEB39632".to_string(), study_errors.clone())]);
    let expected: SubmissionErrors = BTreeMap::from([("study".to_string(), type_errors.clone())]);

    let study = submission.get_entity("study", "PRJEB39632").unwrap();
    assert!(study.has_errors());
    assert!(submission.has_errors());
    assert_eq!(study.get_errors(), &study_errors);
    assert_eq!(submission.get_errors("study"), type_errors);
    assert_eq!(submission.get_all_errors(), expected);
}

#[test]
fn submission_entities_with_errors() {
    let mut submission = fixture_submission();
    submission
        .get_entity_mut("study", "PRJEB39632")
        .unwrap()
        .add_error("email_address", "should have required property 'email_address'");
    let assembly = submission
        .get_entity_mut("isolate_genome_assembly_information", "P17157_1007")
        .unwrap();
    assembly.add_error(
        "assembly_type",
        "should be equal to one of the allowed values: ['covid-19 outbreak']",
    );
    assembly.add_error("coverage", "should have required property 'coverage'");

    let all = submission.get_all_errors();
    assert!(submission.has_errors());
    assert_eq!(all.len(), 2);
    assert_eq!(
        all["study"]["PRJEB39632"],
        errors(&[(
            "email_address",
            &["should have required property 'email_address'"]
        )])
    );
    assert_eq!(
        all["isolate_genome_assembly_information"]["P17157_1007"],
        errors(&[
            (
                "assembly_type",
                &["should be equal to one of the allowed values: ['covid-19 outbreak']"]
            ),
            ("coverage", &["should have required property 'coverage'"]),
        ])
    );
    assert!(!all.contains_key("sample"));
}

#[test]
fn errors_restricted_to_requested_type() {
    let mut submission = fixture_submission();
    submission
        .get_entity_mut("sample", "ERS4858671")
        .unwrap()
        .add_error("tax_id", "Not valid tax_id: 1.");

    assert!(submission.get_errors("study").is_empty());
    assert!(submission.get_errors("unknown").is_empty());
    assert_eq!(submission.get_errors("sample").len(), 1);
}

#[test]
fn unknown_entity_is_not_found() {
    let submission = fixture_submission();
    let err = submission.get_entity("study", "PRJEB00000").unwrap_err();
    assert_matches!(
        err,
        ValidatorError::EntityNotFound { entity_type, identifier }
            if entity_type == "study" && identifier == "PRJEB00000"
    );
}
