use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidatorError;
use crate::http::http_client;

pub const DEFAULT_TAXONOMY_URL: &str = "https://www.ebi.ac.uk/ena/taxonomy/rest";
pub const TAX_ID_FIELD: &str = "tax_id";
pub const SCIENTIFIC_NAME_FIELD: &str = "scientific_name";

const NO_RESULTS: &str = "No results.";
const NOT_SUBMITTABLE: &str = "It is not submittable.";

/// A taxon as described by the taxonomy authority.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyRecord {
    #[serde(deserialize_with = "text")]
    pub tax_id: String,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default = "submittable_by_default", deserialize_with = "flag")]
    pub submittable: bool,
    #[serde(default, deserialize_with = "optional_text")]
    pub common_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub rank: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub division: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub lineage: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub genetic_code: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub mitochondrial_genetic_code: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub plast_id_genetic_code: Option<String>,
}

/// Result of a single taxonomy lookup: either a usable taxon or the
/// user-facing reason it cannot be used.
#[derive(Debug, Clone, PartialEq)]
pub enum TaxonomyOutcome {
    Valid(TaxonomyRecord),
    Invalid(String),
}

impl TaxonomyOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, TaxonomyOutcome::Valid(_))
    }

    pub fn record(&self) -> Option<&TaxonomyRecord> {
        match self {
            TaxonomyOutcome::Valid(record) => Some(record),
            TaxonomyOutcome::Invalid(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TaxonomyOutcome::Valid(_) => None,
            TaxonomyOutcome::Invalid(message) => Some(message),
        }
    }

    pub fn tax_id(&self) -> Option<&str> {
        self.record().map(|record| record.tax_id.as_str())
    }
}

/// Raw answer from the taxonomy authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityResponse {
    pub status: u16,
    pub body: String,
}

pub trait TaxonomyClient: Send + Sync {
    fn fetch_by_tax_id(&self, tax_id: &str) -> Result<AuthorityResponse, ValidatorError>;
    fn fetch_by_scientific_name(&self, name: &str) -> Result<AuthorityResponse, ValidatorError>;
}

/// Name and ID lookups against the taxonomy authority.
pub trait TaxonomyLookup: Send + Sync {
    fn validate_tax_id(&self, tax_id: &str) -> Result<TaxonomyOutcome, ValidatorError>;
    fn validate_scientific_name(&self, name: &str) -> Result<TaxonomyOutcome, ValidatorError>;

    /// Resolves both values and checks they name the same taxon. The
    /// inconsistency message carries the taxon resolved from the ID and the
    /// name exactly as given.
    fn validate_taxonomy(
        &self,
        scientific_name: &str,
        tax_id: &str,
    ) -> Result<TaxonomyOutcome, ValidatorError> {
        let by_name = self.validate_scientific_name(scientific_name)?;
        let by_id = self.validate_tax_id(tax_id)?;
        let (name_record, id_record) = match (by_name, by_id) {
            (TaxonomyOutcome::Invalid(message), _) | (_, TaxonomyOutcome::Invalid(message)) => {
                return Ok(TaxonomyOutcome::Invalid(message));
            }
            (TaxonomyOutcome::Valid(name_record), TaxonomyOutcome::Valid(id_record)) => {
                (name_record, id_record)
            }
        };
        if name_record.tax_id != id_record.tax_id {
            return Ok(TaxonomyOutcome::Invalid(inconsistency_message(
                &id_record.tax_id,
                scientific_name,
            )));
        }
        Ok(TaxonomyOutcome::Valid(id_record))
    }
}

pub struct TaxonomyResolver<C: TaxonomyClient> {
    client: C,
}

impl<C: TaxonomyClient> TaxonomyResolver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: TaxonomyClient> TaxonomyLookup for TaxonomyResolver<C> {
    fn validate_tax_id(&self, tax_id: &str) -> Result<TaxonomyOutcome, ValidatorError> {
        tracing::debug!(tax_id, "resolving taxon by id");
        let response = self.client.fetch_by_tax_id(tax_id)?;
        normalize_response(TAX_ID_FIELD, tax_id, response)
    }

    fn validate_scientific_name(&self, name: &str) -> Result<TaxonomyOutcome, ValidatorError> {
        tracing::debug!(name, "resolving taxon by scientific name");
        let response = self.client.fetch_by_scientific_name(name)?;
        normalize_response(SCIENTIFIC_NAME_FIELD, name, response)
    }
}

/// Maps an authority response onto a [`TaxonomyOutcome`].
///
/// Client errors become invalid outcomes carrying the authority's text,
/// an empty or "No results." success is an invalid outcome without detail,
/// and only the first candidate of a list response is considered. Server
/// errors and undecodable bodies are faults.
pub fn normalize_response(
    field: &str,
    input: &str,
    response: AuthorityResponse,
) -> Result<TaxonomyOutcome, ValidatorError> {
    let status = response.status;
    if (400..500).contains(&status) {
        return Ok(TaxonomyOutcome::Invalid(invalid_message(
            field,
            input,
            response.body.trim(),
        )));
    }
    if !(200..300).contains(&status) {
        return Err(ValidatorError::TaxonomyStatus {
            status,
            message: response.body,
        });
    }

    let body = response.body.trim();
    if body.is_empty() || body == NO_RESULTS {
        return Ok(TaxonomyOutcome::Invalid(invalid_message(field, input, "")));
    }
    let value: Value = serde_json::from_str(body)
        .map_err(|err| ValidatorError::TaxonomyResponse(err.to_string()))?;
    let candidate = match value {
        Value::Array(candidates) => match candidates.into_iter().next() {
            Some(first) => first,
            None => return Ok(TaxonomyOutcome::Invalid(invalid_message(field, input, ""))),
        },
        other => other,
    };
    let record: TaxonomyRecord = serde_json::from_value(candidate)
        .map_err(|err| ValidatorError::TaxonomyResponse(err.to_string()))?;
    if !record.submittable {
        return Ok(TaxonomyOutcome::Invalid(invalid_message(
            field,
            input,
            NOT_SUBMITTABLE,
        )));
    }
    Ok(TaxonomyOutcome::Valid(record))
}

pub fn invalid_message(field: &str, value: &str, detail: &str) -> String {
    if detail.is_empty() {
        format!("Not valid {field}: {value}.")
    } else {
        format!("Not valid {field}: {value}. {detail}")
    }
}

pub fn inconsistency_message(tax_id: &str, scientific_name: &str) -> String {
    format!("Information is not consistent between taxId: {tax_id} and scientificName: {scientific_name}")
}

#[derive(Clone)]
pub struct EnaTaxonomyHttpClient {
    client: Client,
    base_url: String,
}

impl EnaTaxonomyHttpClient {
    pub fn new(base_url: &str) -> Result<Self, ValidatorError> {
        let client = http_client(Duration::from_secs(30), ValidatorError::TaxonomyHttp)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, lookup: &str, value: &str) -> Result<Url, ValidatorError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ValidatorError::TaxonomyHttp(format!("{}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| {
                ValidatorError::TaxonomyHttp(format!("not a base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .push(lookup)
            .push(value);
        Ok(url)
    }

    fn get(&self, url: Url) -> Result<AuthorityResponse, ValidatorError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ValidatorError::TaxonomyHttp(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| ValidatorError::TaxonomyHttp(err.to_string()))?;
        Ok(AuthorityResponse { status, body })
    }
}

impl TaxonomyClient for EnaTaxonomyHttpClient {
    fn fetch_by_tax_id(&self, tax_id: &str) -> Result<AuthorityResponse, ValidatorError> {
        let url = self.endpoint("tax-id", tax_id)?;
        self.get(url)
    }

    fn fetch_by_scientific_name(&self, name: &str) -> Result<AuthorityResponse, ValidatorError> {
        let url = self.endpoint("scientific-name", name)?;
        self.get(url)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Flag(value) => value.to_string(),
            Scalar::Number(value) => value.to_string(),
            Scalar::Text(value) => value,
        }
    }
}

fn submittable_by_default() -> bool {
    true
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Scalar::deserialize(deserializer)?.into_text())
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}

// The authority sends "true"/"false" strings; plain booleans are accepted too.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => true,
        Some(Scalar::Flag(value)) => value,
        Some(Scalar::Text(value)) => !value.trim().eq_ignore_ascii_case("false"),
        Some(Scalar::Number(value)) => value.as_u64() != Some(0),
    })
}
