use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use reqwest::blocking::Client;

use crate::entity::Entity;
use crate::error::ValidatorError;
use crate::http::http_client;
use crate::submission::Submission;
use crate::validator::{EntityValidator, SubmissionValidator, validate_each};

pub const CHECKSUMS_FILE_NAME: &str = "checksums.csv";

/// File name to checksum, as reported by the upload area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    checksums: HashMap<String, String>,
}

impl ChecksumManifest {
    /// Parses `name,checksum` lines. Blank lines are skipped and a repeated
    /// name keeps its last checksum.
    pub fn parse(text: &str) -> Result<Self, ValidatorError> {
        let mut checksums = HashMap::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || ValidatorError::ManifestLine {
                line: index + 1,
                content: line.to_string(),
            };
            let (name, checksum) = line.split_once(',').ok_or_else(malformed)?;
            let (name, checksum) = (name.trim(), checksum.trim());
            if name.is_empty() || checksum.is_empty() {
                return Err(malformed());
            }
            checksums.insert(name.to_string(), checksum.to_string());
        }
        Ok(Self { checksums })
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.checksums.get(file_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.checksums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checksums.is_empty()
    }
}

/// Somewhere the checksum manifest can be read from.
pub trait ChecksumSource: Send + Sync {
    fn fetch(&self, path: &str) -> Result<String, ValidatorError>;
}

pub fn manifest_path(secure_key: &str) -> String {
    format!("{}/{CHECKSUMS_FILE_NAME}", secure_key.trim_matches('/'))
}

#[derive(Clone)]
pub struct HttpChecksumSource {
    client: Client,
    base_url: String,
}

impl HttpChecksumSource {
    pub fn new(base_url: &str) -> Result<Self, ValidatorError> {
        let client = http_client(Duration::from_secs(60), ValidatorError::ChecksumHttp)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ChecksumSource for HttpChecksumSource {
    fn fetch(&self, path: &str) -> Result<String, ValidatorError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ValidatorError::ChecksumHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "checksum manifest request failed".to_string());
            return Err(ValidatorError::ChecksumStatus { status, message });
        }
        response
            .text()
            .map_err(|err| ValidatorError::ChecksumHttp(err.to_string()))
    }
}

/// Reads manifests from a local mirror of the upload area.
#[derive(Debug, Clone)]
pub struct DirectoryChecksumSource {
    root: Utf8PathBuf,
}

impl DirectoryChecksumSource {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ChecksumSource for DirectoryChecksumSource {
    fn fetch(&self, path: &str) -> Result<String, ValidatorError> {
        let full_path = self.root.join(path.trim_start_matches('/'));
        fs::read_to_string(&full_path)
            .map_err(|err| ValidatorError::Filesystem(format!("read {full_path}: {err}")))
    }
}

/// Reconciles `uploaded_file_{n}` attributes against the checksum manifest,
/// filling in `uploaded_file_{n}_checksum` where the entity does not declare one.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    manifest: ChecksumManifest,
}

impl UploadValidator {
    pub fn new<S>(secure_key: &str, source: &S) -> Result<Self, ValidatorError>
    where
        S: ChecksumSource + ?Sized,
    {
        let path = manifest_path(secure_key);
        tracing::debug!(%path, "loading checksum manifest");
        let text = source.fetch(&path)?;
        let manifest = ChecksumManifest::parse(&text)?;
        if manifest.is_empty() {
            tracing::warn!(%path, "checksum manifest lists no files");
        } else {
            tracing::info!(files = manifest.len(), "checksum manifest loaded");
        }
        Ok(Self::from_manifest(manifest))
    }

    pub fn from_manifest(manifest: ChecksumManifest) -> Self {
        Self { manifest }
    }

    pub fn manifest(&self) -> &ChecksumManifest {
        &self.manifest
    }

    fn check_file(&self, entity: &mut Entity, file_field: &str, file_name: &str) {
        let Some(expected) = self.manifest.get(file_name) else {
            entity.add_error(
                file_field,
                format!("File has not been uploaded to drag-and-drop: {file_name}"),
            );
            return;
        };

        let checksum_field = format!("{file_field}_checksum");
        match entity.text_attribute(&checksum_field) {
            None => entity.set_attribute(checksum_field, expected),
            Some(declared) if declared != expected => entity.add_error(
                checksum_field,
                format!("The checksum found on drag-and-drop {expected} does not match: {declared}"),
            ),
            Some(_) => {}
        }
    }
}

impl EntityValidator for UploadValidator {
    fn validate_entity(&self, entity: &mut Entity) -> Result<(), ValidatorError> {
        for index in 1.. {
            let file_field = format!("uploaded_file_{index}");
            let Some(file_name) = entity.text_attribute(&file_field) else {
                break;
            };
            self.check_file(entity, &file_field, &file_name);
        }
        Ok(())
    }
}

impl SubmissionValidator for UploadValidator {
    fn name(&self) -> &'static str {
        "upload"
    }

    fn validate_submission(&self, submission: &mut Submission) -> Result<(), ValidatorError> {
        validate_each(self, submission)
    }
}
