use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::ValidatorError;

/// Blocking client with the crate's user agent, for the remote collaborators.
///
/// `map_err` picks the error variant of the collaborator building the client.
pub(crate) fn http_client(
    timeout: Duration,
    map_err: fn(String) -> ValidatorError,
) -> Result<Client, ValidatorError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&format!("submission-validator/{}", env!("CARGO_PKG_VERSION")))
            .map_err(|err| map_err(err.to_string()))?,
    );
    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|err| map_err(err.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn builds_client_with_timeout() {
        let client = http_client(Duration::from_secs(5), ValidatorError::SchemaHttp);
        assert_matches!(client, Ok(_));
    }
}
