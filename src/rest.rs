//! Response handling shared by the REST clients

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use crate::error::{Error, ProblemDetails, Result};

/// Default request timeout
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the pooled HTTP client used by both API clients
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tebex-sdk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))
}

/// Parse and check an API base URL
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| Error::config(format!("Invalid base URL {base_url}: {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Base URL must be an http(s) URL: {base_url}"
        )));
    }
    Ok(url)
}

/// Append percent-encoded path segments to a base URL
pub(crate) fn endpoint(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Decode a 2xx JSON body, or map the failure
pub(crate) async fn json_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_response(response).await);
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Accept any 2xx, whatever the body
pub(crate) async fn empty_response(response: Response) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_response(response).await)
    }
}

async fn error_response(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_from_parts(status, body)
}

fn error_from_parts(status: StatusCode, body: String) -> Error {
    match serde_json::from_str::<ProblemDetails>(&body) {
        Ok(problem) => {
            warn!(
                status = status.as_u16(),
                title = %problem.title,
                "Tebex API returned an error"
            );
            Error::Upstream(problem)
        }
        Err(_) => {
            warn!(status = status.as_u16(), "Tebex API returned an unstructured error");
            Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            }
        }
    }
}
