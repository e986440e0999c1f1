//! Response dispatch and result persistence
//!
//! This module keeps HTTP response handling and file output out of the
//! submission logic: a 200 body is handed back (or written) verbatim, anything
//! else is decoded as the service's JSON error document.

use crate::error::{RemoveBgError, Result};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::path::Path;

/// Error document returned by the service on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub errors: Vec<ApiErrorEntry>,
}

/// One entry of an error document
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEntry {
    pub title: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Service turning service responses into image bytes, output files or errors
pub struct ResultWriter;

impl ResultWriter {
    /// Read a response to completion
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The image body of a 200 response
    /// * `Err(RemoveBgError)` - `Api` / `MalformedResponse` for any other status,
    ///   `Network` if the body cannot be read
    pub async fn read_response(response: Response) -> Result<Vec<u8>> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoveBgError::network_error("Failed to read response body", e))?;

        if status == StatusCode::OK {
            tracing::debug!(bytes = body.len(), "Received processed image");
            return Ok(body.to_vec());
        }

        Err(Self::decode_error(status, &body))
    }

    /// Map a non-200 response body to an error
    ///
    /// The first entry's `title` becomes the error message. A body that is not
    /// an error document, or one with no entries, is reported as malformed.
    #[must_use]
    pub fn decode_error(status: StatusCode, body: &[u8]) -> RemoveBgError {
        match serde_json::from_slice::<ApiErrorBody>(body) {
            Ok(document) => match document.errors.into_iter().next() {
                Some(entry) => {
                    tracing::warn!(
                        %status,
                        title = %entry.title,
                        code = entry.code.as_deref().unwrap_or(""),
                        "remove.bg rejected the request"
                    );
                    RemoveBgError::Api {
                        status,
                        title: entry.title,
                    }
                },
                None => RemoveBgError::malformed_response(status, "error document has no entries"),
            },
            Err(e) => RemoveBgError::malformed_response(status, e.to_string()),
        }
    }

    /// Write processed image bytes to `path`, replacing any existing file
    ///
    /// Missing parent directories are created first.
    ///
    /// # Errors
    /// - `Io` if the directory or file cannot be written
    pub async fn save<P: AsRef<Path>>(bytes: &[u8], path: P) -> Result<u64> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RemoveBgError::file_io_error("create output directory", parent, &e)
            })?;
        }

        tokio::fs::write(path_ref, bytes)
            .await
            .map_err(|e| RemoveBgError::file_io_error("write output file", path_ref, &e))?;

        tracing::info!(path = %path_ref.display(), bytes = bytes.len(), "Wrote processed image");
        Ok(bytes.len() as u64)
    }
}
