//! remove.bg API client
//!
//! [`RemoveBgClient`] submits one image per call. The three input modes share a
//! single path: validate the options, assemble the [`RequestForm`], POST it with
//! the API key, and hand the response to the [`ResultWriter`].

use crate::{
    config::{NormalizedOptions, RemovalOptions},
    error::{RemoveBgError, Result},
    form::RequestForm,
    services::ResultWriter,
    source::ImageSource,
};
use reqwest::{header::HeaderValue, Client, Url};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::instrument;

/// Production endpoint of the removal API
pub const DEFAULT_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Response header naming the detected foreground type
pub const DETECTED_TYPE_HEADER: &str = "X-Type";

/// Processed image kept in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// Response body, byte for byte
    pub bytes: Vec<u8>,
    /// Foreground type reported by the service, if any
    pub detected_type: Option<String>,
}

/// Result of a submission that was written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub output_path: PathBuf,
    pub bytes_written: u64,
    pub detected_type: Option<String>,
}

/// Client for the remove.bg background removal API
#[derive(Clone)]
pub struct RemoveBgClient {
    http: Client,
    api_key: HeaderValue,
    endpoint: Url,
}

impl fmt::Debug for RemoveBgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveBgClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl RemoveBgClient {
    /// Create a client for the production endpoint
    ///
    /// # Errors
    /// - `InvalidConfig` if the API key is empty or not a valid header value
    /// - `Network` if the HTTP client cannot be created
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a builder to override the endpoint, timeout or HTTP client
    ///
    /// # Examples
    ///
    /// ```rust
    /// use removebg::RemoveBgClient;
    /// use std::time::Duration;
    ///
    /// let client = RemoveBgClient::builder("my-api-key")
    ///     .endpoint("http://127.0.0.1:8080/v1.0/removebg")
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(client.endpoint(), "http://127.0.0.1:8080/v1.0/removebg");
    /// ```
    pub fn builder<S: Into<String>>(api_key: S) -> RemoveBgClientBuilder {
        RemoveBgClientBuilder::new(api_key)
    }

    /// Endpoint requests are sent to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Submit an image and write the processed result to `options.output_file_name`
    ///
    /// The output file is only touched when the service answers 200.
    ///
    /// # Errors
    /// - `InvalidOption` before any I/O if an option is out of range
    /// - `Io` if an input file cannot be read or the output cannot be written
    /// - `Network` on transport failures
    /// - `Api` / `MalformedResponse` if the service rejects the request
    #[instrument(skip_all, fields(source = source.kind()))]
    pub async fn submit(
        &self,
        source: &ImageSource,
        options: &RemovalOptions,
    ) -> Result<RemovalOutcome> {
        let normalized = options.validate()?;
        let processed = self.send(&normalized, source).await?;
        let bytes_written = ResultWriter::save(&processed.bytes, &normalized.output_path).await?;

        Ok(RemovalOutcome {
            output_path: normalized.output_path,
            bytes_written,
            detected_type: processed.detected_type,
        })
    }

    /// Submit an image and keep the processed result in memory
    ///
    /// `options.output_file_name` is ignored.
    ///
    /// # Errors
    /// Same as [`RemoveBgClient::submit`], minus output write failures.
    #[instrument(skip_all, fields(source = source.kind()))]
    pub async fn process(
        &self,
        source: &ImageSource,
        options: &RemovalOptions,
    ) -> Result<ProcessedImage> {
        let normalized = options.validate()?;
        self.send(&normalized, source).await
    }

    /// Upload a local image file
    pub async fn remove_from_file<P: Into<PathBuf>>(
        &self,
        path: P,
        options: &RemovalOptions,
    ) -> Result<RemovalOutcome> {
        self.submit(&ImageSource::file(path), options).await
    }

    /// Let the service fetch the image from a URL
    pub async fn remove_from_url<S: Into<String>>(
        &self,
        url: S,
        options: &RemovalOptions,
    ) -> Result<RemovalOutcome> {
        self.submit(&ImageSource::url(url), options).await
    }

    /// Send a base64-encoded image
    pub async fn remove_from_base64<S: Into<String>>(
        &self,
        payload: S,
        options: &RemovalOptions,
    ) -> Result<RemovalOutcome> {
        self.submit(&ImageSource::base64(payload), options).await
    }

    async fn send(
        &self,
        options: &NormalizedOptions,
        source: &ImageSource,
    ) -> Result<ProcessedImage> {
        let form = RequestForm::build(options, source).await?;

        tracing::debug!(endpoint = %self.endpoint, "Sending removal request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.clone())
            .multipart(form.into_multipart())
            .send()
            .await
            .map_err(|e| RemoveBgError::network_error("Failed to send request to remove.bg", e))?;

        let detected_type = response
            .headers()
            .get(DETECTED_TYPE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = ResultWriter::read_response(response).await?;

        Ok(ProcessedImage {
            bytes,
            detected_type,
        })
    }
}

/// Builder for `RemoveBgClient`
pub struct RemoveBgClientBuilder {
    api_key: String,
    endpoint: String,
    timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl fmt::Debug for RemoveBgClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveBgClientBuilder")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl RemoveBgClientBuilder {
    fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            http_client: None,
        }
    }

    /// Send requests somewhere other than the production endpoint
    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Total request timeout; without one the request may wait indefinitely
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a preconfigured HTTP client (proxies, TLS, deadlines)
    ///
    /// A timeout set on this builder is ignored in favour of the client's own.
    #[must_use]
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// - `InvalidConfig` for an empty API key, a key that cannot be sent as a
    ///   header value, or an endpoint that is not an absolute http(s) URL
    /// - `Network` if the HTTP client cannot be created
    pub fn build(self) -> Result<RemoveBgClient> {
        if self.api_key.trim().is_empty() {
            return Err(RemoveBgError::invalid_config("API key must not be empty"));
        }
        let mut api_key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            RemoveBgError::invalid_config(
                "API key contains characters not allowed in an HTTP header (check for a trailing newline)",
            )
        })?;
        api_key.set_sensitive(true);

        let endpoint = Url::parse(&self.endpoint).map_err(|e| {
            RemoveBgError::invalid_config(format!("Invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RemoveBgError::invalid_config(format!(
                "Unsupported endpoint scheme '{}' (expected http or https)",
                endpoint.scheme()
            )));
        }

        let http = match self.http_client {
            Some(client) => {
                if self.timeout.is_some() {
                    tracing::debug!("Ignoring builder timeout for injected HTTP client");
                }
                client
            },
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| RemoveBgError::network_error("Failed to create HTTP client", e))?
            },
        };

        Ok(RemoveBgClient {
            http,
            api_key,
            endpoint,
        })
    }
}
