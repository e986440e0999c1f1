#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

//! # remove.bg client
//!
//! A small async client for the [remove.bg](https://www.remove.bg) background removal
//! API. It validates processing options, assembles the multipart request, sends it
//! with your API key and writes the processed image to disk.
//!
//! ## Features
//!
//! - **Three input modes**: local file upload, remote URL, or inline base64 payload
//! - **Validated options**: every enumerated option is checked before anything is
//!   sent; empty values fall back to the service defaults
//! - **Backgrounds**: composite onto a local image, a remote image, or a color
//! - **Injectable endpoint**: point the client at a staging server or a test double
//! - **Structured logging**: `tracing` events and spans, no subscriber installed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use removebg::{ForegroundType, ImageSize, RemovalOptions, RemoveBgClient};
//!
//! # async fn example() -> removebg::Result<()> {
//! let client = RemoveBgClient::new(std::env::var("REMOVE_BG_KEY").unwrap_or_default())?;
//!
//! let options = RemovalOptions::builder()
//!     .size(ImageSize::Hd)
//!     .foreground_type(ForegroundType::Person)
//!     .background_color("81d4fa")
//!     .output_file_name("portrait-no-bg.png")
//!     .build()?;
//!
//! let outcome = client.remove_from_file("portrait.jpg", &options).await?;
//! println!("wrote {} bytes to {}", outcome.bytes_written, outcome.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## In-memory processing
//!
//! ```rust,no_run
//! use removebg::{ImageSource, RemovalOptions, RemoveBgClient};
//!
//! # async fn example(upload_bytes: Vec<u8>) -> removebg::Result<()> {
//! let client = RemoveBgClient::new("my-api-key")?;
//! let processed = client
//!     .process(&ImageSource::from_bytes(&upload_bytes), &RemovalOptions::default())
//!     .await?;
//! assert!(!processed.bytes.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod services;
pub mod source;

// Public API exports
pub use client::{
    ProcessedImage, RemovalOutcome, RemoveBgClient, RemoveBgClientBuilder, DEFAULT_ENDPOINT,
};
pub use config::{
    Background, BackgroundKind, Channels, ForegroundType, ImageSize, NormalizedOptions,
    OutputFormat, RemovalOptions, RemovalOptionsBuilder, TypeLevel,
};
pub use error::{RemoveBgError, Result};
pub use form::{FieldValue, RequestForm};
pub use services::ResultWriter;
pub use source::ImageSource;
