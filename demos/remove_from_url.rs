//! Remove the background of a remote image
//!
//! ```text
//! REMOVE_BG_KEY=... cargo run --example remove_from_url -- https://example.com/photo.jpg out.png
//! ```
//!
//! Set `RUST_LOG=removebg=debug` to see the request being assembled.

use anyhow::Context;
use removebg::{RemovalOptions, RemoveBgClient};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().context("usage: remove_from_url <image-url> [output]")?;
    let output = args.next().unwrap_or_else(|| "no-bg.png".to_string());

    let api_key = std::env::var("REMOVE_BG_KEY").context("REMOVE_BG_KEY is not set")?;
    let client = RemoveBgClient::new(api_key)?;

    let options = RemovalOptions::builder().output_file_name(output).build()?;
    let outcome = client.remove_from_url(url, &options).await?;

    tracing::info!(
        path = %outcome.output_path.display(),
        bytes = outcome.bytes_written,
        detected_type = outcome.detected_type.as_deref().unwrap_or("unknown"),
        "Background removed"
    );
    Ok(())
}
