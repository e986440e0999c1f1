//! Upload a local image and composite it onto a background color or image
//!
//! ```text
//! REMOVE_BG_KEY=... cargo run --example remove_from_file -- portrait.jpg out.png 81d4fa
//! REMOVE_BG_KEY=... cargo run --example remove_from_file -- portrait.jpg out.png beach.jpg
//! ```
//!
//! A third argument naming an existing file is used as background image,
//! anything else is sent as a color.

use anyhow::Context;
use removebg::{ForegroundType, ImageSize, RemovalOptions, RemoveBgClient};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .context("usage: remove_from_file <image> [output] [background]")?;
    let output = args.next().unwrap_or_else(|| "no-bg.png".to_string());

    let mut builder = RemovalOptions::builder()
        .size(ImageSize::Auto)
        .foreground_type(ForegroundType::Auto)
        .output_file_name(output);
    if let Some(background) = args.next() {
        builder = if Path::new(&background).is_file() {
            builder.background_file(background)
        } else {
            builder.background_color(background)
        };
    }
    let options = builder.build()?;

    let api_key = std::env::var("REMOVE_BG_KEY").context("REMOVE_BG_KEY is not set")?;
    let client = RemoveBgClient::builder(api_key)
        .timeout(Duration::from_secs(120))
        .build()?;

    match client.remove_from_file(&input, &options).await {
        Ok(outcome) => {
            tracing::info!(
                path = %outcome.output_path.display(),
                bytes = outcome.bytes_written,
                "Background removed"
            );
            Ok(())
        },
        Err(e) => {
            if let Some(title) = e.api_title() {
                tracing::error!(%title, "remove.bg rejected {}", input);
            }
            Err(e.into())
        },
    }
}
