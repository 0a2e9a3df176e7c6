use std::path::Path;

use sku_image_publisher::{Uploader, load_config};
use snafu::{Whatever, prelude::*};
use tracing_subscriber::EnvFilter;

#[snafu::report]
fn main() -> Result<(), Whatever> {
    tracing_subscriber::fmt()
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config().whatever_context("failed to load config")?;
    ensure_whatever!(
        !config.has_placeholder_remote(),
        "set github_owner and github_repo in config.toml (or SIP_* environment variables) first"
    );

    let mut args = std::env::args().skip(1);
    let Some(image) = args.next() else {
        eprintln!("Usage: upload-image <image_path> [custom_name]");
        eprintln!();
        eprintln!("Example: upload-image photo.jpg");
        eprintln!("Example: upload-image photo.jpg product-123");
        whatever!("missing image argument");
    };
    let custom_name = args.next();

    let uploader = Uploader::new(&config);
    let url = uploader
        .upload(Path::new(&image), custom_name.as_deref())
        .whatever_context("upload failed")?;

    println!("{url}");
    Ok(())
}
