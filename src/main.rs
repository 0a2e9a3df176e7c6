use sku_image_publisher::{Uploader, append_urls, load_config, upload_product};
use snafu::{Whatever, prelude::*};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[snafu::report]
fn main() -> Result<(), Whatever> {
    tracing_subscriber::fmt()
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(sku) = args.next() else {
        eprintln!("Usage: batch-upload <SKU> [product_folder]");
        eprintln!();
        eprintln!("Example: batch-upload A7K9RN42");
        eprintln!("Example: batch-upload A7K9RN42 Package4/PRODUCT_1");
        whatever!("missing SKU argument");
    };
    let sku = sku.to_uppercase();
    let folder_override = args.next();

    let config = load_config().whatever_context("failed to load config")?;
    info!("Starting with configuration: {config}");

    let uploader = Uploader::new(&config);
    let urls = upload_product(&config, &uploader, &sku, folder_override.as_deref())
        .whatever_context("upload failed")?;
    ensure_whatever!(!urls.is_empty(), "no images were uploaded for SKU: {sku}");

    append_urls(&sku, &urls, &config.output_file).whatever_context("failed to save URLs")?;

    info!("successfully uploaded {} image(s) for SKU: {sku}", urls.len());
    for (idx, url) in urls.iter().enumerate() {
        println!("{}. {url}", idx + 1);
    }

    Ok(())
}
