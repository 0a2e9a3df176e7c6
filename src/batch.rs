use snafu::{ResultExt, Snafu};
use tracing::{error, info, warn};
use url::Url;

use crate::{Config, ImageError, LookupError, Uploader, VersionControl};
use crate::{list_images, resolve_folder};

/// Uploads every image of one product and returns the collected URLs in
/// enumeration order.
///
/// Images are processed strictly one after another; an image whose upload
/// fails is logged and skipped, it never aborts the rest of the batch. An
/// empty product folder is reported and yields an empty list.
pub fn upload_product<V: VersionControl>(
    config: &Config,
    uploader: &Uploader<V>,
    sku: &str,
    folder_override: Option<&str>,
) -> Result<Vec<Url>, BatchError> {
    let folder = match folder_override {
        Some(folder) => folder.to_owned(),
        None => resolve_folder(sku, &config.lookup_file).context(LookupSnafu)?,
    };
    info!("processing {folder} (SKU: {sku})");

    let images = list_images(&folder, &config.image_base_dir).context(ImagesSnafu)?;
    if images.is_empty() {
        warn!("no images found for {folder}");
        return Ok(Vec::new());
    }
    info!("found {} image(s)", images.len());

    let mut urls = Vec::new();
    for (idx, image) in images.iter().enumerate() {
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("[{}/{}] uploading {name}...", idx + 1, images.len());

        // Filenames already follow the <SKU>_<n> convention, so the stem is
        // reused as the destination name.
        let stem = image.file_stem().map(|s| s.to_string_lossy().into_owned());
        match uploader.upload(image, stem.as_deref()) {
            Ok(url) => {
                info!("uploaded: {url}");
                urls.push(url);
            }
            Err(e) => error!("failed to upload {name}: {e}"),
        }
    }

    Ok(urls)
}

#[derive(Debug, Snafu)]
pub enum BatchError {
    #[snafu(display("{source}"))]
    Lookup { source: LookupError },
    #[snafu(display("{source}"))]
    Images { source: ImageError },
}
