use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu, ensure};
use tracing::debug;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Turns a product folder value into the directory to enumerate.
///
/// A value containing a path separator is taken verbatim (e.g.
/// `EBAY_DATA_1/PRODUCT_2`); a bare folder name is resolved under `base_dir`.
#[must_use]
pub fn resolve_product_path(folder: &str, base_dir: &Path) -> PathBuf {
    if folder.contains(std::path::is_separator) {
        PathBuf::from(folder)
    } else {
        base_dir.join(folder)
    }
}

/// Lists the image files directly inside the product folder, sorted ascending
/// by file name for a stable upload order.
///
/// An existing folder without any qualifying file yields an empty list, not
/// an error. Subdirectories are never descended into.
pub fn list_images(folder: &str, base_dir: &Path) -> Result<Vec<PathBuf>, ImageError> {
    let product_path = resolve_product_path(folder, base_dir);
    ensure!(
        product_path.is_dir(),
        FolderNotFoundSnafu { path: product_path }
    );

    let mut images = Vec::new();
    for entry in WalkDir::new(&product_path).min_depth(1).max_depth(1) {
        let entry = entry.context(WalkSnafu {
            path: product_path.clone(),
        })?;
        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            images.push(entry.into_path());
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(
        "found {} image(s) in {}",
        images.len(),
        product_path.display()
    );
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[derive(Debug, Snafu)]
pub enum ImageError {
    #[snafu(display("Product folder not found: {}", path.display()))]
    FolderNotFound { path: PathBuf },
    #[snafu(display("could not list {}: {source}", path.display()))]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}
