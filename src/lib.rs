#![warn(clippy::nursery, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, reason = "Too much nagging")]

mod batch;
mod config;
mod images;
mod lookup;
mod records;
mod tracker;
mod uploader;

pub use batch::{BatchError, upload_product};
pub use config::{Config, ConfigError, load_config};
pub use images::{ImageError, list_images, resolve_product_path};
pub use lookup::{LookupError, resolve_folder};
pub use records::{ParseRecordError, format_record, split_record};
pub use tracker::{TrackerError, append_urls};
pub use uploader::{GitCli, UploadError, Uploader, VcsError, VersionControl};
