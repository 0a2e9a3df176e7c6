use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::{debug, warn};

use crate::records::split_record;

/// Resolves the product folder recorded for `sku` in the CSV lookup file.
///
/// The file is scanned in order and the first exact match wins; the caller is
/// expected to have normalized the SKU's case already. Rows that do not parse
/// or are missing a column are skipped with a warning.
pub fn resolve_folder(sku: &str, lookup_file: &Path) -> Result<String, LookupError> {
    ensure!(
        lookup_file.exists(),
        MissingLookupFileSnafu { path: lookup_file }
    );

    let content = std::fs::read_to_string(lookup_file).context(ReadSnafu { path: lookup_file })?;
    let mut lines = lines_of(&content);

    let header = lines.next().context(EmptyLookupFileSnafu { path: lookup_file })?;
    let columns = Columns::from_header(header, lookup_file)?;

    for line in lines {
        let fields = match split_record(line) {
            Ok(fields) => fields,
            Err(e) => {
                warn!("skipping malformed row in {}: {e}", lookup_file.display());
                continue;
            }
        };
        let Some((row_sku, folder)) = columns.extract(&fields) else {
            warn!("skipping short row in {}: {line}", lookup_file.display());
            continue;
        };
        if row_sku == sku {
            debug!("resolved SKU {sku} to folder {folder}");
            return Ok(folder.to_owned());
        }
    }

    SkuNotFoundSnafu {
        sku,
        path: lookup_file,
    }
    .fail()
}

fn lines_of(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter(|line| !line.is_empty())
}

/// Column positions taken from the header row, so column order in the file
/// does not matter.
struct Columns {
    sku: usize,
    product_folder: usize,
}

impl Columns {
    fn from_header(header: &str, path: &Path) -> Result<Self, LookupError> {
        let fields = split_record(header).ok().unwrap_or_default();
        let position = |name: &str| fields.iter().position(|f| f == name);
        match (position("sku"), position("product_folder")) {
            (Some(sku), Some(product_folder)) => Ok(Self {
                sku,
                product_folder,
            }),
            _ => InvalidHeaderSnafu {
                path,
                header: header.to_owned(),
            }
            .fail(),
        }
    }

    fn extract<'a>(&self, fields: &'a [String]) -> Option<(&'a str, &'a str)> {
        Some((
            fields.get(self.sku)?.as_str(),
            fields.get(self.product_folder)?.as_str(),
        ))
    }
}

#[derive(Debug, Snafu)]
pub enum LookupError {
    #[snafu(display("SKU tracking file not found: {}", path.display()))]
    MissingLookupFile { path: PathBuf },
    #[snafu(display("SKU tracking file is empty: {}", path.display()))]
    EmptyLookupFile { path: PathBuf },
    #[snafu(display("could not read {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{} has no sku/product_folder header, got: {header}", path.display()))]
    InvalidHeader { path: PathBuf, header: String },
    #[snafu(display("SKU '{sku}' not found in {}", path.display()))]
    SkuNotFound { sku: String, path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn lookup_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn resolves_recorded_folder() {
        let file = lookup_file("sku,product_folder\nSKU123,Package4/PRODUCT_7\n");
        assert_eq!(
            resolve_folder("SKU123", file.path()).unwrap(),
            "Package4/PRODUCT_7"
        );
    }

    #[test]
    fn first_matching_row_wins() {
        let file = lookup_file(
            "sku,product_folder\nSKU1,first/FOLDER\nSKU1,second/FOLDER\n",
        );
        assert_eq!(resolve_folder("SKU1", file.path()).unwrap(), "first/FOLDER");
    }

    #[test]
    fn header_order_does_not_matter() {
        let file = lookup_file("product_folder,sku\nPackage4/PRODUCT_1,SKU9\n");
        assert_eq!(
            resolve_folder("SKU9", file.path()).unwrap(),
            "Package4/PRODUCT_1"
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let err = resolve_folder("SKU1", Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, LookupError::MissingLookupFile { .. }));
    }

    #[test]
    fn unknown_sku_is_reported_after_full_scan() {
        let file = lookup_file("sku,product_folder\nSKU1,Package4/PRODUCT_1\n");
        let err = resolve_folder("SKU2", file.path()).unwrap_err();
        assert!(matches!(err, LookupError::SkuNotFound { .. }));
    }

    #[test]
    fn short_rows_are_skipped() {
        let file = lookup_file("sku,product_folder\nbroken\nSKU1,Package4/PRODUCT_1\n");
        assert_eq!(
            resolve_folder("SKU1", file.path()).unwrap(),
            "Package4/PRODUCT_1"
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let file = lookup_file("sku,product_folder\nsku1,lower/FOLDER\nSKU1,upper/FOLDER\n");
        assert_eq!(resolve_folder("SKU1", file.path()).unwrap(), "upper/FOLDER");
    }
}
