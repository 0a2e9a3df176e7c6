use std::collections::HashSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::{info, warn};
use url::Url;

use crate::records::{format_record, split_record};

const HEADER: [&str; 2] = ["product_sku", "image_urls"];

/// Appends one `(sku, urls)` row to the tracking CSV.
///
/// The URL list is serialized as a JSON array inside a single CSV field. The
/// header is written only when the file does not exist yet. A SKU that is
/// already recorded triggers a warning but the row is still appended; rows
/// are never rewritten or deduplicated.
pub fn append_urls(sku: &str, urls: &[Url], output_file: &Path) -> Result<(), TrackerError> {
    let file_exists = output_file.exists();

    if file_exists && recorded_skus(output_file)?.contains(sku) {
        warn!(
            "SKU '{sku}' already exists in {}, appending a duplicate entry",
            output_file.display()
        );
    }

    let urls_json = serde_json::to_string(urls).context(JsonSnafu)?;

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(output_file)
        .context(IoSnafu { path: output_file })?;
    if !file_exists {
        writeln!(file, "{}", format_record(&HEADER)).context(IoSnafu { path: output_file })?;
    }
    writeln!(file, "{}", format_record(&[sku, &urls_json]))
        .context(IoSnafu { path: output_file })?;

    info!("saved URLs to {}", output_file.display());
    Ok(())
}

/// SKUs already present in the file, used for the duplicate warning only.
/// Rows that do not parse are skipped with a warning.
fn recorded_skus(output_file: &Path) -> Result<HashSet<String>, TrackerError> {
    let content =
        std::fs::read_to_string(output_file).context(IoSnafu { path: output_file })?;
    // Externally created files may lack the header line.
    let has_header = content
        .lines()
        .next()
        .is_some_and(|line| line == format_record(&HEADER));
    let skip = usize::from(has_header);
    let mut skus = HashSet::new();
    for line in content.lines().skip(skip).filter(|line| !line.is_empty()) {
        match split_record(line) {
            Ok(fields) => {
                if let Some(sku) = fields.into_iter().next() {
                    skus.insert(sku);
                }
            }
            Err(e) => warn!(
                "skipping malformed row in {}: {e}",
                output_file.display()
            ),
        }
    }
    Ok(skus)
}

#[derive(Debug, Snafu)]
pub enum TrackerError {
    #[snafu(display("could not access {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("could not serialize URLs: {source}"))]
    Json { source: serde_json::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(raw: &[&str]) -> Vec<Url> {
        raw.iter().map(|u| Url::parse(u).unwrap()).collect()
    }

    #[test]
    fn new_file_gets_a_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("product_image_urls.csv");
        let batch = urls(&["https://example.com/images/SKU1_1.jpg"]);

        append_urls("SKU1", &batch, &output).unwrap();
        append_urls("SKU2", &batch, &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let headers = content
            .lines()
            .filter(|l| l.starts_with("product_sku"))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn duplicate_sku_appends_a_second_row() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("product_image_urls.csv");
        let batch = urls(&["https://example.com/images/SKU1_1.jpg"]);

        append_urls("SKU1", &batch, &output).unwrap();
        append_urls("SKU1", &batch, &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let rows = content.lines().filter(|l| l.starts_with("SKU1,")).count();
        assert_eq!(rows, 2);
    }

    #[test]
    fn url_list_round_trips_through_the_csv_field() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("product_image_urls.csv");
        let batch = urls(&[
            "https://raw.githubusercontent.com/owner/repo/main/images/SKU1_1.jpg",
            "https://raw.githubusercontent.com/owner/repo/main/images/SKU1_2.PNG",
        ]);

        append_urls("SKU1", &batch, &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let row = content.lines().nth(1).unwrap();
        let fields = split_record(row).unwrap();
        assert_eq!(fields[0], "SKU1");
        let parsed: Vec<String> = serde_json::from_str(&fields[1]).unwrap();
        assert_eq!(
            parsed,
            [
                "https://raw.githubusercontent.com/owner/repo/main/images/SKU1_1.jpg",
                "https://raw.githubusercontent.com/owner/repo/main/images/SKU1_2.PNG",
            ]
        );
    }

    #[test]
    fn headerless_file_still_warns_on_its_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("product_image_urls.csv");
        std::fs::write(&output, "SKU1,\"[]\"\n").unwrap();

        assert_eq!(
            recorded_skus(&output).unwrap(),
            HashSet::from(["SKU1".to_owned()])
        );
    }

    #[test]
    fn malformed_rows_do_not_block_the_append() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("product_image_urls.csv");
        std::fs::write(&output, "product_sku,image_urls\n\"broken,row\n").unwrap();

        let batch = urls(&["https://example.com/images/SKU1_1.jpg"]);
        append_urls("SKU1", &batch, &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
