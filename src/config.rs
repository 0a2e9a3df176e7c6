use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

const PLACEHOLDER_OWNER: &str = "missing_github_owner";
const PLACEHOLDER_REPO: &str = "missing_github_repo";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Account that owns the image hosting repository.
    pub github_owner: String,
    /// Name of the image hosting repository.
    pub github_repo: String,
    /// Local clone of the image hosting repository with a writable push remote.
    pub staging_dir: PathBuf,
    /// Directory that bare product folder names are resolved under.
    pub image_base_dir: PathBuf,
    /// CSV mapping `sku` to `product_folder`.
    pub lookup_file: PathBuf,
    /// Append-only CSV of uploaded image URLs per SKU.
    pub output_file: PathBuf,
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "GitHub owner: {}", self.github_owner)?;
        writeln!(f, "GitHub repository: {}", self.github_repo)?;
        writeln!(f, "Staging clone: {}", self.staging_dir.display())?;
        writeln!(f, "Image base directory: {}", self.image_base_dir.display())?;
        writeln!(f, "SKU lookup file: {}", self.lookup_file.display())?;
        writeln!(f, "URL tracking file: {}", self.output_file.display())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_owner: PLACEHOLDER_OWNER.to_owned(),
            github_repo: PLACEHOLDER_REPO.to_owned(),
            staging_dir: "image-repo".into(),
            image_base_dir: "Package4".into(),
            lookup_file: "PROJECT_DATA/generated_skus.csv".into(),
            output_file: "PROJECT_DATA/product_image_urls.csv".into(),
        }
    }
}

impl Config {
    /// `true` while the remote coordinates have not been configured yet.
    #[must_use]
    pub fn has_placeholder_remote(&self) -> bool {
        self.github_owner == PLACEHOLDER_OWNER || self.github_repo == PLACEHOLDER_REPO
    }
}

pub fn load_config() -> Result<Config, ConfigError> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file("config.toml"))
        .merge(Env::prefixed("SIP_"))
        .extract()
        .context(FigmentSnafu)
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to set configuration: {source}"))]
    Figment { source: figment::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_recognized_as_unconfigured() {
        assert!(Config::default().has_placeholder_remote());
    }

    #[test]
    fn configured_remote_passes_placeholder_check() {
        let config = Config {
            github_owner: "CaCEO1".to_owned(),
            github_repo: "bey-images".to_owned(),
            ..Config::default()
        };
        assert!(!config.has_placeholder_remote());
    }
}
