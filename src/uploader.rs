use std::path::{Path, PathBuf};
use std::process::Command;

use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info};
use url::Url;

use crate::Config;

/// The version-control operations the uploader needs from the staging clone.
///
/// Production code drives the `git` CLI through [`GitCli`]; tests substitute
/// a recording fake so no repository or network is required.
pub trait VersionControl {
    fn stage(&self, relative_path: &Path) -> Result<(), VcsError>;
    fn commit(&self, message: &str) -> Result<(), VcsError>;
    fn push(&self) -> Result<(), VcsError>;
}

/// Runs `git` as a subprocess inside the staging clone.
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    #[must_use]
    pub fn new(repo_dir: PathBuf) -> Self {
        Self { repo_dir }
    }

    fn run(&self, args: &[&str]) -> Result<(), VcsError> {
        let rendered = format!("git {}", args.join(" "));
        debug!("running {rendered} in {}", self.repo_dir.display());
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .context(SpawnSnafu {
                command: rendered.clone(),
            })?;
        ensure!(
            output.status.success(),
            CommandFailedSnafu {
                command: rendered,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        );
        Ok(())
    }
}

impl VersionControl for GitCli {
    fn stage(&self, relative_path: &Path) -> Result<(), VcsError> {
        self.run(&["add", &relative_path.to_string_lossy()])
    }

    fn commit(&self, message: &str) -> Result<(), VcsError> {
        self.run(&["commit", "-m", message])
    }

    fn push(&self) -> Result<(), VcsError> {
        self.run(&["push"])
    }
}

#[derive(Debug, Snafu)]
pub enum VcsError {
    #[snafu(display("could not spawn {command}: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("{command} failed: {stderr}"))]
    CommandFailed { command: String, stderr: String },
}

/// Copies one image into the staging clone, commits it and pushes it, then
/// derives the raw-content URL the committed file is reachable under.
pub struct Uploader<V> {
    owner: String,
    repo: String,
    staging_dir: PathBuf,
    vcs: V,
}

impl Uploader<GitCli> {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_vcs(config, GitCli::new(config.staging_dir.clone()))
    }
}

impl<V: VersionControl> Uploader<V> {
    pub fn with_vcs(config: &Config, vcs: V) -> Self {
        Self {
            owner: config.github_owner.clone(),
            repo: config.github_repo.clone(),
            staging_dir: config.staging_dir.clone(),
            vcs,
        }
    }

    pub const fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Uploads a single image and returns its public URL.
    ///
    /// A custom name without an extension gets the source file's extension
    /// appended. The copy overwrites any previously staged file of the same
    /// name; a failed stage/commit/push leaves the copy in place, nothing is
    /// rolled back.
    pub fn upload(&self, image: &Path, custom_name: Option<&str>) -> Result<Url, UploadError> {
        ensure!(image.is_file(), ImageNotFoundSnafu { path: image });

        let dest_name = destination_name(image, custom_name);
        let images_dir = self.staging_dir.join("images");
        std::fs::create_dir_all(&images_dir).context(CopySnafu {
            path: images_dir.clone(),
        })?;
        let dest_path = images_dir.join(&dest_name);
        std::fs::copy(image, &dest_path).context(CopySnafu {
            path: dest_path.clone(),
        })?;
        info!("copied {} to images/{dest_name}", image.display());

        let relative = Path::new("images").join(&dest_name);
        self.vcs.stage(&relative).context(VcsSnafu)?;
        self.vcs
            .commit(&format!("Add image: {dest_name}"))
            .context(VcsSnafu)?;
        self.vcs.push().context(VcsSnafu)?;
        info!("pushed images/{dest_name} to {}/{}", self.owner, self.repo);

        let url = format!(
            "https://raw.githubusercontent.com/{}/{}/main/images/{dest_name}",
            self.owner, self.repo
        );
        Url::parse(&url).context(InvalidUrlSnafu { url })
    }
}

/// The name the image is committed under. Defaults to the source file name.
fn destination_name(image: &Path, custom_name: Option<&str>) -> String {
    let Some(name) = custom_name else {
        return image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    };
    if Path::new(name).extension().is_some() {
        return name.to_owned();
    }
    match image.extension() {
        Some(ext) => format!("{name}.{}", ext.to_string_lossy()),
        None => name.to_owned(),
    }
}

#[derive(Debug, Snafu)]
pub enum UploadError {
    #[snafu(display("Image not found: {}", path.display()))]
    ImageNotFound { path: PathBuf },
    #[snafu(display("could not copy image to {}: {source}", path.display()))]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("version control failed: {source}"))]
    Vcs { source: VcsError },
    #[snafu(display("derived an invalid URL {url}: {source}"))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_name_without_extension_inherits_the_source_one() {
        assert_eq!(
            destination_name(Path::new("photos/SKU1_1.jpg"), Some("SKU1_1")),
            "SKU1_1.jpg"
        );
    }

    #[test]
    fn custom_name_with_extension_is_kept() {
        assert_eq!(
            destination_name(Path::new("photos/raw.png"), Some("cover.webp")),
            "cover.webp"
        );
    }

    #[test]
    fn missing_custom_name_falls_back_to_file_name() {
        assert_eq!(
            destination_name(Path::new("photos/SKU1_1.jpg"), None),
            "SKU1_1.jpg"
        );
    }
}
