//! The one-shot build: scan, render, write.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::{error, info};

use crate::atomic_io::write_atomic;
use crate::config::GalleryConfig;
use crate::error::BuildError;
use crate::render::render_page;
use crate::scan::scan_assets;

/// Default assets directory.
pub const DEFAULT_ASSETS_DIR: &str = "assets";
/// Default output document.
pub const DEFAULT_OUTPUT: &str = "index.html";

/// Locations used by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Directory containing one folder per theme.
    pub assets_dir: Utf8PathBuf,
    /// File the page is written to.
    pub output: Utf8PathBuf,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            assets_dir: Utf8PathBuf::from(DEFAULT_ASSETS_DIR),
            output: Utf8PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl BuildOptions {
    /// URL prefix for images, derived from the assets directory.
    #[must_use]
    pub fn asset_base(&self) -> String {
        let base = self.assets_dir.as_str().replace('\\', "/");
        let trimmed = base.trim_end_matches('/');
        if trimmed.is_empty() {
            ".".to_owned()
        } else {
            trimmed.to_owned()
        }
    }
}

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Path of the written page.
    pub output: Utf8PathBuf,
    /// Number of themes rendered.
    pub themes: usize,
    /// Number of designs rendered across all themes.
    pub designs: usize,
}

/// Result of a build that did not fail outright.
///
/// The two non-writing outcomes are deliberate no-ops: nothing is written and
/// the caller should still exit successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The page was written.
    Written(BuildReport),
    /// The assets directory does not exist.
    AssetsMissing {
        /// The directory that was looked for.
        path: Utf8PathBuf,
    },
    /// The assets directory holds no theme with images.
    NoThemes,
}

/// Run a complete build.
///
/// # Errors
///
/// Returns [`BuildError`] when the assets tree cannot be read or the page
/// cannot be written.
pub fn run_build(options: &BuildOptions, config: &GalleryConfig) -> Result<BuildOutcome, BuildError> {
    info!(assets = %options.assets_dir, "scanning assets directory");
    let assets = match Dir::open_ambient_dir(options.assets_dir.as_std_path(), ambient_authority()) {
        Ok(dir) => dir,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            error!(assets = %options.assets_dir, "assets directory not found");
            return Ok(BuildOutcome::AssetsMissing {
                path: options.assets_dir.clone(),
            });
        }
        Err(err) => {
            return Err(BuildError::ScanError {
                path: options.assets_dir.clone(),
                message: err.to_string(),
            });
        }
    };

    let themes = scan_assets(&assets, &options.assets_dir, config)?;
    if themes.is_empty() {
        info!(assets = %options.assets_dir, "no theme folders found");
        return Ok(BuildOutcome::NoThemes);
    }

    info!(count = themes.len(), "found themes");
    for theme in &themes {
        info!(theme = %theme.folder, images = theme.images.len(), "theme");
    }

    info!("generating page");
    let page = render_page(&themes, config, &options.asset_base());
    write_output(&options.output, &page)?;

    let designs = themes.iter().map(|theme| theme.images.len()).sum();
    info!(output = %options.output, themes = themes.len(), designs, "page generated");
    Ok(BuildOutcome::Written(BuildReport {
        output: options.output.clone(),
        themes: themes.len(),
        designs,
    }))
}

fn write_output(output: &Utf8Path, page: &str) -> Result<(), BuildError> {
    let write_error = |message: String| BuildError::WriteError {
        path: output.to_path_buf(),
        message,
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| write_error("output path must name a file".to_owned()))?;
    let parent = match output.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent.as_std_path(), ambient_authority())
        .map_err(|err| write_error(err.to_string()))?;
    write_atomic(&dir, Utf8Path::new(file_name), page).map_err(|err| match err {
        BuildError::WriteError { message, .. } => write_error(message),
        other @ BuildError::ScanError { .. } => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("assets", "assets")]
    #[case("assets/", "assets")]
    #[case("public\\assets", "public/assets")]
    #[case("/", ".")]
    fn derives_asset_base(#[case] dir: &str, #[case] expected: &str) {
        let options = BuildOptions {
            assets_dir: Utf8PathBuf::from(dir),
            ..BuildOptions::default()
        };
        assert_eq!(options.asset_base(), expected);
    }
}
