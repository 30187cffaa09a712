//! Discovery of theme folders and their images.

use std::io;

use camino::Utf8Path;
use cap_std::fs::Dir;
use tracing::{debug, warn};

use crate::config::GalleryConfig;
use crate::error::BuildError;

/// One theme folder and the images it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeFolder {
    /// Folder name relative to the assets directory.
    pub folder: String,
    /// Image file names inside the folder.
    pub images: Vec<String>,
}

impl ThemeFolder {
    /// Design id of an image in this folder (`<folder>/<file>`).
    #[must_use]
    pub fn design_id(&self, image: &str) -> String {
        format!("{}/{image}", self.folder)
    }
}

/// List the themes under an opened assets directory.
///
/// Only directories become themes and only files with a supported extension
/// become images. Themes without images are dropped. Ordering follows the
/// sort flags; unsorted listings keep the platform's directory order.
/// Entries whose names are not valid UTF-8 are skipped with a warning.
///
/// `assets_path` is used for error reporting only.
///
/// # Errors
///
/// Returns [`BuildError::ScanError`] when a directory cannot be listed.
pub fn scan_assets(
    assets: &Dir,
    assets_path: &Utf8Path,
    config: &GalleryConfig,
) -> Result<Vec<ThemeFolder>, BuildError> {
    let flags = config.build();
    let mut folders = list_names(assets, assets_path, EntryFilter::Directories)?;
    if flags.sort_themes {
        folders.sort();
    }

    let mut themes = Vec::with_capacity(folders.len());
    for folder in folders {
        let theme_path = assets_path.join(&folder);
        let theme_dir = assets
            .open_dir(&folder)
            .map_err(|err| scan_error(&theme_path, &err))?;
        let mut images = list_names(&theme_dir, &theme_path, EntryFilter::Files)?;
        images.retain(|name| config.is_supported_image(name));
        if flags.sort_images {
            images.sort();
        }

        if images.is_empty() {
            debug!(theme = %folder, "skipping theme without images");
            continue;
        }
        themes.push(ThemeFolder { folder, images });
    }
    Ok(themes)
}

#[derive(Debug, Clone, Copy)]
enum EntryFilter {
    Directories,
    Files,
}

fn list_names(dir: &Dir, path: &Utf8Path, filter: EntryFilter) -> Result<Vec<String>, BuildError> {
    let entries = dir.entries().map_err(|err| scan_error(path, &err))?;
    let mut names = Vec::new();
    for entry in entries {
        let dir_entry = entry.map_err(|err| scan_error(path, &err))?;
        let file_type = dir_entry.file_type().map_err(|err| scan_error(path, &err))?;
        let keep = match filter {
            EntryFilter::Directories => file_type.is_dir(),
            EntryFilter::Files => !file_type.is_dir(),
        };
        if !keep {
            continue;
        }
        match dir_entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(directory = %path, name = ?raw, "skipping non UTF-8 entry"),
        }
    }
    Ok(names)
}

fn scan_error(path: &Utf8Path, err: &io::Error) -> BuildError {
    BuildError::ScanError {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_std::ambient_authority;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Assets {
        _tmp: TempDir,
        dir: Dir,
    }

    #[fixture]
    fn assets() -> Assets {
        let tmp = TempDir::new().expect("temp dir");
        let root = tmp.path();
        for (folder, files) in [
            ("theme2", vec!["b.png", "a.JPG", "notes.txt"]),
            ("theme1", vec!["z.webp"]),
            ("empty", vec!["readme.md"]),
        ] {
            std::fs::create_dir(root.join(folder)).expect("create theme");
            for file in files {
                std::fs::write(root.join(folder).join(file), b"img").expect("write file");
            }
        }
        std::fs::create_dir(root.join("theme2").join("nested.png")).expect("nested dir");
        std::fs::write(root.join("loose.png"), b"img").expect("write loose file");
        let dir = Dir::open_ambient_dir(root, ambient_authority()).expect("open assets");
        Assets { _tmp: tmp, dir }
    }

    #[rstest]
    fn scans_sorted_themes_with_supported_images(assets: Assets) {
        let themes = scan_assets(&assets.dir, Utf8Path::new("assets"), &GalleryConfig::default())
            .expect("scan succeeds");

        assert_eq!(
            themes,
            vec![
                ThemeFolder {
                    folder: "theme1".to_owned(),
                    images: vec!["z.webp".to_owned()],
                },
                ThemeFolder {
                    folder: "theme2".to_owned(),
                    images: vec!["a.JPG".to_owned(), "b.png".to_owned()],
                },
            ]
        );
    }

    #[rstest]
    fn unsorted_scan_still_filters(assets: Assets) {
        let config = GalleryConfig::from_json(
            r#"{"build": {"sortThemes": false, "sortImages": false}}"#,
        )
        .expect("valid config");
        let mut themes =
            scan_assets(&assets.dir, Utf8Path::new("assets"), &config).expect("scan succeeds");
        themes.sort_by(|a, b| a.folder.cmp(&b.folder));

        let folders: Vec<_> = themes.iter().map(|t| t.folder.as_str()).collect();
        assert_eq!(folders, ["theme1", "theme2"]);
        let theme2 = themes.last().expect("theme2 present");
        assert_eq!(theme2.images.len(), 2);
    }

    #[test]
    fn design_id_joins_folder_and_file() {
        let theme = ThemeFolder {
            folder: "round2".to_owned(),
            images: Vec::new(),
        };
        assert_eq!(theme.design_id("a.png"), "round2/a.png");
    }
}
