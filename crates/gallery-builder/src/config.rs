//! Page configuration types and JSON parsing.
//!
//! The configuration carries everything the page builder needs besides the
//! assets tree itself: per-theme descriptions and tags, the supported image
//! extensions, the theme-name rewrite rule, the page title and the sort
//! flags. Descriptions and tags are keyed by lower-cased theme folder name.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path as StdPath;

use camino::Utf8Path;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_DESCRIPTION: &str = "Design collection with unique style and creative elements";
const DEFAULT_PAGE_TITLE: &str = "Design Review Board";
const DEFAULT_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".webp"];
const DEFAULT_THEME_PATTERN: &str = r"theme(\d+)";
const DEFAULT_THEME_REPLACEMENT: &str = "Theme $1";

/// Rewrite rule applied to theme folder names before display formatting.
///
/// Only the first match is replaced. The replacement uses `regex` expansion
/// syntax (`$1`, `${name}`).
#[derive(Debug, Clone)]
pub struct ThemeNameFormat {
    pattern: Regex,
    replacement: String,
}

impl ThemeNameFormat {
    /// Compile a rewrite rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidThemePattern`] when the pattern does not
    /// compile.
    pub fn new(
        pattern: &str,
        case_insensitive: bool,
        replacement: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|err| ConfigError::InvalidThemePattern {
                pattern: pattern.to_owned(),
                message: err.to_string(),
            })?;
        Ok(Self {
            pattern: compiled,
            replacement: replacement.into(),
        })
    }

    /// Apply the rule to a folder name.
    #[must_use]
    pub fn apply(&self, folder_name: &str) -> String {
        self.pattern
            .replacen(folder_name, 1, self.replacement.as_str())
            .into_owned()
    }
}

/// Build-time ordering and labelling switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildFlags {
    /// Sort theme folders by name.
    pub sort_themes: bool,
    /// Sort images by file name within each theme.
    pub sort_images: bool,
    /// Keep file extensions in design labels.
    pub show_extensions: bool,
}

impl Default for BuildFlags {
    fn default() -> Self {
        Self {
            sort_themes: true,
            sort_images: true,
            show_extensions: false,
        }
    }
}

/// Validated page configuration.
///
/// # Example
///
/// ```
/// use gallery_builder::GalleryConfig;
///
/// let json = r#"{
///     "themeDescriptions": { "Theme1": "Bold shapes" },
///     "themeTags": { "theme1": ["Bold", "Shapes"] },
///     "pageTitle": "Round 2"
/// }"#;
///
/// let config = GalleryConfig::from_json(json).expect("valid config");
/// assert_eq!(config.description_for("THEME1"), "Bold shapes");
/// assert_eq!(config.tags_for("theme1").len(), 2);
/// assert_eq!(config.page_title(), "Round 2");
/// assert!(config.is_supported_image("cover.PNG"));
/// ```
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    theme_descriptions: BTreeMap<String, String>,
    theme_tags: BTreeMap<String, Vec<String>>,
    default_description: String,
    supported_extensions: Vec<String>,
    theme_name_format: Option<ThemeNameFormat>,
    page_title: String,
    build: BuildFlags,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            theme_descriptions: BTreeMap::new(),
            theme_tags: BTreeMap::new(),
            default_description: DEFAULT_DESCRIPTION.to_owned(),
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_owned()).collect(),
            theme_name_format: default_theme_name_format(),
            page_title: DEFAULT_PAGE_TITLE.to_owned(),
            build: BuildFlags::default(),
        }
    }
}

fn default_theme_name_format() -> Option<ThemeNameFormat> {
    ThemeNameFormat::new(DEFAULT_THEME_PATTERN, true, DEFAULT_THEME_REPLACEMENT).ok()
}

impl GalleryConfig {
    /// Parses a configuration from a JSON string.
    ///
    /// Missing fields fall back to the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the JSON is malformed, contains unknown
    /// fields, carries an invalid theme pattern or a malformed extension.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawGalleryConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?;
        Self::from_raw(raw)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_std_path()).map_err(|e| io_error(path, &e))?;
        Self::from_json(&contents)
    }

    /// Loads a configuration file, using the defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for any failure other than a missing file.
    pub fn load_or_default(path: &Utf8Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path.as_std_path()) {
            Ok(contents) => Self::from_json(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(io_error(path, &err)),
        }
    }

    fn from_raw(raw: RawGalleryConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let supported_extensions = match raw.supported_extensions {
            Some(extensions) => extensions
                .into_iter()
                .map(normalise_extension)
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.supported_extensions,
        };

        let theme_name_format = match raw.theme_name_format {
            Some(RawThemeNameFormat::Disabled(false)) => None,
            Some(RawThemeNameFormat::Disabled(true)) | None => defaults.theme_name_format,
            Some(RawThemeNameFormat::Rule {
                pattern,
                case_insensitive,
                replacement,
            }) => Some(ThemeNameFormat::new(
                &pattern,
                case_insensitive,
                replacement,
            )?),
        };

        Ok(Self {
            theme_descriptions: lowercase_keys(raw.theme_descriptions),
            theme_tags: lowercase_keys(raw.theme_tags),
            default_description: raw
                .default_description
                .unwrap_or(defaults.default_description),
            supported_extensions,
            theme_name_format,
            page_title: raw.page_title.unwrap_or(defaults.page_title),
            build: BuildFlags {
                sort_themes: raw.build.sort_themes.unwrap_or(defaults.build.sort_themes),
                sort_images: raw.build.sort_images.unwrap_or(defaults.build.sort_images),
                show_extensions: raw
                    .build
                    .show_extensions
                    .unwrap_or(defaults.build.show_extensions),
            },
        })
    }

    /// Description for a theme folder, or the default description.
    #[must_use]
    pub fn description_for(&self, folder_name: &str) -> &str {
        self.theme_descriptions
            .get(&folder_name.to_lowercase())
            .map_or(self.default_description.as_str(), String::as_str)
    }

    /// Tags for a theme folder; empty when none are configured.
    #[must_use]
    pub fn tags_for(&self, folder_name: &str) -> &[String] {
        self.theme_tags
            .get(&folder_name.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Whether a file name carries one of the supported image extensions.
    ///
    /// Comparison is case-insensitive. Dot-files without a further extension
    /// (`.png`) are not images.
    #[must_use]
    pub fn is_supported_image(&self, file_name: &str) -> bool {
        let Some(extension) = StdPath::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
        else {
            return false;
        };
        let dotted = format!(".{}", extension.to_lowercase());
        self.supported_extensions.iter().any(|ext| *ext == dotted)
    }

    /// Supported extensions, lower-cased and dot-prefixed.
    #[must_use]
    pub fn supported_extensions(&self) -> &[String] {
        &self.supported_extensions
    }

    /// Theme-name rewrite rule, if enabled.
    #[must_use]
    pub fn theme_name_format(&self) -> Option<&ThemeNameFormat> {
        self.theme_name_format.as_ref()
    }

    /// Title of the generated document.
    #[must_use]
    pub fn page_title(&self) -> &str {
        &self.page_title
    }

    /// Ordering and labelling switches.
    #[must_use]
    pub fn build(&self) -> BuildFlags {
        self.build
    }
}

fn io_error(path: &Utf8Path, err: &io::Error) -> ConfigError {
    ConfigError::IoError {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn lowercase_keys<V>(map: BTreeMap<String, V>) -> BTreeMap<String, V> {
    map.into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

fn normalise_extension(value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.len() < 2 || !trimmed.starts_with('.') {
        return Err(ConfigError::InvalidExtension { value });
    }
    Ok(trimmed.to_lowercase())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
struct RawGalleryConfig {
    #[serde(default)]
    theme_descriptions: BTreeMap<String, String>,
    #[serde(default)]
    theme_tags: BTreeMap<String, Vec<String>>,
    default_description: Option<String>,
    supported_extensions: Option<Vec<String>>,
    theme_name_format: Option<RawThemeNameFormat>,
    page_title: Option<String>,
    #[serde(default)]
    build: RawBuildFlags,
}

/// `themeNameFormat` is either a rule object or `false` to disable rewriting.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawThemeNameFormat {
    Disabled(bool),
    #[serde(rename_all = "camelCase")]
    Rule {
        pattern: String,
        #[serde(default)]
        case_insensitive: bool,
        replacement: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
struct RawBuildFlags {
    sort_themes: Option<bool>,
    sort_images: Option<bool>,
    show_extensions: Option<bool>,
}
