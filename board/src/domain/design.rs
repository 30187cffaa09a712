//! Design identifiers and the theme layout of the gallery.
//!
//! A design is addressed by `<theme path>/<file name>`. The theme path may
//! itself contain `/` when themes are nested under rounds; the file name never
//! does.

use std::fmt;

use gallery_builder::{BadgeKind, ThemeFolder, badge_element_id, format_design_name};
use serde::{Deserialize, Serialize};

/// Validation errors returned by [`DesignId::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignIdValidationError {
    /// The id was empty.
    Empty,
    /// The id has no `/` separating theme and file name.
    MissingSeparator,
    /// The theme part was empty.
    EmptyTheme,
    /// The file name part was empty.
    EmptyFilename,
    /// The id has leading or trailing whitespace.
    SurroundingWhitespace,
}

impl fmt::Display for DesignIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "design id must not be empty"),
            Self::MissingSeparator => write!(f, "design id must look like <theme>/<file>"),
            Self::EmptyTheme => write!(f, "design id theme must not be empty"),
            Self::EmptyFilename => write!(f, "design id file name must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "design id must not have surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for DesignIdValidationError {}

/// Typed design identifier.
///
/// # Examples
/// ```
/// use board::domain::DesignId;
///
/// let id = DesignId::parse("round2/theme1/hero.png").expect("valid id");
/// assert_eq!(id.theme(), "round2/theme1");
/// assert_eq!(id.filename(), "hero.png");
/// assert_eq!(id.as_str(), "round2/theme1/hero.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DesignId {
    raw: String,
    theme: String,
    filename: String,
}

impl DesignId {
    /// Parse a `<theme>/<file>` id.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, DesignIdValidationError> {
        Self::from_owned(raw.as_ref().to_owned())
    }

    /// Build an id from its parts.
    pub fn from_parts(
        theme: impl AsRef<str>,
        filename: impl AsRef<str>,
    ) -> Result<Self, DesignIdValidationError> {
        Self::from_owned(format!("{}/{}", theme.as_ref(), filename.as_ref()))
    }

    fn from_owned(raw: String) -> Result<Self, DesignIdValidationError> {
        if raw.is_empty() {
            return Err(DesignIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(DesignIdValidationError::SurroundingWhitespace);
        }
        let (theme, filename) = raw
            .rsplit_once('/')
            .ok_or(DesignIdValidationError::MissingSeparator)?;
        if theme.is_empty() {
            return Err(DesignIdValidationError::EmptyTheme);
        }
        if filename.is_empty() {
            return Err(DesignIdValidationError::EmptyFilename);
        }
        let theme = theme.to_owned();
        let filename = filename.to_owned();
        Ok(Self {
            raw,
            theme,
            filename,
        })
    }

    /// Full id as stored in `design_id` columns.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Theme path (folder, possibly nested).
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Image file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Human label used for titles and statistics.
    pub fn label(&self) -> String {
        format_design_name(&self.filename, false)
    }

    /// Element id of this design's badge for `kind`.
    pub fn badge_id(&self, kind: BadgeKind) -> String {
        badge_element_id(kind, &self.raw)
    }
}

impl AsRef<str> for DesignId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<DesignId> for String {
    fn from(value: DesignId) -> Self {
        value.raw
    }
}

impl TryFrom<String> for DesignId {
    type Error = DesignIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Designs of one theme, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    folder: String,
    designs: Vec<DesignId>,
}

impl Theme {
    /// Build a theme from its folder name and designs.
    pub fn new(folder: impl Into<String>, designs: Vec<DesignId>) -> Self {
        Self {
            folder: folder.into(),
            designs,
        }
    }

    /// Folder name.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Designs in page order.
    pub fn designs(&self) -> &[DesignId] {
        &self.designs
    }
}

/// Every theme on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    themes: Vec<Theme>,
}

impl Gallery {
    /// Build a gallery from explicit themes.
    pub fn new(themes: Vec<Theme>) -> Self {
        Self { themes }
    }

    /// Build a gallery from scanned theme folders.
    pub fn from_folders(folders: &[ThemeFolder]) -> Result<Self, DesignIdValidationError> {
        let themes = folders
            .iter()
            .map(|folder| {
                let designs = folder
                    .images
                    .iter()
                    .map(|image| DesignId::from_parts(&folder.folder, image))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Theme::new(folder.folder.clone(), designs))
            })
            .collect::<Result<Vec<_>, DesignIdValidationError>>()?;
        Ok(Self { themes })
    }

    /// Themes in page order.
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Theme containing `design`, if it is on the page.
    pub fn theme_of(&self, design: &DesignId) -> Option<&Theme> {
        self.themes
            .iter()
            .find(|theme| theme.folder == design.theme() && theme.designs.contains(design))
    }

    /// Every design on the page.
    pub fn designs(&self) -> impl Iterator<Item = &DesignId> {
        self.themes.iter().flat_map(|theme| theme.designs.iter())
    }
}
