//! Style records

use std::path::{Path, PathBuf};

use crate::NO_STYLE_NAME;

/// Where a style record lives on disk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Origin {
    /// Not tied to a file yet; save assigns the default file
    #[default]
    Unassigned,
    /// Loaded from, and saved back to, this file
    File(PathBuf),
    /// Synthetic header for one file of a wildcard-loaded set
    Divider,
}

impl Origin {
    /// The backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Unassigned | Self::Divider => None,
        }
    }
}

/// A named pair of positive/negative prompt templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptStyle {
    /// Unique name within a set
    pub name: String,

    /// Positive template, may contain the `{prompt}` placeholder
    pub prompt: String,

    /// Negative template, may contain the `{prompt}` placeholder
    pub negative_prompt: String,

    /// Storage unit this record belongs to
    pub origin: Origin,
}

impl PromptStyle {
    /// Create a style that is not yet tied to a file
    pub fn new(name: impl Into<String>, prompt: impl Into<String>, negative_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            negative_prompt: negative_prompt.into(),
            origin: Origin::Unassigned,
        }
    }

    /// The no-op style: empty templates, merges and extracts as a pass-through
    pub fn none() -> Self {
        Self::new(NO_STYLE_NAME, "", "")
    }

    /// A divider record heading the styles of one file
    pub fn divider(name: impl Into<String>) -> Self {
        Self {
            origin: Origin::Divider,
            ..Self::new(name, "", "")
        }
    }

    /// Same record with a different origin
    pub fn with_origin(self, origin: Origin) -> Self {
        Self { origin, ..self }
    }

    pub fn is_divider(&self) -> bool {
        self.origin == Origin::Divider
    }

    /// Styles without any template text can never be extracted
    pub fn has_templates(&self) -> bool {
        !self.prompt.is_empty() || !self.negative_prompt.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_style_is_empty() {
        let style = PromptStyle::none();
        assert_eq!(style.name, "None");
        assert!(!style.has_templates());
        assert_eq!(style.origin, Origin::Unassigned);
    }

    #[test]
    fn test_divider() {
        let style = PromptStyle::divider("STYLES.CSV");
        assert!(style.is_divider());
        assert!(!style.has_templates());
        assert_eq!(style.origin.path(), None);
    }

    #[test]
    fn test_with_origin() {
        let style = PromptStyle::new("Cinematic", "{prompt}, film grain", "").with_origin(Origin::File("a.csv".into()));
        assert_eq!(style.origin.path(), Some(Path::new("a.csv")));
        assert_eq!(style.prompt, "{prompt}, film grain");
    }

    #[test]
    fn test_has_templates_negative_only() {
        assert!(PromptStyle::new("NoBlur", "", "blurry").has_templates());
    }
}
