//! PromptStyles - reusable prompt style templates
//!
//! Keeps a library of named styles (positive/negative template pairs), merges
//! them into user prompts, and works out which styles were applied to a prompt
//! by peeling them back off.
//!
//! # Storage
//!
//! ```text
//! styles.csv            # name,prompt,negative_prompt
//! styles-portraits.csv  # also loaded when the path is "styles*.csv"
//! styles.csv.bak        # previous contents, written on save
//! ```
//!
//! # Example
//!
//! ```ignore
//! use promptstyles::StyleRepository;
//!
//! let repo = StyleRepository::new("styles.csv");
//! let styles = repo.load()?;
//! let prompt = styles.apply("a cat", &["Cinematic"]);
//! let negative = styles.apply_negative("", &["Cinematic"]);
//! let extracted = styles.extract_styles(&prompt, &negative);
//! assert_eq!(extracted.styles, vec!["Cinematic"]);
//! ```

pub mod config;
mod error;
mod extract;
mod merge;
mod normalize;
mod repository;
mod set;
mod style;

pub use error::StyleError;
pub use extract::{extract_style_from_prompts, extract_style_text};
pub use merge::{apply_styles_to_prompt, merge_prompts};
pub use normalize::normalize;
pub use repository::StyleRepository;
pub use set::{ExtractedStyles, StyleSet};
pub use style::{Origin, PromptStyle};

/// Marker inside a template where the user prompt is inserted
pub const PLACEHOLDER: &str = "{prompt}";

/// Name of the sentinel style returned for unknown lookups
pub const NO_STYLE_NAME: &str = "None";

/// File used when a wildcard path has no prefix to name a default file after
pub const DEFAULT_STYLES_FILE: &str = "styles.csv";
