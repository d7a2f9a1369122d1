//! In-memory style collection

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::extract::extract_style_from_prompts;
use crate::merge::apply_styles_to_prompt;
use crate::style::{Origin, PromptStyle};

/// Result of peeling styles off a prompt pair
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedStyles {
    /// Style names in the order they were originally applied
    pub styles: Vec<String>,
    /// Prompt with every extracted style removed
    pub prompt: String,
    /// Negative prompt with every extracted style removed
    pub negative_prompt: String,
}

/// Named styles in insertion order.
///
/// Names are unique; inserting an existing name replaces that record in place.
/// Lookups of unknown names resolve to the no-op style.
#[derive(Debug, Clone)]
pub struct StyleSet {
    styles: Vec<PromptStyle>,
    index: HashMap<String, usize>,
    no_style: PromptStyle,
}

impl Default for StyleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSet {
    pub fn new() -> Self {
        Self {
            styles: Vec::new(),
            index: HashMap::new(),
            no_style: PromptStyle::none(),
        }
    }

    /// Insert a style, returning the record it replaced
    pub fn insert(&mut self, style: PromptStyle) -> Option<PromptStyle> {
        match self.index.get(&style.name) {
            Some(&pos) => Some(std::mem::replace(&mut self.styles[pos], style)),
            None => {
                self.index.insert(style.name.clone(), self.styles.len());
                self.styles.push(style);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PromptStyle> {
        self.index.get(name).map(|&pos| &self.styles[pos])
    }

    /// Look up a style, falling back to the no-op style
    pub fn style(&self, name: &str) -> &PromptStyle {
        self.get(name).unwrap_or(&self.no_style)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptStyle> {
        self.styles.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(|s| s.name.as_str())
    }

    pub fn clear(&mut self) {
        self.styles.clear();
        self.index.clear();
    }

    /// Positive templates for the named styles; unknown names give ""
    pub fn prompts_for<S: AsRef<str>>(&self, names: &[S]) -> Vec<&str> {
        names.iter().map(|n| self.style(n.as_ref()).prompt.as_str()).collect()
    }

    /// Negative templates for the named styles; unknown names give ""
    pub fn negative_prompts_for<S: AsRef<str>>(&self, names: &[S]) -> Vec<&str> {
        names
            .iter()
            .map(|n| self.style(n.as_ref()).negative_prompt.as_str())
            .collect()
    }

    /// Apply the named styles' positive templates to a prompt, in order
    pub fn apply<S: AsRef<str>>(&self, prompt: &str, names: &[S]) -> String {
        apply_styles_to_prompt(prompt, self.prompts_for(names))
    }

    /// Apply the named styles' negative templates to a negative prompt, in order
    pub fn apply_negative<S: AsRef<str>>(&self, negative_prompt: &str, names: &[S]) -> String {
        apply_styles_to_prompt(negative_prompt, self.negative_prompts_for(names))
    }

    /// Work out which styles were applied to a prompt pair and strip them.
    ///
    /// Greedy: each pass takes the first style (in insertion order) whose
    /// templates match the current pair, strips it, and starts over. A style is
    /// used at most once. The outermost style is found first, so the collected
    /// names are reversed to give application order. When two styles could match
    /// the same suffix the earlier one wins, even if the other choice would have
    /// stripped more.
    pub fn extract_styles(&self, prompt: &str, negative_prompt: &str) -> ExtractedStyles {
        let mut prompt = prompt.to_string();
        let mut negative_prompt = negative_prompt.to_string();
        let mut applicable: Vec<Option<&PromptStyle>> =
            self.styles.iter().filter(|s| s.has_templates()).map(Some).collect();
        let mut extracted = Vec::new();

        loop {
            let found = applicable.iter_mut().find_map(|slot| {
                let style = (*slot)?;
                let stripped = extract_style_from_prompts(style, &prompt, &negative_prompt)?;
                *slot = None;
                Some((style, stripped))
            });

            let Some((style, (new_prompt, new_negative))) = found else {
                break;
            };

            debug!(style = %style.name, remaining = %new_prompt, "extract_styles: stripped style");
            prompt = new_prompt;
            negative_prompt = new_negative;
            extracted.push(style.name.clone());
        }

        extracted.reverse();
        ExtractedStyles {
            styles: extracted,
            prompt,
            negative_prompt,
        }
    }

    /// Point every unassigned record at `path`, returning how many moved
    pub(crate) fn assign_default_origin(&mut self, path: &Path) -> usize {
        let mut assigned = 0;
        for style in self.styles.iter_mut().filter(|s| s.origin == Origin::Unassigned) {
            style.origin = Origin::File(path.to_path_buf());
            assigned += 1;
        }
        assigned
    }
}

impl<'a> IntoIterator for &'a StyleSet {
    type Item = &'a PromptStyle;
    type IntoIter = std::slice::Iter<'a, PromptStyle>;

    fn into_iter(self) -> Self::IntoIter {
        self.styles.iter()
    }
}

impl FromIterator<PromptStyle> for StyleSet {
    fn from_iter<I: IntoIterator<Item = PromptStyle>>(iter: I) -> Self {
        let mut set = Self::new();
        for style in iter {
            set.insert(style);
        }
        set
    }
}
