//! Merging style templates into prompts

use crate::PLACEHOLDER;

/// Merge one style template into a prompt.
///
/// A template containing `{prompt}` has every placeholder replaced by the prompt
/// verbatim. Any other template is appended to the trimmed prompt with a ", "
/// separator; empty sides are dropped.
pub fn merge_prompts(style_prompt: &str, prompt: &str) -> String {
    if style_prompt.contains(PLACEHOLDER) {
        return style_prompt.replace(PLACEHOLDER, prompt);
    }

    [prompt.trim(), style_prompt.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fold `merge_prompts` over templates, first to last
pub fn apply_styles_to_prompt<I, S>(prompt: &str, styles: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    styles
        .into_iter()
        .fold(prompt.to_string(), |merged, style| merge_prompts(style.as_ref(), &merged))
}
