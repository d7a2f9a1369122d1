//! Detecting and stripping a single style from a prompt

use crate::normalize::normalize;
use crate::style::PromptStyle;
use crate::PLACEHOLDER;

/// Strip one style template from a prompt.
///
/// Both sides are normalized before comparing. A template with a placeholder
/// matches when the prompt starts with the text before the placeholder and ends
/// with the text after it; a plain template matches as a suffix, and the ", "
/// joining it to the prompt is dropped too.
///
/// Returns the prompt with the template removed, or `None` when the template is
/// not present.
pub fn extract_style_text(style_text: &str, prompt: &str) -> Option<String> {
    let style_text = normalize(style_text);
    let normalized = normalize(prompt);

    if let Some((left, right)) = style_text.split_once(PLACEHOLDER) {
        if normalized.starts_with(left) && normalized.ends_with(right) {
            return Some(cut(prompt, &normalized, left.len(), right.len()));
        }
        return None;
    }

    if !normalized.ends_with(style_text.as_str()) {
        return None;
    }

    let stripped = cut(prompt, &normalized, 0, style_text.len());
    match stripped.strip_suffix(", ") {
        Some(rest) => Some(rest.to_string()),
        None => Some(stripped),
    }
}

/// Strip a style's positive and negative templates from a prompt pair.
///
/// Both sides must match. An empty template matches its side trivially, but a
/// style with no template text at all never matches.
pub fn extract_style_from_prompts(
    style: &PromptStyle,
    prompt: &str,
    negative_prompt: &str,
) -> Option<(String, String)> {
    if !style.has_templates() {
        return None;
    }

    let prompt = extract_style_text(&style.prompt, prompt)?;
    let negative_prompt = extract_style_text(&style.negative_prompt, negative_prompt)?;
    Some((prompt, negative_prompt))
}

/// Drop `head` bytes from the front and `tail` bytes from the back.
///
/// Offsets come from the normalized text but are applied to the caller's text,
/// so formatting outside the matched template survives. When normalization
/// shifted the text enough that the cut misses a char boundary, the normalized
/// text is cut instead.
fn cut(original: &str, normalized: &str, head: usize, tail: usize) -> String {
    slice_between(original, head, tail)
        .or_else(|| slice_between(normalized, head, tail))
        .unwrap_or_default()
        .to_string()
}

fn slice_between(text: &str, head: usize, tail: usize) -> Option<&str> {
    let end = text.len().checked_sub(tail)?;
    if head > end {
        return None;
    }
    text.get(head..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_match() {
        assert_eq!(extract_style_text("masterpiece", "dog, masterpiece"), Some("dog".to_string()));
    }

    #[test]
    fn test_suffix_only_prompt() {
        assert_eq!(extract_style_text("masterpiece", "masterpiece"), Some(String::new()));
    }

    #[test]
    fn test_suffix_no_match() {
        assert_eq!(extract_style_text("masterpiece", "masterpiece, dog"), None);
    }

    #[test]
    fn test_placeholder_match() {
        assert_eq!(
            extract_style_text("{prompt}, best quality", "a cat, best quality"),
            Some("a cat".to_string())
        );
        assert_eq!(
            extract_style_text("oil painting of {prompt}, canvas", "oil painting of a dog, canvas"),
            Some("a dog".to_string())
        );
    }

    #[test]
    fn test_placeholder_no_match() {
        assert_eq!(extract_style_text("oil painting of {prompt}", "photo of a dog"), None);
        assert_eq!(extract_style_text("{prompt}, best quality", "a cat, high quality"), None);
    }

    #[test]
    fn test_bare_placeholder_matches_everything() {
        assert_eq!(extract_style_text("{prompt}", "anything"), Some("anything".to_string()));
    }

    #[test]
    fn test_overlapping_placeholder_sides() {
        assert_eq!(extract_style_text("x{prompt}x", "x"), Some(String::new()));
    }

    #[test]
    fn test_empty_template_matches_trivially() {
        assert_eq!(extract_style_text("", "ugly"), Some("ugly".to_string()));
        assert_eq!(extract_style_text("", ""), Some(String::new()));
        assert_eq!(extract_style_text("", "ugly, "), Some("ugly".to_string()));
    }

    #[test]
    fn test_match_uses_normalized_text() {
        // the template has messy spacing, the prompt is clean
        assert_eq!(
            extract_style_text("best   quality", "dog, best quality"),
            Some("dog".to_string())
        );
    }

    #[test]
    fn test_prompt_formatting_outside_match_survives() {
        assert_eq!(
            extract_style_text("masterpiece", "a  apple,   on a table, masterpiece"),
            Some("a  apple,   on a table".to_string())
        );
    }

    #[test]
    fn test_shifted_boundary_falls_back_to_normalized() {
        // "a aé" normalizes to "an aé"; cutting 4 bytes off the original would
        // split the 'é'
        let extracted = extract_style_text("an a{prompt}", "a aé");
        assert_eq!(extracted, Some("é".to_string()));
    }

    #[test]
    fn test_pair_requires_both_sides() {
        let style = PromptStyle::new("Clean", "masterpiece", "lowres");
        assert_eq!(
            extract_style_from_prompts(&style, "dog, masterpiece", "blurry, lowres"),
            Some(("dog".to_string(), "blurry".to_string()))
        );
        assert_eq!(extract_style_from_prompts(&style, "dog, masterpiece", "blurry"), None);
        assert_eq!(extract_style_from_prompts(&style, "dog", "blurry, lowres"), None);
    }

    #[test]
    fn test_pair_with_empty_negative_template() {
        let style = PromptStyle::new("Clean", "masterpiece", "");
        assert_eq!(
            extract_style_from_prompts(&style, "dog, masterpiece", "ugly"),
            Some(("dog".to_string(), "ugly".to_string()))
        );
    }

    #[test]
    fn test_pair_without_templates_never_matches() {
        assert_eq!(extract_style_from_prompts(&PromptStyle::none(), "", ""), None);
        assert_eq!(extract_style_from_prompts(&PromptStyle::divider("STYLES.CSV"), "dog", ""), None);
    }
}
