//! Prompt tidying used when comparing templates against prompts

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// A standalone `a`/`A` and the whitespace after it; the vowel is checked separately
/// so that "a a apple" is fixed in a single pass
static ARTICLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[Aa]\s+").expect("valid article regex"));

static MULTIPLE_COMMAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:,+\s+)+,*").expect("valid comma regex"));

static MULTIPLE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid space regex"));

const VOWELS: &str = "AEIOUaeiou";

/// Tidy prompt text: "a apple" -> "an apple", comma runs -> ", ", whitespace runs -> " "
pub fn normalize(text: &str) -> String {
    let text = fix_articles(text);
    let text = MULTIPLE_COMMAS.replace_all(&text, ", ");
    MULTIPLE_SPACES.replace_all(&text, " ").into_owned()
}

fn fix_articles(text: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut last = 0;

    for m in ARTICLE.find_iter(text) {
        let before_vowel = text[m.end()..].chars().next().is_some_and(|c| VOWELS.contains(c));
        if !before_vowel {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        // the match starts with the ASCII article, so one byte is one char
        out.push_str(&text[m.start()..m.start() + 1]);
        out.push_str("n ");
        last = m.end();
    }

    if last == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}
