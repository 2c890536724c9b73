//! Offline grammar cleanup. Used when no AI provider is configured.
//!
//! Fixes common speech-to-text slips at word boundaries, capitalizes the first
//! letter and ensures terminal punctuation. Never fails.

use crate::domain::CorrectionError;
use crate::ports::GrammarCorrector;
use crate::usecases::addressing::capitalize_first;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

const REPLACEMENTS: &[(&str, &str)] = &[
    ("im", "I'm"),
    ("i", "I"),
    ("dont", "don't"),
    ("cant", "can't"),
    ("wont", "won't"),
    ("didnt", "didn't"),
    ("doesnt", "doesn't"),
    ("isnt", "isn't"),
    ("arent", "aren't"),
    ("wasnt", "wasn't"),
    ("werent", "weren't"),
    ("youre", "you're"),
    ("theyre", "they're"),
    ("weve", "we've"),
    ("ive", "I've"),
    ("ill", "I'll"),
    ("id", "I'd"),
    ("lets", "let's"),
    ("teh", "the"),
    ("taht", "that"),
    ("wiht", "with"),
    ("tommorow", "tomorrow"),
    ("tommorrow", "tomorrow"),
    ("recieve", "receive"),
    ("definately", "definitely"),
];

static REPLACEMENT_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| REPLACEMENTS.iter().copied().collect());

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = REPLACEMENTS
        .iter()
        .map(|(from, _)| *from)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("replacement regex")
});

/// Rule-based corrector.
#[derive(Debug, Default, Clone)]
pub struct BasicCorrector;

impl BasicCorrector {
    pub fn new() -> Self {
        Self
    }

    pub fn cleanup(text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return collapsed;
        }

        let fixed = WORD_RE.replace_all(&collapsed, |caps: &Captures| {
            let word = &caps[0];
            // Apostrophe-less words that are also real words ("ill", "id", "wont") are
            // only rewritten when the speaker wrote them all lowercase.
            if word.chars().any(char::is_uppercase) {
                return word.to_string();
            }
            REPLACEMENT_MAP
                .get(word)
                .map(|r| r.to_string())
                .unwrap_or_else(|| word.to_string())
        });

        let mut out = capitalize_first(&fixed);
        if !out.ends_with(['.', '!', '?']) {
            out.push('.');
        }
        out
    }
}

#[async_trait::async_trait]
impl GrammarCorrector for BasicCorrector {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        Ok(Self::cleanup(text))
    }

    fn provider(&self) -> &str {
        "basic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_and_period() {
        assert_eq!(BasicCorrector::cleanup("the project is ready"), "The project is ready.");
        assert_eq!(BasicCorrector::cleanup("are you coming?"), "Are you coming?");
    }

    #[test]
    fn test_word_fixes() {
        assert_eq!(
            BasicCorrector::cleanup("hey can you send me teh files tommorow"),
            "Hey can you send me the files tomorrow."
        );
        assert_eq!(
            BasicCorrector::cleanup("i think im late and i dont know why"),
            "I think I'm late and I don't know why."
        );
    }

    #[test]
    fn test_no_replacement_inside_words() {
        assert_eq!(BasicCorrector::cleanup("time is tight"), "Time is tight.");
        assert_eq!(BasicCorrector::cleanup("the idea is ideal"), "The idea is ideal.");
    }

    #[test]
    fn test_whitespace_and_empty() {
        assert_eq!(BasicCorrector::cleanup("  lunch   at noon  "), "Lunch at noon.");
        assert_eq!(BasicCorrector::cleanup("   "), "");
    }

    #[tokio::test]
    async fn test_port_never_fails() {
        let c = BasicCorrector::new();
        assert_eq!(c.correct("ok").await.unwrap(), "Ok.");
        assert_eq!(c.provider(), "basic");
    }
}
