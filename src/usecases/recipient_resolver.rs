//! Recipient inference: who is this utterance addressed to?
//!
//! Order of matching:
//! 1. Explicit selection (always wins, no inference)
//! 2. `@username` token (contact with that handle, else the raw handle)
//! 3. Naming pattern ("send to NAME") naming a contact exactly by name, handle or alias
//! 4. Any contact whose name or alias occurs in the text
//! 5. Only when no contact is mentioned: role words ("tell my boss"), fuzzy
//!    match of the named word (dictation misspellings), then a phone number
//!
//! Ties always go to the earliest contact in directory order. The text is never
//! modified here; stripping the addressing prefix is `addressing`'s job.

use crate::domain::{Contact, ContactRole, MIN_PHONE_DIGITS, Recipient};
use regex::Regex;
use std::sync::LazyLock;
use strsim::jaro_winkler;
use tracing::debug;

/// Default threshold for fuzzy name matching (0.0 - 1.0).
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w@])@(\w{2,})").expect("handle regex"));

static NAMING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:send|message|tell|text|msg|ping)\b(?:\s+(?:a\s+)?(?:message|msg|text)\b)?(?:\s+to\b)?(?:\s+my\b)?\s+(@?\+?\w[\w.+-]*)",
    )
    .expect("naming regex")
});

/// Words that follow "send"/"tell" but never name a person.
const NOT_A_NAME: &[&str] = &[
    "a", "an", "the", "me", "us", "you", "him", "her", "them", "it", "this", "that", "saying",
    "message", "everyone", "all", "again",
];

/// Output of recipient resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// `None` means "recipient still required", not an error.
    pub recipient: Option<Recipient>,
    /// The utterance exactly as given.
    pub remainder_text: String,
}

/// Infers the intended recipient of an utterance from the contact directory.
#[derive(Debug, Clone)]
pub struct RecipientResolver {
    fuzzy_threshold: f64,
}

impl Default for RecipientResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipientResolver {
    pub fn new() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    pub fn with_fuzzy_threshold(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }

    pub fn resolve(
        &self,
        raw_text: &str,
        explicit_contact: Option<&Contact>,
        directory: &[Contact],
    ) -> Resolution {
        let recipient = match explicit_contact {
            Some(c) => Some(Recipient::Contact(c.clone())),
            None => self.infer(raw_text, directory),
        };
        Resolution {
            recipient,
            remainder_text: raw_text.to_string(),
        }
    }

    fn infer(&self, text: &str, directory: &[Contact]) -> Option<Recipient> {
        if let Some(caps) = HANDLE_RE.captures(text) {
            let username = &caps[1];
            let contact = directory
                .iter()
                .find(|c| handle_key(&c.handle) == username.to_lowercase());
            debug!(username, known = contact.is_some(), "explicit @handle in text");
            return Some(match contact {
                Some(c) => Recipient::Contact(c.clone()),
                None => Recipient::Handle(format!("@{}", username)),
            });
        }

        let candidates: Vec<&str> = NAMING_RE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end_matches(['.', ',']))
            .filter(|c| !NOT_A_NAME.contains(&c.to_lowercase().as_str()))
            .collect();

        for candidate in &candidates {
            let cand = candidate.trim_start_matches('@').to_lowercase();
            if let Some(c) = directory.iter().find(|c| names_exactly(c, &cand)) {
                debug!(candidate, contact = %c.id, "recipient from naming pattern");
                return Some(Recipient::Contact(c.clone()));
            }
        }

        let lower = text.to_lowercase();
        if let Some(c) = directory.iter().find(|c| mentions(&lower, c)) {
            debug!(contact = %c.id, "recipient from name mention");
            return Some(Recipient::Contact(c.clone()));
        }

        for candidate in &candidates {
            if let Some(c) = self.match_loosely(candidate, directory) {
                debug!(candidate, contact = %c.id, "recipient from role or fuzzy match");
                return Some(Recipient::Contact(c.clone()));
            }
            if looks_like_phone(candidate) {
                return Some(Recipient::Handle(candidate.to_string()));
            }
        }
        None
    }

    /// Match one spoken word by role, then fuzzily by name. Exact names are handled earlier.
    fn match_loosely<'a>(&self, candidate: &str, directory: &'a [Contact]) -> Option<&'a Contact> {
        let cand = candidate.trim_start_matches('@').to_lowercase();
        if cand.is_empty() {
            return None;
        }

        if let Some(role) = ContactRole::from_spoken(&cand) {
            if let Some(c) = directory.iter().find(|c| c.role == role) {
                return Some(c);
            }
        }

        if cand.chars().count() < 3 {
            return None;
        }
        let mut best: Option<(&Contact, f64)> = None;
        for contact in directory {
            let score = name_words(contact)
                .map(|w| jaro_winkler(&cand, &w))
                .fold(0.0, f64::max);
            if score >= self.fuzzy_threshold && best.is_none_or(|(_, s)| score > s) {
                best = Some((contact, score));
            }
        }
        best.map(|(c, _)| c)
    }
}

/// Exact (case-insensitive) match on full name, any name word, handle, or alias.
fn names_exactly(contact: &Contact, cand: &str) -> bool {
    contact.display_name.to_lowercase() == cand
        || name_words(contact).any(|w| w == cand)
        || handle_key(&contact.handle) == cand
        || contact.aliases.iter().any(|a| a.to_lowercase() == cand)
}

fn name_words(contact: &Contact) -> impl Iterator<Item = String> + '_ {
    contact
        .display_name
        .split_whitespace()
        .chain(contact.aliases.iter().flat_map(|a| a.split_whitespace()))
        .map(str::to_lowercase)
}

/// Whether the lowercased text contains the contact's name or one of its aliases.
fn mentions(lower_text: &str, contact: &Contact) -> bool {
    let name = contact.display_name.trim().to_lowercase();
    (!name.is_empty() && lower_text.contains(&name))
        || contact
            .aliases
            .iter()
            .map(|a| a.trim().to_lowercase())
            .any(|a| !a.is_empty() && lower_text.contains(&a))
}

fn handle_key(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

fn looks_like_phone(s: &str) -> bool {
    s.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_PHONE_DIGITS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str, name: &str, handle: &str, role: ContactRole) -> Contact {
        Contact {
            id: id.into(),
            display_name: name.into(),
            handle: handle.into(),
            role,
            aliases: vec![],
            notes: String::new(),
        }
    }

    fn directory() -> Vec<Contact> {
        vec![
            contact("imran", "Imran", "@imran", ContactRole::Colleague),
            contact("rahul", "Rahul Verma", "@rahulv", ContactRole::Friend),
            contact("sara", "Sara", "+14155551234", ContactRole::Boss),
        ]
    }

    fn resolved_id(r: &Resolution) -> Option<&str> {
        match &r.recipient {
            Some(Recipient::Contact(c)) => Some(c.id.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_send_to_name_pattern() {
        let dir = vec![contact("1", "Imran", "@imran", ContactRole::Colleague)];
        let r = RecipientResolver::new().resolve(
            "send to Imran saying the project is ready",
            None,
            &dir,
        );
        assert_eq!(resolved_id(&r), Some("1"));
        assert_eq!(r.remainder_text, "send to Imran saying the project is ready");
    }

    #[test]
    fn test_explicit_contact_wins() {
        let dir = directory();
        let explicit = dir[1].clone();
        let r = RecipientResolver::new().resolve("tell Imran I'm late", Some(&explicit), &dir);
        assert_eq!(resolved_id(&r), Some("rahul"));
        assert_eq!(r.remainder_text, "tell Imran I'm late");
    }

    #[test]
    fn test_explicit_contact_wins_with_empty_directory() {
        let explicit = contact("x", "Xavier", "@x", ContactRole::Other);
        let r = RecipientResolver::new().resolve("", Some(&explicit), &[]);
        assert_eq!(resolved_id(&r), Some("x"));
    }

    #[test]
    fn test_name_word_and_case_insensitive() {
        let r = RecipientResolver::new().resolve(
            "send message to rahul saying hey can you send me the files",
            None,
            &directory(),
        );
        assert_eq!(resolved_id(&r), Some("rahul"));
    }

    #[test]
    fn test_role_word() {
        let r = RecipientResolver::new().resolve(
            "tell my boss that the meeting went well",
            None,
            &directory(),
        );
        assert_eq!(resolved_id(&r), Some("sara"));
    }

    #[test]
    fn test_unknown_at_handle_is_raw_handle() {
        let r = RecipientResolver::new().resolve(
            "message @priya_designs the mockups look great",
            None,
            &directory(),
        );
        assert_eq!(
            r.recipient,
            Some(Recipient::Handle("@priya_designs".into()))
        );
    }

    #[test]
    fn test_known_at_handle_is_contact() {
        let r = RecipientResolver::new().resolve("ping @RahulV about lunch", None, &directory());
        assert_eq!(resolved_id(&r), Some("rahul"));
    }

    #[test]
    fn test_email_is_not_a_handle() {
        let r = RecipientResolver::new().resolve("mail me at bob@example.com", None, &directory());
        assert_eq!(r.recipient, None);
    }

    #[test]
    fn test_fuzzy_misspelling() {
        let r = RecipientResolver::new().resolve("tell imraan I will call", None, &directory());
        assert_eq!(resolved_id(&r), Some("imran"));
    }

    #[test]
    fn test_mention_without_pattern() {
        let r = RecipientResolver::new().resolve(
            "the report for Imran is done",
            None,
            &directory(),
        );
        assert_eq!(resolved_id(&r), Some("imran"));
    }

    #[test]
    fn test_alias_mention() {
        let mut dir = directory();
        dir[2].aliases = vec!["the chief".into()];
        let r = RecipientResolver::new().resolve("remind the chief about friday", None, &dir);
        assert_eq!(resolved_id(&r), Some("sara"));
    }

    #[test]
    fn test_ties_go_to_first_in_directory() {
        let dir = vec![
            contact("a", "Alex", "@alex1", ContactRole::Other),
            contact("b", "Alex", "@alex2", ContactRole::Other),
        ];
        let r = RecipientResolver::new().resolve("send to alex hello", None, &dir);
        assert_eq!(resolved_id(&r), Some("a"));
    }

    #[test]
    fn test_no_match_is_unresolved() {
        let r = RecipientResolver::new().resolve("send me the files", None, &directory());
        assert_eq!(r.recipient, None);
        let r = RecipientResolver::new().resolve("hello there", None, &[]);
        assert_eq!(r.recipient, None);
    }

    #[test]
    fn test_phone_number_candidate() {
        let r = RecipientResolver::new().resolve("text +1 5551234567 hi", None, &[]);
        assert_eq!(r.recipient, None);
        let r = RecipientResolver::new().resolve("text +15551234567 running late", None, &[]);
        assert_eq!(r.recipient, Some(Recipient::Handle("+15551234567".into())));
    }

    #[test]
    fn test_any_text_containing_name_resolves() {
        let dir = directory();
        let resolver = RecipientResolver::new();
        for text in [
            "Imran",
            "ok imran",
            "xx IMRAN yy",
            "can you tell the team (and Imran) about it",
        ] {
            let r = resolver.resolve(text, None, &dir);
            assert_eq!(resolved_id(&r), Some("imran"), "text: {}", text);
        }
    }

    #[test]
    fn test_mentioned_name_beats_role_word() {
        let dir = vec![
            contact("imran", "Imran", "@imran", ContactRole::Colleague),
            contact("sara", "Sara", "@sara", ContactRole::Boss),
        ];
        let r = RecipientResolver::new().resolve(
            "tell my boss that Imran finished the deck",
            None,
            &dir,
        );
        assert_eq!(resolved_id(&r), Some("imran"));
    }

    #[test]
    fn test_mentioned_name_beats_phone_candidate() {
        let r = RecipientResolver::new().resolve(
            "text +15551234567 that Imran is here",
            None,
            &directory(),
        );
        assert_eq!(resolved_id(&r), Some("imran"));
    }

    #[test]
    fn test_exact_naming_beats_earlier_mention() {
        // Both names occur; the one after "send to" is the recipient.
        let r = RecipientResolver::new().resolve(
            "send to Sara that Imran is out today",
            None,
            &directory(),
        );
        assert_eq!(resolved_id(&r), Some("sara"));
    }

    #[test]
    fn test_short_phone_number_candidate() {
        let r = RecipientResolver::new().resolve("text 5551234 I'm outside", None, &[]);
        assert_eq!(r.recipient, Some(Recipient::Handle("5551234".into())));
        let r = RecipientResolver::new().resolve("text 555123 I'm outside", None, &[]);
        assert_eq!(r.recipient, None);
    }

    #[test]
    fn test_fuzzy_threshold_is_configurable() {
        let strict = RecipientResolver::with_fuzzy_threshold(0.99);
        let r = strict.resolve("tell imraan I will call", None, &directory());
        assert_eq!(r.recipient, None);
        let loose = RecipientResolver::with_fuzzy_threshold(0.8);
        let r = loose.resolve("tell imraan I will call", None, &directory());
        assert_eq!(resolved_id(&r), Some("imran"));
    }
}
