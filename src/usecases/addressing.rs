//! Addressing formatter. Removes "send to NAME saying" style prefixes from a
//! corrected message once its recipient is known.
//!
//! Kept apart from resolution and correction so each stage stays composable.

use crate::domain::Recipient;
use regex::Regex;

/// Remove the addressing prefix and a leading greeting aimed at the recipient.
///
/// Returns `text` unchanged when stripping would leave nothing.
pub fn strip_addressing(text: &str, recipient: &Recipient) -> String {
    let names = addressable_names(recipient);
    if names.is_empty() {
        return text.to_string();
    }
    let alternation = names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");

    let prefix = format!(
        r"(?i)^\s*(?:send|message|tell|text|msg|ping)\s+(?:(?:a\s+)?(?:message|msg|text)\s+)?(?:to\s+)?(?:my\s+)?@?(?:{})\b[\s,:]*(?:that|saying|says)?[\s,:]*",
        alternation
    );
    let greeting = format!(r"(?i)^\s*(?:hey|hi|hello)\s+@?(?:{})\b[\s,!:]*", alternation);

    let mut out = text.to_string();
    for pattern in [prefix, greeting] {
        match Regex::new(&pattern) {
            Ok(re) => out = re.replacen(&out, 1, "").into_owned(),
            Err(_) => return text.to_string(),
        }
    }

    let out = out.trim();
    if out.is_empty() {
        return text.to_string();
    }
    capitalize_first(out)
}

/// Names the user might have spoken for this recipient, longest first.
fn addressable_names(recipient: &Recipient) -> Vec<String> {
    let mut names: Vec<String> = match recipient {
        Recipient::Contact(c) => {
            let mut v = vec![c.display_name.trim().to_string()];
            v.extend(c.display_name.split_whitespace().map(String::from));
            v.extend(c.aliases.iter().map(|a| a.trim().to_string()));
            v.push(c.handle.trim().trim_start_matches('@').to_string());
            v.push(c.role.to_string());
            v
        }
        Recipient::Handle(h) => vec![h.trim().trim_start_matches('@').to_string()],
    };
    names.retain(|n| !n.is_empty());
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    names.dedup();
    names
}

pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Contact, ContactRole};

    fn imran() -> Recipient {
        Recipient::Contact(Contact {
            id: "imran_khan".into(),
            display_name: "Imran Khan".into(),
            handle: "@imran".into(),
            role: ContactRole::Colleague,
            aliases: vec![],
            notes: String::new(),
        })
    }

    #[test]
    fn test_strips_send_to_saying() {
        assert_eq!(
            strip_addressing("Send to Imran saying the project is ready.", &imran()),
            "The project is ready."
        );
    }

    #[test]
    fn test_strips_full_name_and_message_to() {
        assert_eq!(
            strip_addressing("send a message to Imran Khan: lunch at noon?", &imran()),
            "Lunch at noon?"
        );
    }

    #[test]
    fn test_strips_role_and_greeting() {
        let boss = Recipient::Contact(Contact {
            id: "sara".into(),
            display_name: "Sara".into(),
            handle: "@sara".into(),
            role: ContactRole::Boss,
            aliases: vec![],
            notes: String::new(),
        });
        assert_eq!(
            strip_addressing("Tell my boss that we closed the deal.", &boss),
            "We closed the deal."
        );
        assert_eq!(
            strip_addressing("Hi Sara, the deck is attached.", &boss),
            "The deck is attached."
        );
    }

    #[test]
    fn test_raw_handle() {
        let r = Recipient::Handle("@priya_designs".into());
        assert_eq!(
            strip_addressing("message @priya_designs the mockups look great", &r),
            "The mockups look great"
        );
    }

    #[test]
    fn test_leaves_unaddressed_text_alone() {
        assert_eq!(
            strip_addressing("The project is ready.", &imran()),
            "The project is ready."
        );
        // Name in the middle is content, not addressing.
        assert_eq!(
            strip_addressing("Did Imran send the files?", &imran()),
            "Did Imran send the files?"
        );
    }

    #[test]
    fn test_never_returns_empty() {
        assert_eq!(strip_addressing("send to Imran", &imran()), "send to Imran");
    }
}
