//! Pure field-extraction functions over free text.
//!
//! Each pattern is an isolated function so it can be tested exhaustively
//! without touching orchestration control flow. Regexes are compiled once.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    // Digit groups optionally separated by spaces, dots, dashes or parens,
    // with an optional country prefix.
    Regex::new(r"\+?\d{1,3}[\s.\-]?\(?\d{2,4}\)?[\s.\-]?\d{3}[\s.\-]?\d{2,4}(?:[\s.\-]?\d{2,4})?")
        .expect("phone regex")
});

static NAMED_RE: Lazy<Regex> = Lazy::new(|| {
    // Trigger phrases introducing a person name, followed by capitalized tokens.
    Regex::new(r"(?i:named|called|name\s+is|for)\s+([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+){0,3})")
        .expect("name trigger regex")
});

static CAPITALIZED_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][a-z'\-]+)\s+([A-Z][a-z'\-]+)\b").expect("capitalized pair regex")
});

static COMPANY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i:company\s+(?:name\s+)?(?:is\s+)?|works?\s+at\s+|from\s+|at\s+)([A-Z][\w&.\-]*(?:\s+[A-Z][\w&.\-]*){0,3})",
    )
    .expect("company regex")
});

static NUMERIC_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:#|\bid\s*)(\d+)\b").expect("numeric id regex")
});

/// Command verbs and filler words that look like name candidates when they
/// happen to be capitalized.
const NAME_STOPLIST: &[&str] = &[
    "show", "find", "get", "view", "search", "look", "who", "is", "tell", "me", "about", "the",
    "are", "have", "create", "add", "new", "make", "register", "update", "edit", "change",
    "delete", "remove", "list", "all", "my", "please", "client", "customer", "contact", "with",
    "email", "phone", "number", "company", "named", "called", "name", "for", "a", "an", "and",
];

/// Extracts the first well-formed email address, verbatim.
pub fn email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

/// Extracts the first phone-like digit group sequence.
///
/// Requires at least seven digits overall so bare ids and short numbers
/// don't match.
pub fn phone(text: &str) -> Option<String> {
    // Mask emails first; "john2@host42.com" must not yield digits.
    let masked = EMAIL_RE.replace_all(text, " ");
    PHONE_RE
        .find(&masked)
        .map(|m| m.as_str().trim().to_string())
        .filter(|candidate| candidate.chars().filter(char::is_ascii_digit).count() >= 7)
}

/// Extracts an explicit numeric record identifier ("#42", "id 42").
pub fn numeric_id(text: &str) -> Option<u64> {
    NUMERIC_ID_RE
        .captures(&text.to_lowercase())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extracts a company name introduced by a company phrase.
pub fn company(text: &str) -> Option<String> {
    let candidate = COMPANY_RE.captures(text)?.get(1)?.as_str();
    let kept: Vec<&str> = candidate
        .split_whitespace()
        .filter(|token| !is_stoplisted(token))
        .collect();
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(" "))
}

/// Extracts a person name from the message.
///
/// Prefers an explicit trigger phrase ("named John Smith"); otherwise falls
/// back to the first adjacent pair of capitalized words that survives the
/// command-verb stoplist. Returns the raw candidate before splitting.
pub fn person_name(text: &str) -> Option<String> {
    let without_email = EMAIL_RE.replace_all(text, " ");

    if let Some(caps) = NAMED_RE.captures(&without_email) {
        let kept: Vec<&str> = caps
            .get(1)?
            .as_str()
            .split_whitespace()
            .filter(|token| !is_stoplisted(token))
            .collect();
        if !kept.is_empty() {
            return Some(kept.join(" "));
        }
    }

    for caps in CAPITALIZED_PAIR_RE.captures_iter(&without_email) {
        let first = caps.get(1)?.as_str();
        let second = caps.get(2)?.as_str();
        if !is_stoplisted(first) && !is_stoplisted(second) {
            return Some(format!("{} {}", first, second));
        }
    }

    None
}

/// Splits a raw name candidate on whitespace: first token becomes the first
/// name; remaining tokens, if any, join into the last name.
pub fn split_name(candidate: &str) -> (String, Option<String>) {
    let mut tokens = candidate.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = tokens.collect();
    if rest.is_empty() {
        (first, None)
    } else {
        (first, Some(rest.join(" ")))
    }
}

fn is_stoplisted(token: &str) -> bool {
    let lowered = token.to_lowercase();
    NAME_STOPLIST.contains(&lowered.as_str())
}
