//! Text normalization for roles and skill names.
//!
//! Both roles and skill names go through [`normalize_text`]. Roles additionally
//! drop seniority and title qualifiers ("senior", "engineer", ...) so that
//! "Senior MERN Stack Developer" and "MERN Stack Lead" land on the same key.

use std::sync::LazyLock;

use regex::Regex;

/// Title qualifiers that carry no signal for skill matching.
pub const NOISE_WORDS: &[&str] = &[
    "senior",
    "junior",
    "lead",
    "engineer",
    "developer",
    "software",
    "staff",
    "principal",
    "associate",
    "intern",
    "trainee",
    "specialist",
    "consultant",
    "analyst",
    "architect",
    "manager",
    "head",
    "chief",
    "vp",
    "director",
];

// Keeps tokens like "c#", "c++" and "node.js" intact.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s\-\+#\.]").expect("static regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Lowercase, replace disallowed characters with spaces, collapse whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lowered = text.trim().to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, " ");
    collapse_whitespace(&cleaned)
}

/// Drop noise words; if that would leave nothing, return the input unchanged.
#[must_use]
pub fn remove_noise_words(text: &str) -> String {
    let kept: Vec<&str> = text
        .split_whitespace()
        .filter(|word| !is_noise_word(word))
        .collect();
    if kept.is_empty() {
        return text.to_string();
    }
    kept.join(" ")
}

/// Full role pipeline: [`normalize_text`], noise-word removal, final cleanup.
///
/// ```
/// use skill_suggest::search::normalize_role;
///
/// assert_eq!(normalize_role("Senior MERN Stack Developer"), "mern stack");
/// assert_eq!(normalize_role("Lead Engineer"), "lead engineer");
/// ```
#[must_use]
pub fn normalize_role(role: &str) -> String {
    let normalized = normalize_text(role);
    if normalized.is_empty() {
        return normalized;
    }
    collapse_whitespace(&remove_noise_words(&normalized))
}

/// Skill names keep every word; only the character-level cleanup applies.
#[must_use]
pub fn normalize_skill_name(name: &str) -> String {
    normalize_text(name)
}

/// Lightweight fallback used when the full pipeline yields nothing.
#[must_use]
pub fn light_normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// [`normalize_role`] with the [`light_normalize`] fallback applied.
#[must_use]
pub fn role_key(role: &str) -> String {
    let normalized = normalize_role(role);
    if normalized.is_empty() {
        light_normalize(role)
    } else {
        normalized
    }
}

fn is_noise_word(word: &str) -> bool {
    NOISE_WORDS.contains(&word)
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
