//! Small text helpers shared by the scoring and pipeline modules.

pub const ELLIPSIS: &str = "…";

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "among", "been", "before", "being", "between", "both", "during",
    "each", "from", "have", "here", "into", "its", "more", "most", "much", "only", "other",
    "over", "same", "since", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "until", "upon", "very", "were",
    "what", "when", "where", "which", "while", "with", "within", "would", "aber", "auch",
    "bereits", "dass", "diese", "dieser", "dieses", "eine", "einem", "einen", "einer", "eines",
    "für", "hatte", "nach", "noch", "oder", "sein", "seine", "sich", "sind", "und", "unter",
    "vom", "von", "war", "waren", "wird", "wurde", "wurden", "zum", "zur",
];

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Caps `text` at `max_words`, ending with an ellipsis when anything was cut.
/// Text already within the cap comes back trimmed but otherwise untouched.
pub fn trim_words(text: &str, max_words: usize) -> String {
    let trimmed = text.trim();
    if word_count(trimmed) <= max_words {
        return trimmed.to_string();
    }
    let mut words: Vec<&str> = trimmed.split_whitespace().take(max_words).collect();
    if let Some(last) = words.last_mut() {
        *last = last.trim_end_matches(|c: char| matches!(c, ',' | ';' | ':' | '.' | '-'));
    }
    let mut out = words.join(" ");
    out.push_str(ELLIPSIS);
    out
}

/// Lowercased, whitespace-collapsed form used for equality checks.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ',' | ';'))
        .to_string()
}

/// Lowercased alphanumeric tokens.
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Content words worth searching for or matching against: longer words that
/// are not stopwords, plus numbers of three or more digits (years, etc).
pub fn keywords(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokens(text) {
        let numeric = token.chars().all(|c| c.is_ascii_digit());
        let keep = if numeric {
            token.len() >= 3
        } else {
            token.chars().count() >= 4 && !STOPWORDS.contains(&token.as_str())
        };
        if keep && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// First standalone four-digit year between 1000 and 2999.
pub fn first_year(text: &str) -> Option<String> {
    tokens(text).into_iter().find(|t| {
        t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()) && (t.starts_with('1') || t.starts_with('2'))
    })
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_words_caps_and_marks() {
        let long = (1..=30).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let out = trim_words(&long, 25);
        assert_eq!(word_count(&out), 25);
        assert!(out.ends_with(ELLIPSIS));
        assert_eq!(trim_words(&out, 25), out);
    }

    #[test]
    fn trim_words_leaves_short_text() {
        assert_eq!(trim_words("  two words ", 25), "two words");
    }

    #[test]
    fn keywords_skip_stopwords_and_short_tokens() {
        let kw = keywords("Ungargasse 5 was completed in 1871 and served as the Rothschild Hospital");
        assert_eq!(
            kw,
            vec!["ungargasse", "completed", "1871", "served", "rothschild", "hospital"]
        );
    }

    #[test]
    fn finds_year() {
        assert_eq!(first_year("built ~1872..1875").as_deref(), Some("1872"));
        assert_eq!(first_year("Ungargasse 5"), None);
    }
}
