use crate::models::Evidence;
use crate::text::trim_words;
use std::collections::HashMap;
use url::Url;

pub const SNIPPET_MAX_WORDS: usize = 25;

/// Dedup key: lowercased host without `www.` plus the path without a trailing
/// slash. Anything that does not parse keys on the raw string.
pub fn canonical_key(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                let host = host.strip_prefix("www.").unwrap_or(&host);
                let path = parsed.path().trim_end_matches('/');
                format!("{host}{path}")
            }
            None => url.trim().to_string(),
        },
        Err(_) => url.trim().to_string(),
    }
}

/// Collapses duplicates and trims snippets.
///
/// Output order follows the first occurrence of each key. On a collision the
/// higher-quality item survives (first seen on ties) and picks up any optional
/// field only the other one had.
pub fn merge(evidence: &[Evidence]) -> Vec<Evidence> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Evidence> = Vec::with_capacity(evidence.len());

    for item in evidence {
        let key = canonical_key(&item.url);
        match slots.get(&key) {
            Some(&idx) => {
                let existing = &mut out[idx];
                if item.source_quality > existing.source_quality {
                    let mut winner = item.clone();
                    fill_missing(&mut winner, existing);
                    *existing = winner;
                } else {
                    fill_missing(existing, item);
                }
            }
            None => {
                slots.insert(key, out.len());
                out.push(item.clone());
            }
        }
    }

    for item in &mut out {
        item.snippet = item
            .snippet
            .as_deref()
            .map(|s| trim_words(s, SNIPPET_MAX_WORDS))
            .filter(|s| !s.is_empty());
    }
    out
}

fn fill_missing(target: &mut Evidence, other: &Evidence) {
    if target.snippet.is_none() {
        target.snippet = other.snippet.clone();
    }
    if target.publish_date.is_none() {
        target.publish_date = other.publish_date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceQuality;
    use chrono::NaiveDate;

    fn ev(url: &str) -> Evidence {
        Evidence::observe("t", url, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn key_ignores_www_trailing_slash_and_query() {
        assert_eq!(
            canonical_key("https://www.Example.org/a/b/?x=1"),
            canonical_key("http://example.org/a/b")
        );
        assert_eq!(canonical_key("garbage"), "garbage");
    }

    #[test]
    fn keeps_higher_quality_and_unions_fields() {
        let mut low = ev("https://example.org/page");
        low.source_quality = SourceQuality::Low;
        low.snippet = Some("from the low copy".into());
        let mut high = ev("https://www.example.org/page/");
        high.source_quality = SourceQuality::High;
        high.publish_date = NaiveDate::from_ymd_opt(2020, 2, 2);

        let merged = merge(&[low, high]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source_quality, SourceQuality::High);
        assert_eq!(merged[0].snippet.as_deref(), Some("from the low copy"));
        assert_eq!(merged[0].publish_date, NaiveDate::from_ymd_opt(2020, 2, 2));
    }

    #[test]
    fn ties_keep_first_seen() {
        let mut a = ev("https://example.org/x");
        a.title = "first".into();
        let mut b = ev("https://example.org/x");
        b.title = "second".into();
        let merged = merge(&[a, b]);
        assert_eq!(merged[0].title, "first");
    }

    #[test]
    fn trims_snippets_to_cap() {
        let mut a = ev("https://example.org/long");
        a.snippet = Some("word ".repeat(40));
        let merged = merge(&[a]);
        let snippet = merged[0].snippet.clone().unwrap();
        assert_eq!(snippet.split_whitespace().count(), SNIPPET_MAX_WORDS);
        assert_eq!(merge(&merged), merged);
    }
}
