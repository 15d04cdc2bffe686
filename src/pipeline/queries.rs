use crate::pipeline::claims::find_address;
use crate::text::{first_year, keywords, normalize};

pub const MAX_QUERIES: usize = 4;

/// English and German spellings of the same place vocabulary.
const LOCALIZED: &[(&str, &str)] = &[
    ("Vienna", "Wien"),
    ("Austria", "Österreich"),
    ("Hospital", "Spital"),
    ("Street", "Straße"),
    ("Square", "Platz"),
    ("Palace", "Palais"),
    ("Church", "Kirche"),
    ("Cathedral", "Dom"),
    ("district", "Bezirk"),
    ("residence", "Wohnhaus"),
    ("built", "erbaut"),
];

fn localize(text: &str) -> String {
    let mut out = Vec::new();
    for word in text.split_whitespace() {
        let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
        let swapped = LOCALIZED.iter().find_map(|(en, de)| {
            if bare.eq_ignore_ascii_case(en) {
                Some(*de)
            } else if bare.eq_ignore_ascii_case(de) {
                Some(*en)
            } else {
                None
            }
        });
        match swapped {
            Some(s) if !bare.is_empty() => out.push(word.replace(bare, s)),
            _ => out.push(word.to_string()),
        }
    }
    out.join(" ")
}

/// Search queries for one claim, most specific first, at most four.
pub fn build_queries(claim: &str, locality: &str) -> Vec<String> {
    let claim = claim.trim();
    if claim.is_empty() {
        return Vec::new();
    }

    let address = find_address(claim);
    let mut candidates: Vec<String> = vec![keywords(claim).join(" "), claim.to_string()];
    if let Some(address) = &address {
        candidates.push(address.clone());
        if !locality.is_empty() {
            candidates.push(format!("{address} {locality}"));
        }
    }
    candidates.push(localize(claim));
    if let (Some(year), Some(address)) = (first_year(claim), &address) {
        candidates.push(format!("{address} {year}"));
    }

    let mut out: Vec<String> = Vec::new();
    for q in candidates {
        let q = q.trim().to_string();
        if q.is_empty() || out.iter().any(|o| normalize(o) == normalize(&q)) {
            continue;
        }
        out.push(q);
        if out.len() == MAX_QUERIES {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_claim_has_no_queries() {
        assert!(build_queries("  ", "Vienna").is_empty());
    }

    #[test]
    fn address_claims_get_address_queries() {
        let q = build_queries("Ungargasse 5 was completed in 1871", "Vienna");
        assert_eq!(
            q,
            vec![
                "ungargasse completed 1871",
                "Ungargasse 5 was completed in 1871",
                "Ungargasse 5",
                "Ungargasse 5 Vienna",
            ]
        );
    }

    #[test]
    fn queries_are_deduplicated() {
        let q = build_queries("Stephansdom", "");
        assert_eq!(q, vec!["stephansdom"]);
    }

    #[test]
    fn localization_swaps_both_ways() {
        assert_eq!(localize("The Rothschild Hospital in Vienna."), "The Rothschild Spital in Wien.");
        assert_eq!(localize("Das Spital in Wien"), "Das Hospital in Vienna");
        let q = build_queries("The hospital is in Vienna", "Vienna");
        assert!(q.contains(&"The Spital is in Wien".to_string()));
    }
}
