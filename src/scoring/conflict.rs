use crate::models::Evidence;
use crate::text::tokens;

/// How many tokens apart a negation and a claim keyword may be.
pub const NEGATION_WINDOW: usize = 6;

const NEGATION_MARKERS: &[&str] = &[
    "not", "no", "never", "disputed", "false", "incorrect", "myth", "debunked", "untrue",
    "nicht", "kein", "keine", "keinen", "nie", "niemals", "falsch", "umstritten", "widerlegt",
];

/// Whether an evidence item supports or contradicts the claim it was gathered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stance {
    Supports,
    Contradicts,
}

/// A snippet conflicts when a negation marker sits within
/// [`NEGATION_WINDOW`] tokens of one of the claim's keywords.
pub fn snippet_conflicts(snippet: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let toks = tokens(snippet);
    let negations: Vec<usize> = toks
        .iter()
        .enumerate()
        .filter(|(i, t)| NEGATION_MARKERS.contains(&t.as_str()) && !numbering(&toks, *i))
        .map(|(i, _)| i)
        .collect();
    if negations.is_empty() {
        return false;
    }
    toks.iter().enumerate().any(|(i, t)| {
        keywords.iter().any(|k| k == t)
            && negations.iter().any(|&n| n.abs_diff(i) <= NEGATION_WINDOW)
    })
}

/// "No. 5" is a house number, not a negation.
fn numbering(toks: &[String], at: usize) -> bool {
    toks[at] == "no"
        && toks
            .get(at + 1)
            .is_some_and(|next| next.chars().all(|c| c.is_ascii_digit()))
}

/// Stance of every item; items without a snippet count as support.
pub fn stances(evidence: &[Evidence], keywords: &[String]) -> Vec<Stance> {
    evidence
        .iter()
        .map(|e| match e.snippet.as_deref() {
            Some(s) if snippet_conflicts(s, keywords) => Stance::Contradicts,
            _ => Stance::Supports,
        })
        .collect()
}
