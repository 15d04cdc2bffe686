//! Claim extraction: narrative paragraph in, atomic self-contained claims out.
//!
//! Sentences are cut into clause fragments. Two anchors roll forward through
//! the text: the last explicit subject and the last street address. Fragments
//! without a subject borrow the anchor subject, pronouns are replaced, and a
//! bare "there" becomes "at <address>".

use crate::config::PipelineConfig;
use crate::text::normalize;
use regex::Regex;
use std::sync::OnceLock;

const PREDICATES: &[&str] = &[
    "is", "was", "were", "are", "served", "serves", "lived", "lives", "built", "completed",
    "designed", "housed", "houses", "became", "becomes", "has", "had", "opened", "closed",
    "founded", "stands", "stood", "died", "born", "wrote", "composed", "moved", "worked",
    "remains", "remained", "hosted", "hosts", "contains", "contained", "belonged", "belongs",
    "operated", "received", "replaced", "war", "ist", "wurde", "lebte", "diente", "beherbergte",
];

/// Abbreviations whose period never ends a sentence.
const ABBREVIATIONS: &[&str] = &["st", "dr", "mr", "mrs", "ms", "prof", "nr", "ca", "bzw", "hl"];

const IT_PRONOUNS: &[&str] = &["it", "this", "es", "dies"];

const PERSON_PRONOUNS: &[&str] = &["he", "she", "they", "er", "sie"];

const ADDRESS_PATTERN: &str = r"(?:[\p{L}\-]+(?:gasse|straße|strasse|platz|weg|ring|allee|kai|gürtel|zeile|markt|damm|ufer|steig)|[\p{Lu}][\p{L}\-]*\s+(?:Street|Road|Avenue|Lane|Square|Place|Boulevard))\s+\d{1,4}[a-z]?";

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"\b({ADDRESS_PATTERN})\b")).expect("static regex"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s*(?:;|,\s*(?:and|but|while|whereas|und|aber)\s+|,|\s+(?:and|but|while|whereas|und|aber)\s+)\s*")
            .expect("static regex")
    })
}

fn there_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bthere\b").expect("static regex"))
}

fn year_template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<x>.+?) was (?P<verb>completed|finished|built|constructed|erected) in (?P<y>\d{4})\b")
            .expect("static regex")
    })
}

fn served_as_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<x>.+?) (?:served|serves) as (?:(?i:the|a|an) )?(?P<y>.+)$")
            .expect("static regex")
    })
}

fn designed_by_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<x>.+?) was designed by (?P<y>.+)$").expect("static regex"))
}

fn lived_at_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^(?P<x>.+?) lived at (?P<a>{ADDRESS_PATTERN})\b")).expect("static regex")
    })
}

/// Most recent street address in `text`, e.g. `Ungargasse 5`.
pub fn find_address(text: &str) -> Option<String> {
    address_re()
        .find_iter(text)
        .last()
        .map(|m| m.as_str().to_string())
}

#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    pub claims: Vec<String>,
    /// Claims appended only to reach the configured floor.
    pub padded: usize,
}

#[derive(Clone, Debug)]
pub struct ClaimExtractor {
    pub max_claims: usize,
    pub floor: Option<usize>,
    pub locality: String,
}

impl Default for ClaimExtractor {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

#[derive(Default)]
struct Anchors {
    subject: Option<String>,
    person: Option<String>,
    address: Option<String>,
}

impl ClaimExtractor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_claims: config.max_claims.max(1),
            floor: config.claim_floor,
            locality: config.locality.clone(),
        }
    }

    pub fn extract(&self, paragraph: &str) -> Vec<String> {
        self.extract_detailed(paragraph).claims
    }

    pub fn extract_detailed(&self, paragraph: &str) -> Extraction {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            return Extraction {
                claims: Vec::new(),
                padded: 0,
            };
        }

        let mut anchors = Anchors::default();
        let mut claims: Vec<String> = Vec::new();

        for sentence in sentences(paragraph) {
            for fragment in fragments(&sentence) {
                let claim = resolve_fragment(&fragment, &mut anchors);
                if claim.is_empty() {
                    continue;
                }
                let derived = derive(&claim, anchors.address.as_deref());
                push_unique(&mut claims, claim);
                for d in derived {
                    push_unique(&mut claims, d);
                }
            }
        }

        if claims.is_empty() {
            claims.push(paragraph.to_string());
        }

        let before = claims.len();
        if let (Some(floor), Some(address)) = (self.floor, anchors.address.as_deref()) {
            if claims.len() < floor {
                push_unique(&mut claims, format!("{address} is located in {}", self.locality));
            }
        }
        let padded = claims.len() - before;

        claims.truncate(self.max_claims);
        Extraction { claims, padded }
    }
}

/// `extractClaims` with default settings.
pub fn extract_claims(paragraph: &str) -> Vec<String> {
    ClaimExtractor::default().extract(paragraph)
}

fn push_unique(claims: &mut Vec<String>, claim: String) {
    let key = normalize(&claim);
    if key.is_empty() || claims.iter().any(|c| normalize(c) == key) {
        return;
    }
    claims.push(claim);
}

fn sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            flush(&mut out, &mut current);
            continue;
        }
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            let boundary = match chars.get(i + 1) {
                None => true,
                Some(n) if n.is_whitespace() => {
                    next.map_or(true, |ch| ch.is_uppercase() || ch.is_ascii_digit())
                        && !(c == '.' && is_abbreviation(&chars[..i], next.copied()))
                }
                _ => false,
            };
            if boundary {
                flush(&mut out, &mut current);
            }
        }
    }
    flush(&mut out, &mut current);
    out
}

/// Whether the word right before a period is a known abbreviation. "No"
/// only counts when a number follows ("No. 5").
fn is_abbreviation(before: &[char], next: Option<char>) -> bool {
    let start = before
        .iter()
        .rposition(|c| !c.is_alphabetic())
        .map_or(0, |p| p + 1);
    let word: String = before[start..].iter().collect::<String>().to_lowercase();
    if word == "no" {
        return next.is_some_and(|c| c.is_ascii_digit());
    }
    ABBREVIATIONS.contains(&word.as_str())
}

fn flush(out: &mut Vec<String>, current: &mut String) {
    let s = current.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
    current.clear();
}

fn predicate_index(words: &[&str]) -> Option<usize> {
    words
        .iter()
        .position(|w| PREDICATES.contains(&bare_lower(w).as_str()))
}

fn bare_lower(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

fn is_pronoun(word: &str) -> bool {
    IT_PRONOUNS.contains(&word) || PERSON_PRONOUNS.contains(&word)
}

fn has_predicate(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    predicate_index(&words).is_some()
}

/// Clause fragments. A piece without a predicate is glued back onto its
/// neighbour (the previous one, or the next one when it leads the sentence).
/// A sentence with no predicate at all yields nothing.
fn fragments(sentence: &str) -> Vec<String> {
    let sentence = sentence.trim_end_matches(|c: char| matches!(c, '.' | '!' | '?') || c.is_whitespace());
    let mut pieces: Vec<(String, String)> = Vec::new();
    let mut last = 0;
    let mut sep = String::new();
    for m in separator_re().find_iter(sentence) {
        pieces.push((sep.clone(), sentence[last..m.start()].to_string()));
        sep = m.as_str().to_string();
        last = m.end();
    }
    pieces.push((sep, sentence[last..].to_string()));

    let mut out: Vec<String> = Vec::new();
    let mut pending = String::new();
    for (sep, piece) in pieces {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if has_predicate(piece) {
            if !pending.is_empty() {
                out.push(format!("{pending}{sep}{piece}"));
                pending.clear();
            } else {
                out.push(piece.to_string());
            }
        } else if !pending.is_empty() {
            pending = format!("{pending}{sep}{piece}");
        } else if let Some(prev) = out.last_mut() {
            prev.push_str(&sep);
            prev.push_str(piece);
        } else {
            pending = piece.to_string();
        }
    }
    out
}

fn resolve_fragment(fragment: &str, anchors: &mut Anchors) -> String {
    let words: Vec<&str> = fragment.split_whitespace().collect();
    let mut text = fragment.trim().to_string();

    if let Some(idx) = predicate_index(&words) {
        let rest = words[idx..].join(" ");
        let subject = &words[..idx];
        match subject.last().map(|w| bare_lower(w)) {
            None => {
                if let Some(anchor) = &anchors.subject {
                    text = format!("{anchor} {rest}");
                }
            }
            Some(last) if is_pronoun(&last) => {
                // A leading adverbial ("in 1900 it") stays in front of the anchor.
                let anchor = if IT_PRONOUNS.contains(&last.as_str()) {
                    anchors.address.as_ref().or(anchors.subject.as_ref())
                } else {
                    anchors.person.as_ref().or(anchors.subject.as_ref())
                };
                if let Some(anchor) = anchor {
                    let lead = subject[..subject.len() - 1].join(" ");
                    text = if lead.is_empty() {
                        format!("{anchor} {rest}")
                    } else {
                        format!("{lead} {anchor} {rest}")
                    };
                }
            }
            Some(_) => {
                if !subject.iter().any(|w| is_pronoun(&bare_lower(w))) {
                    let subject = subject.join(" ");
                    if find_address(&subject).is_none() && subject.starts_with(char::is_uppercase) {
                        anchors.person = Some(subject.clone());
                    }
                    anchors.subject = Some(subject);
                }
            }
        }
    }

    if let Some(address) = &anchors.address {
        if !text.starts_with("there") {
            text = there_re()
                .replace_all(&text, format!("at {address}").as_str())
                .into_owned();
        }
    }

    if let Some(address) = find_address(&text) {
        anchors.address = Some(address);
    }
    crate::text::capitalize_first(text.trim())
}

/// Secondary claims synthesized from known sentence shapes.
fn derive(claim: &str, anchor_address: Option<&str>) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(c) = year_template_re().captures(claim) {
        let kind = match &c["verb"] {
            "completed" | "finished" => "completion",
            _ => "construction",
        };
        out.push(format!("The {kind} year of {} was {}", &c["x"], &c["y"]));
    }
    if let (Some(c), Some(address)) = (served_as_re().captures(claim), anchor_address) {
        let subject = c["x"].to_lowercase();
        if subject.contains(&address.to_lowercase()) {
            out.push(format!("The {} was located at {address}", &c["y"]));
        }
    }
    if let Some(c) = designed_by_re().captures(claim) {
        let subject = c["x"].trim_end_matches(',');
        out.push(format!("{} was the architect of {subject}", &c["y"]));
    }
    if let Some(c) = lived_at_re().captures(claim) {
        out.push(format!("{} was a residence of {}", &c["a"], &c["x"]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_claims() {
        assert!(extract_claims("").is_empty());
        assert!(extract_claims("   \n ").is_empty());
    }

    #[test]
    fn splits_and_anchors_subject() {
        let claims = extract_claims(
            "Ungargasse 5 was completed in 1871 and served as the Rothschild Hospital.",
        );
        assert_eq!(
            claims,
            vec![
                "Ungargasse 5 was completed in 1871",
                "The completion year of Ungargasse 5 was 1871",
                "Ungargasse 5 served as the Rothschild Hospital",
                "The Rothschild Hospital was located at Ungargasse 5",
            ]
        );
    }

    #[test]
    fn there_is_rewritten_to_anchor_address() {
        let claims = extract_claims("Ungargasse 5 is in the Landstraße district. Beethoven lived there in 1823.");
        assert!(claims.contains(&"Beethoven lived at Ungargasse 5 in 1823".to_string()));
        assert!(claims.contains(&"Ungargasse 5 was a residence of Beethoven".to_string()));
        assert!(claims.contains(&"Ungargasse 5 is located in Vienna".to_string()));
    }

    #[test]
    fn pronouns_take_the_right_anchor() {
        let claims = extract_claims(
            "Beethoven lived at Ungargasse 5. He composed the Ninth Symphony. It was built in 1820.",
        );
        assert!(claims.contains(&"Beethoven composed the Ninth Symphony".to_string()));
        assert!(claims.contains(&"Ungargasse 5 was built in 1820".to_string()));
        assert!(claims.contains(&"The construction year of Ungargasse 5 was 1820".to_string()));
    }

    #[test]
    fn commas_without_predicates_stay_attached() {
        let claims = extract_claims("Ungargasse 5, a house in Vienna, was designed by Otto Wagner.");
        assert_eq!(claims[0], "Ungargasse 5, a house in Vienna, was designed by Otto Wagner");
        assert!(claims.contains(&"Otto Wagner was the architect of Ungargasse 5, a house in Vienna".to_string()));
    }

    #[test]
    fn dedup_is_case_insensitive_and_bounded() {
        let claims = extract_claims("The tower is old. The tower is old! THE TOWER IS OLD.");
        assert_eq!(claims, vec!["The tower is old"]);

        let long = (0..20)
            .map(|i| format!("Building {i} was built in 18{i:02}."))
            .collect::<Vec<_>>()
            .join(" ");
        let claims = extract_claims(&long);
        assert_eq!(claims.len(), 12);
    }

    #[test]
    fn floor_is_configurable() {
        let mut extractor = ClaimExtractor::default();
        let out = extractor.extract_detailed("Ungargasse 5 is in the Landstraße district.");
        assert_eq!(out.padded, 1);

        extractor.floor = None;
        let out = extractor.extract_detailed("Ungargasse 5 is in the Landstraße district.");
        assert_eq!(out.padded, 0);
        assert_eq!(out.claims, vec!["Ungargasse 5 is in the Landstraße district"]);
    }

    #[test]
    fn abbreviations_do_not_end_sentences() {
        let claims = extract_claims("St. Stephen's Cathedral was built in 1160.");
        assert_eq!(
            claims,
            vec![
                "St. Stephen's Cathedral was built in 1160",
                "The construction year of St. Stephen's Cathedral was 1160",
            ]
        );

        let claims = extract_claims("Dr. Freud lived at Berggasse 19. Mr. Smith wrote about it.");
        assert!(claims.contains(&"Dr. Freud lived at Berggasse 19".to_string()));
        assert!(claims.contains(&"Mr. Smith wrote about it".to_string()));
        assert!(claims.iter().all(|c| c != "Dr" && c != "Mr"));
    }

    #[test]
    fn sentences_without_predicates_are_dropped() {
        let claims = extract_claims("Vienna, 1871. Ungargasse 5 was completed in 1871.");
        assert_eq!(claims[0], "Ungargasse 5 was completed in 1871");
        assert!(claims.iter().all(|c| !c.starts_with("Vienna")));
    }

    #[test]
    fn fronted_adverbials_keep_pronouns_resolved() {
        let claims = extract_claims(
            "Ungargasse 5 was completed in 1871, and in 1900 it became a museum. It was built in 1869.",
        );
        assert!(claims.contains(&"In 1900 Ungargasse 5 became a museum".to_string()));
        assert!(claims.contains(&"Ungargasse 5 was built in 1869".to_string()));
        assert!(claims.iter().all(|c| !c.contains(" it ")));
    }

    #[test]
    fn text_without_predicates_is_kept_whole() {
        assert_eq!(extract_claims("Old Vienna"), vec!["Old Vienna"]);
    }
}
