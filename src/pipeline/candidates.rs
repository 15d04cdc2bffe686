//! Candidate facts harvested from provider responses, and their grouping.
//!
//! Every provider answer is turned into `(Attribute, Evidence)` pairs. Pairs
//! for the same key are grouped by a key-specific notion of "same value";
//! more than one group for a key is a conflict.

use crate::models::{parse_iso_date, Attribute, Evidence, FactKey, LatLon, SourceQuality};
use crate::pipeline::traits::{EntityFacts, FootprintFeature, GeocodeHit, PageSummary, WikiLink};
use crate::scoring::merge;
use crate::text::{first_year, normalize, tokens, trim_words};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const SUMMARY_CANDIDATE_MAX_WORDS: usize = 80;
pub const SAME_PLACE_M: f64 = 50.0;
pub const SAME_HEIGHT_M: f64 = 0.5;

const GEOCODER_WHY: &str =
    "Geocoder display name derived from crowd-sourced map data; weak corroboration.";

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub attribute: Attribute,
    pub evidence: Evidence,
}

impl Candidate {
    fn new(attribute: Attribute, evidence: &Evidence, snippet: String) -> Self {
        Self {
            attribute,
            evidence: evidence.clone().with_snippet(Some(snippet)),
        }
    }
}

/// `de:Ungargasse` style article reference; a bare title takes `default_lang`.
pub fn parse_wiki_tag(raw: &str, default_lang: &str) -> Option<WikiLink> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.split_once(':') {
        Some((lang, title))
            if (2..=3).contains(&lang.len()) && lang.chars().all(|c| c.is_ascii_lowercase()) =>
        {
            Some(WikiLink {
                lang: lang.to_string(),
                title: title.trim().to_string(),
            })
        }
        _ => Some(WikiLink {
            lang: default_lang.to_string(),
            title: raw.to_string(),
        }),
    }
}

pub fn wiki_ref(link: &WikiLink) -> String {
    format!("{}:{}", link.lang, link.title.replace('_', " "))
}

fn humanize(value: &str) -> String {
    value.replace('_', " ")
}

fn parse_height(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches('m')
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite() && *h > 0.0)
}

fn year_or_raw(raw: &str) -> String {
    first_year(raw).unwrap_or_else(|| raw.trim().to_string())
}

/// The display name is rebuilt from the same map data the footprint tags
/// come from, so it is only weak corroboration.
pub fn from_geocode(hit: &GeocodeHit, address: &str, access_date: NaiveDate) -> Candidate {
    let mut evidence = Evidence::observe(format!("Geocoder result for {address}"), &hit.source_url, access_date);
    evidence.source_quality = SourceQuality::Low;
    evidence.why_trustworthy = GEOCODER_WHY.to_string();
    Candidate::new(
        Attribute::Address(hit.display_name.clone()),
        &evidence,
        format!("display_name={}", hit.display_name),
    )
}

/// Typed candidates from map tags.
pub fn from_tags(feature: &FootprintFeature, lang: &str, access_date: NaiveDate) -> Vec<Candidate> {
    let evidence = Evidence::observe(
        format!("OpenStreetMap {} {}", feature.osm_type, feature.osm_id),
        &feature.url(),
        access_date,
    );
    let mut out = Vec::new();
    let mut push = |attribute: Attribute, tag: &str, value: &str| {
        out.push(Candidate::new(attribute, &evidence, format!("{tag}={value}")));
    };

    let localized = format!("name:{lang}");
    if let Some(name) = feature.tag(&localized) {
        push(Attribute::Name(name.to_string()), &localized, name);
    } else if let Some(name) = feature.tag("name") {
        push(Attribute::Name(name.to_string()), "name", name);
    }

    if let (Some(street), Some(number)) = (feature.tag("addr:street"), feature.tag("addr:housenumber")) {
        let mut address = format!("{street} {number}");
        match (feature.tag("addr:postcode"), feature.tag("addr:city")) {
            (Some(postcode), Some(city)) => address.push_str(&format!(", {postcode} {city}")),
            (None, Some(city)) => address.push_str(&format!(", {city}")),
            _ => {}
        }
        push(Attribute::Address(address.clone()), "addr:*", &address);
    }

    push(
        Attribute::Coordinates(LatLon::new(feature.lat, feature.lon)),
        "center",
        &format!("{:.6},{:.6}", feature.lat, feature.lon),
    );

    if let Some(start) = feature.tag("start_date") {
        push(Attribute::ConstructionStart(year_or_raw(start)), "start_date", start);
    }
    for tag in ["completion_date", "construction_end"] {
        if let Some(end) = feature.tag(tag) {
            push(Attribute::ConstructionEnd(year_or_raw(end)), tag, end);
            break;
        }
    }
    if let Some(architect) = feature.tag("architect") {
        push(Attribute::Architect(architect.to_string()), "architect", architect);
    }
    for tag in ["building:architecture", "architecture"] {
        if let Some(style) = feature.tag(tag) {
            push(Attribute::ArchitecturalStyle(humanize(style)), tag, style);
            break;
        }
    }
    if let Some(heritage) = feature.tag("heritage") {
        let value = match feature.tag("heritage:operator") {
            Some(operator) => format!("listed by {operator}"),
            None => format!("listed (heritage level {heritage})"),
        };
        push(Attribute::HeritageDesignation(value), "heritage", heritage);
    }
    if let Some(levels) = feature.tag("building:levels") {
        if let Ok(n) = levels.parse::<u32>() {
            push(Attribute::Levels(n), "building:levels", levels);
        }
    }
    if let Some(height) = feature.tag("height") {
        if let Some(h) = parse_height(height) {
            push(Attribute::HeightM(h), "height", height);
        }
    }
    let current_use = ["amenity", "tourism", "office", "shop", "building"]
        .into_iter()
        .find_map(|tag| feature.tag(tag).filter(|v| *v != "yes").map(|v| (tag, v)));
    if let Some((tag, value)) = current_use {
        push(Attribute::CurrentUse(humanize(value)), tag, value);
    }
    for tag in ["historic:use", "historic"] {
        if let Some(value) = feature.tag(tag) {
            push(Attribute::HistoricUse(humanize(value)), tag, value);
            break;
        }
    }

    let osm_ref = feature.osm_ref();
    push(Attribute::OsmId(osm_ref.clone()), "id", &osm_ref);
    if let Some(qid) = feature.tag("wikidata") {
        push(Attribute::WikidataQid(qid.to_string()), "wikidata", qid);
    }
    if let Some(link) = feature.tag("wikipedia").and_then(|w| parse_wiki_tag(w, lang)) {
        let value = wiki_ref(&link);
        push(Attribute::WikipediaTitle(value.clone()), "wikipedia", &value);
    }
    out
}

/// Typed candidates from a knowledge-graph entity. Multi-valued properties
/// become one joined value so a source never conflicts with itself.
pub fn from_entity(entity: &EntityFacts, access_date: NaiveDate) -> Vec<Candidate> {
    let title = entity.label.clone().unwrap_or_else(|| entity.qid.clone());
    let evidence = Evidence::observe(title, &entity.url(), access_date);
    let mut out = Vec::new();
    let mut push = |attribute: Attribute, property: &str, value: &str| {
        out.push(Candidate::new(attribute, &evidence, format!("{property}: {value}")));
    };

    if let Some(label) = &entity.label {
        push(Attribute::Name(label.clone()), "label", label);
    }
    if let Some((lat, lon)) = entity.coordinates {
        push(
            Attribute::Coordinates(LatLon::new(lat, lon)),
            "P625",
            &format!("{lat:.6},{lon:.6}"),
        );
    }
    if let Some(inception) = &entity.inception {
        push(Attribute::ConstructionStart(year_or_raw(inception)), "P571", inception);
    }
    if !entity.architects.is_empty() {
        let joined = entity.architects.join(", ");
        push(Attribute::Architect(joined.clone()), "P84", &joined);
    }
    if !entity.styles.is_empty() {
        let joined = entity.styles.join(", ");
        push(Attribute::ArchitecturalStyle(joined.clone()), "P149", &joined);
    }
    if let Some(heritage) = entity.heritage.first() {
        push(Attribute::HeritageDesignation(heritage.clone()), "P1435", heritage);
    }
    if !entity.notable_events.is_empty() {
        let joined = entity.notable_events.join("; ");
        push(Attribute::NotableEvent(joined.clone()), "P793", &joined);
    }
    push(Attribute::WikidataQid(entity.qid.clone()), "id", &entity.qid);
    if let Some(link) = &entity.wikipedia {
        let value = wiki_ref(link);
        push(Attribute::WikipediaTitle(value.clone()), "sitelink", &value);
    }
    out
}

pub fn from_summary(page: &PageSummary, lang: &str, access_date: NaiveDate) -> Vec<Candidate> {
    let evidence = Evidence::observe(page.title.clone(), &page.url, access_date)
        .with_publish_date(page.last_modified.as_deref().and_then(parse_iso_date));
    let extract = trim_words(&page.extract, SUMMARY_CANDIDATE_MAX_WORDS);
    let title = wiki_ref(&WikiLink {
        lang: lang.to_string(),
        title: page.title.clone(),
    });
    let description = page.description.clone().unwrap_or_else(|| extract.clone());
    vec![
        Candidate::new(Attribute::WikipediaSummary(extract), &evidence, description),
        Candidate::new(Attribute::WikipediaTitle(title.clone()), &evidence, format!("title: {title}")),
    ]
}

fn token_subset(a: &str, b: &str) -> bool {
    let (ta, tb) = (tokens(a), tokens(b));
    if ta.is_empty() || tb.is_empty() {
        return false;
    }
    ta.iter().all(|t| tb.contains(t)) || tb.iter().all(|t| ta.contains(t))
}

fn same_wiki_article(a: &str, b: &str) -> bool {
    match (a.split_once(':'), b.split_once(':')) {
        (Some((la, ta)), Some((lb, tb))) if la == lb => normalize(ta) == normalize(tb),
        // Different languages name the same article through interlanguage links.
        (Some(_), Some(_)) => true,
        _ => normalize(a) == normalize(b),
    }
}

/// Whether two candidate values for the same key state the same thing.
pub fn equivalent(a: &Attribute, b: &Attribute) -> bool {
    use Attribute::*;
    match (a, b) {
        (Coordinates(x), Coordinates(y)) => x.distance_m(y) <= SAME_PLACE_M,
        (Levels(x), Levels(y)) => x == y,
        (HeightM(x), HeightM(y)) => (x - y).abs() <= SAME_HEIGHT_M,
        (HeritageDesignation(_), HeritageDesignation(_)) => true,
        (ConstructionStart(x), ConstructionStart(y)) | (ConstructionEnd(x), ConstructionEnd(y)) => {
            match (first_year(x), first_year(y)) {
                (Some(yx), Some(yy)) => yx == yy,
                _ => normalize(x) == normalize(y),
            }
        }
        (Address(x), Address(y))
        | (Architect(x), Architect(y))
        | (ArchitecturalStyle(x), ArchitecturalStyle(y)) => {
            normalize(x) == normalize(y) || token_subset(x, y)
        }
        (WikipediaTitle(x), WikipediaTitle(y)) => same_wiki_article(x, y),
        _ if a.key() == b.key() => match (a.as_text(), b.as_text()) {
            (Some(x), Some(y)) => normalize(x) == normalize(y),
            _ => false,
        },
        _ => false,
    }
}

/// Candidates for one key that state the same value.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateGroup {
    pub members: Vec<Candidate>,
}

impl CandidateGroup {
    /// The value backed by the best evidence, first seen on ties.
    pub fn representative(&self) -> &Attribute {
        let mut best = &self.members[0];
        for member in &self.members[1..] {
            if member.evidence.source_quality > best.evidence.source_quality {
                best = member;
            }
        }
        &best.attribute
    }

    pub fn evidence(&self) -> Vec<Evidence> {
        let raw: Vec<Evidence> = self.members.iter().map(|m| m.evidence.clone()).collect();
        merge(&raw)
    }

    pub fn best_quality(&self) -> SourceQuality {
        self.members
            .iter()
            .map(|m| m.evidence.source_quality)
            .max()
            .unwrap_or(SourceQuality::Low)
    }
}

/// Groups candidates per key, preserving first-seen order inside each key.
pub fn group(candidates: Vec<Candidate>) -> BTreeMap<FactKey, Vec<CandidateGroup>> {
    let mut out: BTreeMap<FactKey, Vec<CandidateGroup>> = BTreeMap::new();
    for candidate in candidates {
        let groups = out.entry(candidate.attribute.key()).or_default();
        let existing = groups.iter_mut().find(|g| {
            g.members
                .iter()
                .any(|m| equivalent(&m.attribute, &candidate.attribute))
        });
        match existing {
            Some(g) => g.members.push(candidate),
            None => groups.push(CandidateGroup {
                members: vec![candidate],
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn feature(tags: &[(&str, &str)]) -> FootprintFeature {
        FootprintFeature {
            osm_type: "way".into(),
            osm_id: 42,
            lat: 48.2,
            lon: 16.38,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn geocoder_names_are_weak_evidence() {
        let hit = GeocodeHit {
            lat: 48.2,
            lon: 16.38,
            display_name: "5, Ungargasse, Landstraße, Wien".into(),
            source_url: "https://nominatim.openstreetmap.org/search?q=Ungargasse+5".into(),
        };
        let c = from_geocode(&hit, "Ungargasse 5", day());
        assert_eq!(c.attribute, Attribute::Address("5, Ungargasse, Landstraße, Wien".into()));
        assert_eq!(c.evidence.source_quality, SourceQuality::Low);
        assert!(c.evidence.why_trustworthy.contains("weak"));
    }

    #[test]
    fn tags_become_typed_candidates() {
        let f = feature(&[
            ("name", "Testhaus"),
            ("name:de", "Testhaus Wien"),
            ("start_date", "~1872"),
            ("building:levels", "4"),
            ("height", "18.5 m"),
            ("building", "apartments"),
            ("wikipedia", "de:Testhaus"),
            ("addr:street", "Ungargasse"),
            ("addr:housenumber", "5"),
            ("addr:city", "Wien"),
        ]);
        let c = from_tags(&f, "de", day());
        let attrs: Vec<&Attribute> = c.iter().map(|c| &c.attribute).collect();
        assert!(attrs.contains(&&Attribute::Name("Testhaus Wien".into())));
        assert!(attrs.contains(&&Attribute::Address("Ungargasse 5, Wien".into())));
        assert!(attrs.contains(&&Attribute::ConstructionStart("1872".into())));
        assert!(attrs.contains(&&Attribute::Levels(4)));
        assert!(attrs.contains(&&Attribute::HeightM(18.5)));
        assert!(attrs.contains(&&Attribute::CurrentUse("apartments".into())));
        assert!(attrs.contains(&&Attribute::OsmId("way/42".into())));
        assert!(attrs.contains(&&Attribute::WikipediaTitle("de:Testhaus".into())));
        assert!(c
            .iter()
            .all(|c| c.evidence.source_quality == SourceQuality::Medium));
        let start = c
            .iter()
            .find(|c| c.attribute.key() == FactKey::ConstructionStart)
            .unwrap();
        assert_eq!(start.evidence.snippet.as_deref(), Some("start_date=~1872"));
    }

    #[test]
    fn entity_values_are_joined() {
        let entity = EntityFacts {
            qid: "Q1".into(),
            architects: vec!["Otto Wagner".into(), "Josef Hoffmann".into()],
            ..EntityFacts::default()
        };
        let c = from_entity(&entity, day());
        let architects: Vec<_> = c
            .iter()
            .filter(|c| c.attribute.key() == FactKey::Architect)
            .collect();
        assert_eq!(architects.len(), 1);
        assert_eq!(architects[0].evidence.source_quality, SourceQuality::High);
    }

    #[test]
    fn equivalence_rules() {
        use Attribute::*;
        assert!(equivalent(
            &Address("Ungargasse 5, 1030 Wien".into()),
            &Address("5, Ungargasse, Landstraße, Wien, 1030, Österreich".into())
        ));
        assert!(equivalent(&ConstructionStart("1872".into()), &ConstructionStart("1872-05-01".into())));
        assert!(!equivalent(&ConstructionStart("1872".into()), &ConstructionStart("1873".into())));
        assert!(equivalent(&HeightM(18.5), &HeightM(18.9)));
        assert!(equivalent(
            &Coordinates(LatLon::new(48.2, 16.38)),
            &Coordinates(LatLon::new(48.2002, 16.38))
        ));
        assert!(!equivalent(&Name("Testhaus".into()), &Name("Anderes Haus".into())));
        assert!(equivalent(&WikipediaTitle("de:Testhaus".into()), &WikipediaTitle("en:Test House".into())));
        assert!(!equivalent(&WikipediaTitle("de:Testhaus".into()), &WikipediaTitle("de:Anderes".into())));
    }

    #[test]
    fn grouping_prefers_best_evidence_for_display() {
        let osm = from_tags(&feature(&[("architect", "wagner")]), "de", day());
        let wd = from_entity(
            &EntityFacts {
                qid: "Q1".into(),
                architects: vec!["Otto Wagner".into()],
                ..EntityFacts::default()
            },
            day(),
        );
        let groups = group(osm.into_iter().chain(wd).collect());
        let architect = &groups[&FactKey::Architect];
        assert_eq!(architect.len(), 1);
        assert_eq!(architect[0].representative(), &Attribute::Architect("Otto Wagner".into()));
        assert_eq!(architect[0].evidence().len(), 2);
    }

    #[test]
    fn wiki_tags_parse_language() {
        assert_eq!(
            parse_wiki_tag("de:Palais Rothschild", "en"),
            Some(WikiLink {
                lang: "de".into(),
                title: "Palais Rothschild".into()
            })
        );
        assert_eq!(parse_wiki_tag("Palais", "en").unwrap().lang, "en");
        assert_eq!(parse_wiki_tag("  ", "en"), None);
    }
}
