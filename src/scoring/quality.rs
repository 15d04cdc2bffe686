//! Source-quality classification.
//!
//! Tiers are checked in a fixed order and the first match wins. Nothing here
//! does I/O and nothing panics: a URL that does not parse is classified low.

use crate::models::SourceQuality;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualityAssessment {
    pub quality: SourceQuality,
    pub why: String,
}

/// Which rule matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceTier {
    Government,
    OpenData,
    Institutional,
    Encyclopedia,
    CrowdGeodata,
    SelfPublished,
    Academic,
    Unrecognized,
    Malformed,
}

impl SourceTier {
    pub fn quality(self) -> SourceQuality {
        match self {
            SourceTier::Government | SourceTier::OpenData | SourceTier::Institutional => {
                SourceQuality::High
            }
            SourceTier::Encyclopedia
            | SourceTier::CrowdGeodata
            | SourceTier::Academic
            | SourceTier::Unrecognized => SourceQuality::Medium,
            SourceTier::SelfPublished | SourceTier::Malformed => SourceQuality::Low,
        }
    }

    fn why(self) -> &'static str {
        match self {
            SourceTier::Government => "Official government or municipal publication.",
            SourceTier::OpenData => {
                "Structured open data with referenced statements, maintained by an editorial community."
            }
            SourceTier::Institutional => "Publication of an international institution.",
            SourceTier::Encyclopedia => {
                "Collaborative encyclopedia; generally reliable but editable by anyone."
            }
            SourceTier::CrowdGeodata => "Crowd-sourced geodata; accurate for mapping, unverified for history.",
            SourceTier::SelfPublished => "Self-published platform without editorial review.",
            SourceTier::Academic => "Academic domain; quality depends on the individual page.",
            SourceTier::Unrecognized => "Unrecognized domain; no known reliability signal either way.",
            SourceTier::Malformed => "Source URL could not be parsed; treated as low quality.",
        }
    }

    /// Only tiers with no reputation of their own can be lifted by a title.
    /// The encyclopedia and crowd geodata tiers are medium on purpose and stay there.
    fn title_can_escalate(self) -> bool {
        matches!(self, SourceTier::Unrecognized | SourceTier::Academic)
    }
}

const GOV_SUFFIXES: &[&str] = &[
    "gov", "mil", "gv.at", "gouv.fr", "bund.de", "admin.ch", "gc.ca", "go.jp", "govt.nz",
    "gob.es", "gob.mx", "gov.br",
];

const MUNICIPAL_HOST_MARKERS: &[&str] = &["stadt-", "magistrat", "rathaus", "municipality"];

const MUNICIPAL_PATH_MARKERS: &[&str] = &["/gov/", "/government/", "/municipal/", "/rathaus/"];

const INSTITUTIONAL_HOSTS: &[&str] = &[
    "int", "europa.eu", "un.org", "unesco.org", "icomos.org", "loc.gov", "europeana.eu",
];

const SELF_PUBLISHING_HOSTS: &[&str] = &[
    "blogspot.com", "wordpress.com", "medium.com", "tumblr.com", "substack.com", "wixsite.com",
    "weebly.com", "livejournal.com",
];

const INSTITUTIONAL_TITLE_WORDS: &[&str] = &[
    "museum", "official", "government", "archive", "archiv", "offiziell", "amtlich",
    "regierung", "magistrat",
];

/// `classify(url, title?)`. A title only matters for the escalation rule.
pub fn classify(url: &str, title: Option<&str>) -> QualityAssessment {
    let tier = classify_tier(url);
    if let Some(title) = title {
        if tier.title_can_escalate() && has_institutional_title(title) {
            return QualityAssessment {
                quality: SourceQuality::High,
                why: "Page title identifies an institutional or official publisher.".to_string(),
            };
        }
    }
    QualityAssessment {
        quality: tier.quality(),
        why: tier.why().to_string(),
    }
}

pub fn classify_tier(url: &str) -> SourceTier {
    let parsed = match Url::parse(url.trim()) {
        Ok(u) => u,
        Err(_) => return SourceTier::Malformed,
    };
    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return SourceTier::Malformed,
    };
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    let path = parsed.path().to_lowercase();

    if is_government(&host, &path) {
        SourceTier::Government
    } else if host_is(&host, "wikidata.org") {
        SourceTier::OpenData
    } else if INSTITUTIONAL_HOSTS.iter().any(|h| host_is(&host, h)) {
        SourceTier::Institutional
    } else if host_is(&host, "wikipedia.org") || host_is(&host, "wikimedia.org") {
        SourceTier::Encyclopedia
    } else if host_is(&host, "openstreetmap.org") || host_is(&host, "overpass-api.de") {
        SourceTier::CrowdGeodata
    } else if is_self_published(&host) {
        SourceTier::SelfPublished
    } else if is_academic(&host) {
        SourceTier::Academic
    } else {
        SourceTier::Unrecognized
    }
}

/// `host` equals `domain` or is a subdomain of it.
fn host_is(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn is_government(host: &str, path: &str) -> bool {
    if GOV_SUFFIXES.iter().any(|s| host_is(host, s)) {
        return true;
    }
    // gov.uk, gov.au, gov.pl, ...
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2 && labels[labels.len() - 2] == "gov" {
        return true;
    }
    if MUNICIPAL_HOST_MARKERS.iter().any(|m| host.contains(m)) {
        return true;
    }
    MUNICIPAL_PATH_MARKERS.iter().any(|m| path.contains(m))
}

fn is_self_published(host: &str) -> bool {
    SELF_PUBLISHING_HOSTS.iter().any(|h| host_is(host, h))
        || host.split('.').next() == Some("blog")
}

fn is_academic(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    let n = labels.len();
    if n >= 2 && labels[n - 1] == "edu" {
        return true;
    }
    // ac.at, ac.uk, edu.au, ...
    n >= 3 && matches!(labels[n - 2], "ac" | "edu")
}

fn has_institutional_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    INSTITUTIONAL_TITLE_WORDS.iter().any(|w| lower.contains(w))
}
