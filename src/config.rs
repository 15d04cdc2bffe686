use chrono::{DateTime, NaiveDate, Utc};
use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Endpoints {
    pub geocoder: String,
    pub footprint: String,
    pub knowledge_graph: String,
    /// `{lang}` is replaced by the article language.
    pub encyclopedia: String,
    pub search: Option<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoder: "https://nominatim.openstreetmap.org".to_string(),
            footprint: "https://overpass-api.de/api/interpreter".to_string(),
            knowledge_graph: "https://www.wikidata.org/w/api.php".to_string(),
            encyclopedia: "https://{lang}.wikipedia.org/api/rest_v1".to_string(),
            search: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Sources needed before a fact or claim reads as confirmed.
    pub min_sources: usize,
    /// Fixed clock for evidence access dates; wall clock when unset.
    pub now: Option<DateTime<Utc>>,
    pub provider_timeout: Duration,
    pub footprint_radius_m: f64,
    pub locality: String,
    /// Pad extracted claims up to this many. `None` disables padding.
    pub claim_floor: Option<usize>,
    pub max_claims: usize,
    pub search_max_results: usize,
    pub search_recency_days: Option<u32>,
    pub summary_max_words: usize,
    pub endpoints: Endpoints,
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_sources: 2,
            now: None,
            provider_timeout: Duration::from_secs(10),
            footprint_radius_m: 40.0,
            locality: "Vienna".to_string(),
            claim_floor: Some(4),
            max_claims: 12,
            search_max_results: 5,
            search_recency_days: None,
            summary_max_words: 120,
            endpoints: Endpoints::default(),
            user_agent: format!("placecheck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `PLACECHECK_*` environment variables.
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(n) = parsed::<usize>("PLACECHECK_MIN_SOURCES") {
            cfg.min_sources = n.max(1);
        }
        if let Some(now) = var("PLACECHECK_NOW").and_then(|v| parse_now(&v)) {
            cfg.now = Some(now);
        }
        if let Some(secs) = parsed::<u64>("PLACECHECK_TIMEOUT_SECS") {
            cfg.provider_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(r) = parsed::<f64>("PLACECHECK_RADIUS_M") {
            cfg.footprint_radius_m = r;
        }
        if let Some(locality) = var("PLACECHECK_LOCALITY") {
            cfg.locality = locality;
        }
        if let Some(floor) = parsed::<usize>("PLACECHECK_CLAIM_FLOOR") {
            cfg.claim_floor = (floor > 0).then_some(floor);
        }
        if let Some(n) = parsed::<usize>("PLACECHECK_SEARCH_MAX") {
            cfg.search_max_results = n.max(1);
        }
        cfg.search_recency_days = parsed::<u32>("PLACECHECK_SEARCH_RECENCY_DAYS");
        if let Some(ua) = var("PLACECHECK_USER_AGENT") {
            cfg.user_agent = ua;
        }
        if let Some(v) = var("PLACECHECK_GEOCODER_ENDPOINT") {
            cfg.endpoints.geocoder = v;
        }
        if let Some(v) = var("PLACECHECK_FOOTPRINT_ENDPOINT") {
            cfg.endpoints.footprint = v;
        }
        if let Some(v) = var("PLACECHECK_KNOWLEDGE_GRAPH_ENDPOINT") {
            cfg.endpoints.knowledge_graph = v;
        }
        if let Some(v) = var("PLACECHECK_ENCYCLOPEDIA_ENDPOINT") {
            cfg.endpoints.encyclopedia = v;
        }
        cfg.endpoints.search = var("PLACECHECK_SEARCH_ENDPOINT");
        cfg
    }

    /// Access date stamped on every evidence item of one resolution.
    pub fn access_date(&self) -> NaiveDate {
        self.now.unwrap_or_else(Utc::now).date_naive()
    }
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_now(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    var(name).and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.min_sources, 2);
        assert_eq!(cfg.claim_floor, Some(4));
        assert_eq!(cfg.max_claims, 12);
        assert_eq!(cfg.summary_max_words, 120);
        assert!(cfg.endpoints.search.is_none());
    }

    #[test]
    fn fixed_clock_drives_access_date() {
        let cfg = PipelineConfig {
            now: parse_now("2024-03-05T23:30:00Z"),
            ..PipelineConfig::default()
        };
        assert_eq!(cfg.access_date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(
            parse_now("2024-03-05").map(|d| d.date_naive()),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert!(parse_now("soon").is_none());
    }
}
