//! Provider seams. Each has one HTTP adapter and one in-memory double.

use crate::error::ProviderResult;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    pub source_url: String,
}

/// Nearest tagged building around a point.
#[derive(Clone, Debug, PartialEq)]
pub struct FootprintFeature {
    /// `node`, `way` or `relation`.
    pub osm_type: String,
    pub osm_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: BTreeMap<String, String>,
}

impl FootprintFeature {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn osm_ref(&self) -> String {
        format!("{}/{}", self.osm_type, self.osm_id)
    }

    pub fn url(&self) -> String {
        format!("https://www.openstreetmap.org/{}", self.osm_ref())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WikiLink {
    pub lang: String,
    pub title: String,
}

/// Typed facts for one knowledge-graph entity; referenced entities are
/// already resolved to labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityFacts {
    pub qid: String,
    pub label: Option<String>,
    /// Year or ISO date, already stripped of calendar noise.
    pub inception: Option<String>,
    pub architects: Vec<String>,
    pub styles: Vec<String>,
    pub heritage: Vec<String>,
    pub notable_events: Vec<String>,
    pub coordinates: Option<(f64, f64)>,
    pub wikipedia: Option<WikiLink>,
}

impl EntityFacts {
    pub fn url(&self) -> String {
        format!("https://www.wikidata.org/wiki/{}", self.qid)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageSummary {
    pub title: String,
    pub extract: String,
    pub description: Option<String>,
    pub url: String,
    /// ISO timestamp of the last edit.
    pub last_modified: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOptions {
    pub recency_days: Option<u32>,
    pub max: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
    pub publish_date_iso: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OpenedPage {
    pub ok: bool,
    pub final_url: String,
    pub text: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str, locale: &str) -> ProviderResult<Option<GeocodeHit>>;
}

#[async_trait]
pub trait FootprintProvider: Send + Sync {
    async fn nearest_building(
        &self,
        lat: f64,
        lon: f64,
        radius_m: f64,
    ) -> ProviderResult<Option<FootprintFeature>>;
}

#[async_trait]
pub trait KnowledgeGraphProvider: Send + Sync {
    /// Entity id linked from an encyclopedia article.
    async fn qid_for_title(&self, lang: &str, title: &str) -> ProviderResult<Option<String>>;

    async fn entity(&self, qid: &str, lang: &str) -> ProviderResult<Option<EntityFacts>>;
}

#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn summary(&self, title: &str, lang: &str) -> ProviderResult<Option<PageSummary>>;
}

#[async_trait]
pub trait WebSearchTool: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) -> ProviderResult<Vec<SearchHit>>;

    async fn open_url(&self, url: &str) -> ProviderResult<OpenedPage>;
}
