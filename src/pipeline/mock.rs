//! In-memory providers for tests and offline runs.

use crate::error::{ProviderError, ProviderResult};
use crate::models::LatLon;
use crate::pipeline::traits::{
    EntityFacts, FootprintFeature, FootprintProvider, GeocodeHit, Geocoder,
    KnowledgeGraphProvider, OpenedPage, PageSummary, SearchHit, SearchOptions, SummaryProvider,
    WebSearchTool,
};
use crate::text::{keywords, normalize};
use async_trait::async_trait;
use std::collections::HashMap;

fn fail_or<T>(failure: &Option<ProviderError>, ok: impl FnOnce() -> T) -> ProviderResult<T> {
    match failure {
        Some(err) => Err(err.clone()),
        None => Ok(ok()),
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticGeocoder {
    hits: HashMap<String, GeocodeHit>,
    failure: Option<ProviderError>,
}

impl StaticGeocoder {
    pub fn with_hit(mut self, address: &str, hit: GeocodeHit) -> Self {
        self.hits.insert(normalize(address), hit);
        self
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str, _locale: &str) -> ProviderResult<Option<GeocodeHit>> {
        fail_or(&self.failure, || self.hits.get(&normalize(address)).cloned())
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticFootprints {
    features: Vec<FootprintFeature>,
    failure: Option<ProviderError>,
}

impl StaticFootprints {
    pub fn with_feature(mut self, feature: FootprintFeature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }
}

#[async_trait]
impl FootprintProvider for StaticFootprints {
    async fn nearest_building(
        &self,
        lat: f64,
        lon: f64,
        radius_m: f64,
    ) -> ProviderResult<Option<FootprintFeature>> {
        let here = LatLon::new(lat, lon);
        fail_or(&self.failure, || {
            self.features
                .iter()
                .map(|f| (here.distance_m(&LatLon::new(f.lat, f.lon)), f))
                .filter(|(d, _)| *d <= radius_m)
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, f)| f.clone())
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticKnowledgeGraph {
    entities: Vec<EntityFacts>,
    titles: HashMap<(String, String), String>,
    failure: Option<ProviderError>,
}

impl StaticKnowledgeGraph {
    /// Registers an entity; its own article link also resolves back to it.
    pub fn with_entity(mut self, entity: EntityFacts) -> Self {
        if let Some(link) = &entity.wikipedia {
            self.titles
                .insert((link.lang.clone(), normalize(&link.title)), entity.qid.clone());
        }
        self.entities.push(entity);
        self
    }

    pub fn with_title(mut self, lang: &str, title: &str, qid: &str) -> Self {
        self.titles
            .insert((lang.to_string(), normalize(title)), qid.to_string());
        self
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }
}

#[async_trait]
impl KnowledgeGraphProvider for StaticKnowledgeGraph {
    async fn qid_for_title(&self, lang: &str, title: &str) -> ProviderResult<Option<String>> {
        fail_or(&self.failure, || {
            self.titles
                .get(&(lang.to_string(), normalize(title)))
                .cloned()
        })
    }

    async fn entity(&self, qid: &str, _lang: &str) -> ProviderResult<Option<EntityFacts>> {
        fail_or(&self.failure, || {
            self.entities.iter().find(|e| e.qid == qid).cloned()
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticSummaries {
    pages: HashMap<(String, String), PageSummary>,
    failure: Option<ProviderError>,
}

impl StaticSummaries {
    pub fn with_page(mut self, lang: &str, page: PageSummary) -> Self {
        self.pages
            .insert((lang.to_string(), normalize(&page.title)), page);
        self
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SummaryProvider for StaticSummaries {
    async fn summary(&self, title: &str, lang: &str) -> ProviderResult<Option<PageSummary>> {
        let key = (lang.to_string(), normalize(&title.replace('_', " ")));
        fail_or(&self.failure, || self.pages.get(&key).cloned())
    }
}

/// Returns every stored hit that shares a keyword with the query.
#[derive(Clone, Debug, Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    pages: HashMap<String, OpenedPage>,
    failure: Option<ProviderError>,
}

impl StaticSearch {
    pub fn with_hit(mut self, hit: SearchHit) -> Self {
        self.hits.push(hit);
        self
    }

    pub fn with_page(mut self, url: &str, page: OpenedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }
}

#[async_trait]
impl WebSearchTool for StaticSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> ProviderResult<Vec<SearchHit>> {
        let wanted = keywords(query);
        fail_or(&self.failure, || {
            self.hits
                .iter()
                .filter(|hit| {
                    let text = format!("{} {}", hit.title, hit.snippet.as_deref().unwrap_or(""));
                    let have = keywords(&text);
                    wanted.iter().any(|w| have.contains(w))
                })
                .take(options.max.max(1))
                .cloned()
                .collect()
        })
    }

    async fn open_url(&self, url: &str) -> ProviderResult<OpenedPage> {
        fail_or(&self.failure, || {
            self.pages.get(url).cloned().unwrap_or_else(|| OpenedPage {
                ok: true,
                final_url: url.to_string(),
                text: None,
            })
        })
    }
}

/// Never answers; used to exercise provider timeouts.
#[derive(Clone, Copy, Debug, Default)]
pub struct HangingProvider;

#[async_trait]
impl Geocoder for HangingProvider {
    async fn geocode(&self, _address: &str, _locale: &str) -> ProviderResult<Option<GeocodeHit>> {
        std::future::pending().await
    }
}

#[async_trait]
impl FootprintProvider for HangingProvider {
    async fn nearest_building(
        &self,
        _lat: f64,
        _lon: f64,
        _radius_m: f64,
    ) -> ProviderResult<Option<FootprintFeature>> {
        std::future::pending().await
    }
}

#[async_trait]
impl WebSearchTool for HangingProvider {
    async fn search(&self, _query: &str, _options: &SearchOptions) -> ProviderResult<Vec<SearchHit>> {
        std::future::pending().await
    }

    async fn open_url(&self, _url: &str) -> ProviderResult<OpenedPage> {
        std::future::pending().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn footprints_respect_radius() {
        let provider = StaticFootprints::default().with_feature(FootprintFeature {
            osm_type: "way".into(),
            osm_id: 1,
            lat: 48.2000,
            lon: 16.3800,
            tags: BTreeMap::new(),
        });
        let near = provider.nearest_building(48.2001, 16.3800, 40.0).await.unwrap();
        assert!(near.is_some());
        let far = provider.nearest_building(48.2100, 16.3800, 40.0).await.unwrap();
        assert!(far.is_none());
    }

    #[tokio::test]
    async fn failing_double_returns_error() {
        let geo = StaticGeocoder::failing(ProviderError::Status(503));
        assert!(geo.geocode("Ungargasse 5", "de").await.is_err());
    }

    #[tokio::test]
    async fn search_matches_on_keywords() {
        let search = StaticSearch::default().with_hit(SearchHit {
            title: "Ungargasse history".into(),
            url: "https://example.org/u".into(),
            snippet: None,
            publish_date_iso: None,
        });
        let opts = SearchOptions { recency_days: None, max: 5 };
        assert_eq!(search.search("Ungargasse 1871", &opts).await.unwrap().len(), 1);
        assert!(search.search("Stephansdom", &opts).await.unwrap().is_empty());
    }
}
