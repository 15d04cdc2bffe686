//! Wikimedia adapters: Wikidata entities and Wikipedia page summaries.

use crate::config::PipelineConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::pipeline::fetch::{endpoint_url, get_json, http_client};
use crate::pipeline::traits::{
    EntityFacts, KnowledgeGraphProvider, PageSummary, SummaryProvider, WikiLink,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

const P_INCEPTION: &str = "P571";
const P_ARCHITECT: &str = "P84";
const P_STYLE: &str = "P149";
const P_HERITAGE: &str = "P1435";
const P_SIGNIFICANT_EVENT: &str = "P793";
const P_COORDINATES: &str = "P625";

pub struct WikidataGraph {
    client: Client,
    endpoint: String,
}

impl WikidataGraph {
    pub fn new(config: &PipelineConfig) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config.endpoints.knowledge_graph.clone(),
        })
    }

    async fn entities(&self, params: &[(&str, &str)]) -> ProviderResult<Value> {
        let mut all = vec![("action", "wbgetentities"), ("format", "json")];
        all.extend_from_slice(params);
        let url = endpoint_url(&self.endpoint, &all)?;
        let body: Option<Value> = get_json(&self.client, url).await?;
        body.and_then(|mut v| v.get_mut("entities").map(Value::take))
            .ok_or_else(|| ProviderError::Malformed("missing entities".to_string()))
    }

    async fn labels(&self, ids: &[String], lang: &str) -> ProviderResult<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let joined = ids.join("|");
        let languages = format!("{lang}|en");
        let entities = self
            .entities(&[
                ("ids", joined.as_str()),
                ("props", "labels"),
                ("languages", languages.as_str()),
            ])
            .await?;
        let mut out = HashMap::new();
        for id in ids {
            if let Some(label) = entities.get(id).and_then(|e| label_of(e, lang)) {
                out.insert(id.clone(), label);
            }
        }
        Ok(out)
    }
}

fn label_of(entity: &Value, lang: &str) -> Option<String> {
    let labels = entity.get("labels")?;
    labels
        .get(lang)
        .or_else(|| labels.get("en"))
        .and_then(|l| l.get("value"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn main_values<'a>(entity: &'a Value, property: &str) -> Vec<&'a Value> {
    entity
        .get("claims")
        .and_then(|c| c.get(property))
        .and_then(Value::as_array)
        .map(|claims| {
            claims
                .iter()
                .filter(|c| c.get("rank").and_then(Value::as_str) != Some("deprecated"))
                .filter_map(|c| c.pointer("/mainsnak/datavalue/value"))
                .collect()
        })
        .unwrap_or_default()
}

fn item_ids(entity: &Value, property: &str) -> Vec<String> {
    main_values(entity, property)
        .into_iter()
        .filter_map(|v| v.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// `+1872-00-00T00:00:00Z` at year precision becomes `1872`; day precision
/// keeps `YYYY-MM-DD`.
pub fn wikidata_time(value: &Value) -> Option<String> {
    let raw = value.get("time")?.as_str()?;
    let precision = value.get("precision").and_then(Value::as_u64).unwrap_or(9);
    let trimmed = raw.trim_start_matches('+');
    if trimmed.starts_with('-') {
        return None;
    }
    let date = trimmed.get(..10)?;
    if precision >= 11 && !date.contains("-00") {
        Some(date.to_string())
    } else {
        date.get(..4).map(str::to_string)
    }
}

#[async_trait]
impl KnowledgeGraphProvider for WikidataGraph {
    async fn qid_for_title(&self, lang: &str, title: &str) -> ProviderResult<Option<String>> {
        let site = format!("{lang}wiki");
        let entities = self
            .entities(&[("sites", site.as_str()), ("titles", title), ("props", "info")])
            .await?;
        let qid = entities
            .as_object()
            .and_then(|m| m.keys().find(|k| k.starts_with('Q')).cloned());
        Ok(qid)
    }

    async fn entity(&self, qid: &str, lang: &str) -> ProviderResult<Option<EntityFacts>> {
        let languages = format!("{lang}|en");
        let entities = self
            .entities(&[
                ("ids", qid),
                ("props", "labels|claims|sitelinks"),
                ("languages", languages.as_str()),
            ])
            .await?;
        let Some(entity) = entities.get(qid) else {
            return Ok(None);
        };
        if entity.get("missing").is_some() {
            return Ok(None);
        }

        let architects = item_ids(entity, P_ARCHITECT);
        let styles = item_ids(entity, P_STYLE);
        let heritage = item_ids(entity, P_HERITAGE);
        let events = item_ids(entity, P_SIGNIFICANT_EVENT);

        let mut referenced: Vec<String> = Vec::new();
        for id in architects.iter().chain(&styles).chain(&heritage).chain(&events) {
            if !referenced.contains(id) {
                referenced.push(id.clone());
            }
        }
        let labels = self.labels(&referenced, lang).await?;
        let resolve = |ids: &[String]| -> Vec<String> {
            ids.iter().filter_map(|id| labels.get(id).cloned()).collect()
        };

        let coordinates = main_values(entity, P_COORDINATES).first().and_then(|v| {
            Some((v.get("latitude")?.as_f64()?, v.get("longitude")?.as_f64()?))
        });
        let inception = main_values(entity, P_INCEPTION)
            .first()
            .and_then(|v| wikidata_time(v));

        let sitelinks = entity.get("sitelinks");
        let wikipedia = [lang, "en"].iter().find_map(|l| {
            let title = sitelinks?
                .get(format!("{l}wiki"))?
                .get("title")?
                .as_str()?;
            Some(WikiLink {
                lang: l.to_string(),
                title: title.to_string(),
            })
        });

        Ok(Some(EntityFacts {
            qid: qid.to_string(),
            label: label_of(entity, lang),
            inception,
            architects: resolve(&architects),
            styles: resolve(&styles),
            heritage: resolve(&heritage),
            notable_events: resolve(&events),
            coordinates,
            wikipedia,
        }))
    }
}

pub struct WikipediaSummaries {
    client: Client,
    endpoint: String,
}

impl WikipediaSummaries {
    pub fn new(config: &PipelineConfig) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config.endpoints.encyclopedia.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Deserialize)]
struct RestSummary {
    title: String,
    #[serde(default)]
    extract: String,
    description: Option<String>,
    timestamp: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Deserialize)]
struct ContentUrls {
    desktop: Option<PageUrl>,
}

#[derive(Deserialize)]
struct PageUrl {
    page: String,
}

#[async_trait]
impl SummaryProvider for WikipediaSummaries {
    async fn summary(&self, title: &str, lang: &str) -> ProviderResult<Option<PageSummary>> {
        let base = self.endpoint.replace("{lang}", lang);
        let mut url = url::Url::parse(&format!("{base}/page/summary/"))
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Malformed("endpoint cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&title.replace(' ', "_"));
        let body: Option<RestSummary> = get_json(&self.client, url).await?;
        Ok(body.filter(|s| !s.extract.trim().is_empty()).map(|s| {
            let url = s
                .content_urls
                .and_then(|c| c.desktop)
                .map(|d| d.page)
                .unwrap_or_else(|| {
                    format!("https://{lang}.wikipedia.org/wiki/{}", s.title.replace(' ', "_"))
                });
            PageSummary {
                title: s.title,
                extract: s.extract,
                description: s.description,
                url,
                last_modified: s.timestamp,
            }
        }))
    }
}
