use crate::models::claim::Claim;
use crate::models::fact::Fact;
use crate::models::verify::Verdict;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FactCheckResult {
    pub question: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub claims: Vec<Claim>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps_or_caveats: Vec<String>,
}

/// What the caller asked the building pipeline to resolve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    pub locale: String,
}

impl LocationQuery {
    pub fn address(address: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            lat: None,
            lon: None,
            locale: locale.into(),
        }
    }

    pub fn coordinates(lat: f64, lon: f64, locale: impl Into<String>) -> Self {
        Self {
            address: None,
            lat: Some(lat),
            lon: Some(lon),
            locale: locale.into(),
        }
    }
}

/// Identity fields derived from the winning facts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Canonical {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osm_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikidata_qid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BuildingFactsResult {
    pub query: LocationQuery,
    pub canonical: Canonical,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub facts: Vec<Fact>,
    pub verdict: Verdict,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl BuildingFactsResult {
    pub fn fact(&self, key: crate::models::FactKey) -> Option<&Fact> {
        self.facts.iter().find(|f| f.key() == key)
    }
}
