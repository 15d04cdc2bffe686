use crate::models::evidence::Evidence;
use crate::models::verify::Verdict;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in metres.
    pub fn distance_m(&self, other: &LatLon) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

/// Fixed vocabulary of building attributes. Declaration order is output order.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FactKey {
    Name,
    Address,
    Coordinates,
    ConstructionStart,
    ConstructionEnd,
    Architect,
    ArchitecturalStyle,
    HeritageDesignation,
    Levels,
    HeightM,
    CurrentUse,
    HistoricUse,
    NotableEvent,
    OsmId,
    WikidataQid,
    WikipediaTitle,
    WikipediaSummary,
}

impl FactKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FactKey::Name => "name",
            FactKey::Address => "address",
            FactKey::Coordinates => "coordinates",
            FactKey::ConstructionStart => "construction_start",
            FactKey::ConstructionEnd => "construction_end",
            FactKey::Architect => "architect",
            FactKey::ArchitecturalStyle => "architectural_style",
            FactKey::HeritageDesignation => "heritage_designation",
            FactKey::Levels => "levels",
            FactKey::HeightM => "height_m",
            FactKey::CurrentUse => "current_use",
            FactKey::HistoricUse => "historic_use",
            FactKey::NotableEvent => "notable_event",
            FactKey::OsmId => "osm_id",
            FactKey::WikidataQid => "wikidata_qid",
            FactKey::WikipediaTitle => "wikipedia_title",
            FactKey::WikipediaSummary => "wikipedia_summary",
        }
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value for one fact key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum Attribute {
    Name(String),
    Address(String),
    Coordinates(LatLon),
    /// Year or ISO date.
    ConstructionStart(String),
    ConstructionEnd(String),
    Architect(String),
    ArchitecturalStyle(String),
    HeritageDesignation(String),
    Levels(u32),
    HeightM(f64),
    CurrentUse(String),
    HistoricUse(String),
    NotableEvent(String),
    /// `<osm_type>/<id>`, e.g. `way/12345`.
    OsmId(String),
    WikidataQid(String),
    WikipediaTitle(String),
    WikipediaSummary(String),
}

impl Attribute {
    pub fn key(&self) -> FactKey {
        match self {
            Attribute::Name(_) => FactKey::Name,
            Attribute::Address(_) => FactKey::Address,
            Attribute::Coordinates(_) => FactKey::Coordinates,
            Attribute::ConstructionStart(_) => FactKey::ConstructionStart,
            Attribute::ConstructionEnd(_) => FactKey::ConstructionEnd,
            Attribute::Architect(_) => FactKey::Architect,
            Attribute::ArchitecturalStyle(_) => FactKey::ArchitecturalStyle,
            Attribute::HeritageDesignation(_) => FactKey::HeritageDesignation,
            Attribute::Levels(_) => FactKey::Levels,
            Attribute::HeightM(_) => FactKey::HeightM,
            Attribute::CurrentUse(_) => FactKey::CurrentUse,
            Attribute::HistoricUse(_) => FactKey::HistoricUse,
            Attribute::NotableEvent(_) => FactKey::NotableEvent,
            Attribute::OsmId(_) => FactKey::OsmId,
            Attribute::WikidataQid(_) => FactKey::WikidataQid,
            Attribute::WikipediaTitle(_) => FactKey::WikipediaTitle,
            Attribute::WikipediaSummary(_) => FactKey::WikipediaSummary,
        }
    }

    /// Text form used in notes and the prose summary.
    pub fn display_value(&self) -> String {
        match self {
            Attribute::Coordinates(c) => format!("{:.5}, {:.5}", c.lat, c.lon),
            Attribute::Levels(n) => n.to_string(),
            Attribute::HeightM(h) => format!("{h} m"),
            Attribute::Name(s)
            | Attribute::Address(s)
            | Attribute::ConstructionStart(s)
            | Attribute::ConstructionEnd(s)
            | Attribute::Architect(s)
            | Attribute::ArchitecturalStyle(s)
            | Attribute::HeritageDesignation(s)
            | Attribute::CurrentUse(s)
            | Attribute::HistoricUse(s)
            | Attribute::NotableEvent(s)
            | Attribute::OsmId(s)
            | Attribute::WikidataQid(s)
            | Attribute::WikipediaTitle(s)
            | Attribute::WikipediaSummary(s) => s.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Attribute::Coordinates(_) | Attribute::Levels(_) | Attribute::HeightM(_) => None,
            Attribute::Name(s)
            | Attribute::Address(s)
            | Attribute::ConstructionStart(s)
            | Attribute::ConstructionEnd(s)
            | Attribute::Architect(s)
            | Attribute::ArchitecturalStyle(s)
            | Attribute::HeritageDesignation(s)
            | Attribute::CurrentUse(s)
            | Attribute::HistoricUse(s)
            | Attribute::NotableEvent(s)
            | Attribute::OsmId(s)
            | Attribute::WikidataQid(s)
            | Attribute::WikipediaTitle(s)
            | Attribute::WikipediaSummary(s) => Some(s),
        }
    }
}

/// The single surviving value for one key, with its provenance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fact {
    #[serde(flatten)]
    pub attribute: Attribute,
    pub evidence: Vec<Evidence>,
    pub verdict: Verdict,
    pub confidence: f64,
}

impl Fact {
    pub fn key(&self) -> FactKey {
        self.attribute.key()
    }
}
