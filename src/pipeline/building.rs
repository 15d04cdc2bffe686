use crate::config::PipelineConfig;
use crate::models::{
    Attribute, BuildingFactsResult, Canonical, Decision, Fact, FactKey, LatLon, LocationQuery,
    Verdict,
};
use crate::pipeline::bounded;
use crate::pipeline::candidates::{self, Candidate, CandidateGroup};
use crate::pipeline::summary::build_summary;
use crate::pipeline::traits::{
    FootprintProvider, Geocoder, KnowledgeGraphProvider, SummaryProvider, WikiLink,
};
use crate::scoring::{aggregate_facts, ConfidencePolicy, Stance};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

const POLICY: ConfidencePolicy = ConfidencePolicy::BUILDING_FACTS;

/// Primary language subtag of a locale, `en` when empty.
pub fn language_of(locale: &str) -> String {
    let lang = locale
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if lang.is_empty() {
        "en".to_string()
    } else {
        lang
    }
}

pub struct BuildingResolver<G, F, K, S>
where
    G: Geocoder,
    F: FootprintProvider,
    K: KnowledgeGraphProvider,
    S: SummaryProvider,
{
    pub geocoder: G,
    pub footprints: F,
    pub knowledge_graph: K,
    pub summaries: S,
    pub config: PipelineConfig,
}

struct Winner {
    fact: Fact,
    conflict: Option<String>,
}

impl<G, F, K, S> BuildingResolver<G, F, K, S>
where
    G: Geocoder,
    F: FootprintProvider,
    K: KnowledgeGraphProvider,
    S: SummaryProvider,
{
    /// Resolves verifiable facts about the building at `query`. Provider
    /// failures become notes; the call itself never fails.
    pub async fn resolve(&self, query: &LocationQuery) -> BuildingFactsResult {
        let access_date = self.config.access_date();
        let lang = language_of(&query.locale);
        let timeout = self.config.provider_timeout;
        let mut notes: Vec<String> = Vec::new();
        let mut found: Vec<Candidate> = Vec::new();

        let location = match (query.lat, query.lon) {
            (Some(lat), Some(lon)) => Some(LatLon::new(lat, lon)),
            _ => self.geocode(query, access_date, &mut found, &mut notes).await,
        };
        let Some(location) = location else {
            notes.push("no location could be resolved from the query.".to_string());
            info!("building resolution finished without a location");
            return BuildingFactsResult {
                query: query.clone(),
                canonical: Canonical {
                    address: query.address.clone(),
                    ..Canonical::default()
                },
                summary: None,
                facts: Vec::new(),
                verdict: Verdict::Uncertain,
                confidence: POLICY.no_evidence,
                notes,
            };
        };

        let mut tag_qid: Option<String> = None;
        let mut tag_wiki: Option<WikiLink> = None;
        match bounded(
            timeout,
            self.footprints
                .nearest_building(location.lat, location.lon, self.config.footprint_radius_m),
        )
        .await
        {
            Ok(Some(feature)) => {
                debug!(osm = %feature.osm_ref(), tags = feature.tags.len(), "footprint found");
                tag_qid = feature.tag("wikidata").map(str::to_string);
                tag_wiki = feature
                    .tag("wikipedia")
                    .and_then(|w| candidates::parse_wiki_tag(w, &lang));
                found.extend(candidates::from_tags(&feature, &lang, access_date));
            }
            Ok(None) => notes.push(format!(
                "no tagged building within {:.0} m.",
                self.config.footprint_radius_m
            )),
            Err(err) => {
                warn!(error = %err, "footprint lookup failed");
                notes.push(format!("footprint provider failed: {err}"));
            }
        }

        let mut qid = tag_qid;
        if qid.is_none() {
            if let Some(link) = &tag_wiki {
                match bounded(timeout, self.knowledge_graph.qid_for_title(&link.lang, &link.title)).await {
                    Ok(found_qid) => qid = found_qid,
                    Err(err) => {
                        warn!(error = %err, "entity lookup by title failed");
                        notes.push(format!("knowledge graph title lookup failed: {err}"));
                    }
                }
            }
        }

        let mut entity_wiki: Option<WikiLink> = None;
        if let Some(qid) = &qid {
            match bounded(timeout, self.knowledge_graph.entity(qid, &lang)).await {
                Ok(Some(entity)) => {
                    entity_wiki = entity.wikipedia.clone();
                    found.extend(candidates::from_entity(&entity, access_date));
                }
                Ok(None) => notes.push(format!("knowledge graph has no entity {qid}.")),
                Err(err) => {
                    warn!(%qid, error = %err, "entity fetch failed");
                    notes.push(format!("knowledge graph provider failed: {err}"));
                }
            }
        }

        let mut titles: Vec<WikiLink> = Vec::new();
        for link in entity_wiki.into_iter().chain(tag_wiki) {
            if !titles.contains(&link) {
                titles.push(link);
            }
        }
        for link in titles {
            match bounded(timeout, self.summaries.summary(&link.title, &link.lang)).await {
                Ok(Some(page)) => {
                    found.extend(candidates::from_summary(&page, &link.lang, access_date));
                    break;
                }
                Ok(None) => debug!(title = %link.title, "no summary"),
                Err(err) => {
                    warn!(title = %link.title, error = %err, "summary fetch failed");
                    notes.push(format!("summary provider failed for {}: {err}", link.title));
                }
            }
        }

        let mut facts: Vec<Fact> = Vec::new();
        let mut has_conflict = false;
        for (key, groups) in candidates::group(found) {
            let winner = self.pick(key, &groups);
            if let Some(conflict) = winner.conflict {
                has_conflict = true;
                notes.push(conflict);
            }
            facts.push(winner.fact);
        }

        let canonical = canonical_from(&facts, query, location);
        let summary = build_summary(&facts, self.config.summary_max_words);
        let overall = aggregate_facts(&facts, has_conflict, &POLICY);
        if let Some(note) = overall.notes {
            notes.push(note);
        }
        info!(
            facts = facts.len(),
            conflict = has_conflict,
            verdict = %overall.verdict,
            confidence = overall.confidence,
            "building resolution finished"
        );

        BuildingFactsResult {
            query: query.clone(),
            canonical,
            summary,
            facts,
            verdict: overall.verdict,
            confidence: overall.confidence,
            notes,
        }
    }

    async fn geocode(
        &self,
        query: &LocationQuery,
        access_date: NaiveDate,
        found: &mut Vec<Candidate>,
        notes: &mut Vec<String>,
    ) -> Option<LatLon> {
        let address = query.address.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
        match bounded(self.config.provider_timeout, self.geocoder.geocode(address, &query.locale)).await {
            Ok(Some(hit)) => {
                debug!(%address, lat = hit.lat, lon = hit.lon, "geocoded");
                found.push(candidates::from_geocode(&hit, address, access_date));
                Some(LatLon::new(hit.lat, hit.lon))
            }
            Ok(None) => {
                notes.push(format!("geocoder found no match for \"{address}\"."));
                None
            }
            Err(err) => {
                warn!(%address, error = %err, "geocoding failed");
                notes.push(format!("geocoder failed: {err}"));
                None
            }
        }
    }

    /// The most confident group wins, best source quality breaking ties.
    /// With rivals present the winner is re-decided with their evidence
    /// counted against it, so a conflicted key is never `true`.
    fn pick(&self, key: FactKey, groups: &[CandidateGroup]) -> Winner {
        let min_sources = self.config.min_sources;
        let decisions: Vec<Decision> = groups
            .iter()
            .map(|g| POLICY.decide(&g.evidence(), &[], min_sources))
            .collect();

        let mut best = 0;
        for i in 1..groups.len() {
            let (a, b) = (&decisions[i], &decisions[best]);
            if a.confidence > b.confidence
                || (a.confidence == b.confidence && groups[i].best_quality() > groups[best].best_quality())
            {
                best = i;
            }
        }

        let winner = &groups[best];
        let evidence = winner.evidence();
        if groups.len() == 1 {
            let decision = decisions[best].clone();
            return Winner {
                fact: Fact {
                    attribute: winner.representative().clone(),
                    evidence,
                    verdict: decision.verdict,
                    confidence: decision.confidence,
                },
                conflict: None,
            };
        }

        let mut pooled = evidence.clone();
        let mut stances = vec![Stance::Supports; evidence.len()];
        for (i, rival) in groups.iter().enumerate() {
            if i == best {
                continue;
            }
            for item in rival.evidence() {
                if !pooled.iter().any(|e| e.url == item.url) {
                    pooled.push(item);
                    stances.push(Stance::Contradicts);
                }
            }
        }
        let decision = POLICY.decide(&pooled, &stances, min_sources);
        let values: Vec<String> = groups
            .iter()
            .map(|g| g.representative().display_value())
            .collect();
        Winner {
            fact: Fact {
                attribute: winner.representative().clone(),
                evidence,
                verdict: decision.verdict,
                confidence: decision.confidence,
            },
            conflict: Some(format!("conflicting values for {key}: {}", values.join(" vs "))),
        }
    }
}

fn canonical_from(facts: &[Fact], query: &LocationQuery, location: LatLon) -> Canonical {
    let mut canonical = Canonical {
        address: query.address.clone(),
        lat: Some(location.lat),
        lon: Some(location.lon),
        ..Canonical::default()
    };
    for fact in facts {
        match &fact.attribute {
            Attribute::Address(address) => canonical.address = Some(address.clone()),
            Attribute::Coordinates(c) => {
                canonical.lat = Some(c.lat);
                canonical.lon = Some(c.lon);
            }
            Attribute::OsmId(osm) => match osm.split_once('/') {
                Some((kind, id)) => {
                    canonical.osm_type = Some(kind.to_string());
                    canonical.osm_id = Some(id.to_string());
                }
                None => canonical.osm_id = Some(osm.clone()),
            },
            Attribute::WikidataQid(qid) => canonical.wikidata_qid = Some(qid.clone()),
            Attribute::WikipediaTitle(title) => canonical.wikipedia_title = Some(title.clone()),
            _ => {}
        }
    }
    canonical
}
