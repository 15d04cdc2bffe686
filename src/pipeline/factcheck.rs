use crate::config::PipelineConfig;
use crate::models::{parse_iso_date, Claim, Evidence, FactCheckResult};
use crate::pipeline::bounded;
use crate::pipeline::claims::ClaimExtractor;
use crate::pipeline::queries::build_queries;
use crate::pipeline::traits::{SearchHit, SearchOptions, WebSearchTool};
use crate::scoring::{aggregate_claims, merge, stances, ConfidencePolicy, SNIPPET_MAX_WORDS};
use crate::text::{keywords, tokens};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

const POLICY: ConfidencePolicy = ConfidencePolicy::WEB_SEARCH;

/// Words of page text kept before the first keyword when cutting a snippet.
const SNIPPET_LEAD_WORDS: usize = 5;

pub struct FactCheckPipeline<S>
where
    S: WebSearchTool,
{
    pub search: S,
    pub config: PipelineConfig,
}

impl<S> FactCheckPipeline<S>
where
    S: WebSearchTool,
{
    pub fn new(search: S, config: PipelineConfig) -> Self {
        Self { search, config }
    }

    /// Extracts claims from `paragraph` and checks each against web search.
    /// Provider failures end up in `gaps_or_caveats`, never as an error.
    pub async fn check(&self, paragraph: &str) -> FactCheckResult {
        let access_date = self.config.access_date();
        let extraction = ClaimExtractor::new(&self.config).extract_detailed(paragraph);
        let mut caveats: Vec<String> = Vec::new();
        if extraction.padded > 0 {
            caveats.push(format!(
                "{} generic claim(s) added to reach {} claims; they may not be independently meaningful.",
                extraction.padded,
                self.config.claim_floor.unwrap_or_default()
            ));
        }

        let mut claims = Vec::with_capacity(extraction.claims.len());
        for text in extraction.claims {
            claims.push(self.check_claim(text, access_date, &mut caveats).await);
        }

        let overall = aggregate_claims(&claims, &POLICY);
        if let Some(note) = overall.notes {
            push_note(&mut caveats, note);
        }
        info!(
            claims = claims.len(),
            verdict = %overall.verdict,
            confidence = overall.confidence,
            "fact check finished"
        );
        FactCheckResult {
            question: paragraph.trim().to_string(),
            verdict: overall.verdict,
            confidence: overall.confidence,
            claims,
            gaps_or_caveats: caveats,
        }
    }

    async fn check_claim(
        &self,
        text: String,
        access_date: NaiveDate,
        caveats: &mut Vec<String>,
    ) -> Claim {
        let wanted = keywords(&text);
        let options = SearchOptions {
            recency_days: self.config.search_recency_days,
            max: self.config.search_max_results,
        };

        let mut collected: Vec<Evidence> = Vec::new();
        for query in build_queries(&text, &self.config.locality) {
            let hits = match bounded(self.config.provider_timeout, self.search.search(&query, &options)).await {
                Ok(hits) => hits,
                Err(err) => {
                    warn!(%query, error = %err, "search failed");
                    push_note(caveats, format!("web search failed: {err}"));
                    continue;
                }
            };
            debug!(%query, hits = hits.len(), "search");
            for hit in hits {
                if let Some(item) = self.evidence_for(hit, &wanted, access_date, caveats).await {
                    collected.push(item);
                }
            }
        }

        let evidence = merge(&collected);
        let stances = stances(&evidence, &wanted);
        let decision = POLICY.decide(&evidence, &stances, self.config.min_sources);
        debug!(claim = %text, sources = evidence.len(), verdict = %decision.verdict, "claim decided");
        Claim {
            text,
            verdict: decision.verdict,
            confidence: decision.confidence,
            evidence,
            notes: decision.notes,
        }
    }

    /// Turns a search hit into evidence, opening the page when the hit has
    /// no snippet. Irrelevant and unreachable hits yield `None`.
    async fn evidence_for(
        &self,
        hit: SearchHit,
        wanted: &[String],
        access_date: NaiveDate,
        caveats: &mut Vec<String>,
    ) -> Option<Evidence> {
        let mut url = hit.url.clone();
        let mut snippet = hit.snippet.clone();
        if snippet.is_none() {
            match bounded(self.config.provider_timeout, self.search.open_url(&hit.url)).await {
                Ok(page) if page.ok => {
                    url = page.final_url;
                    snippet = page.text.as_deref().and_then(|t| snippet_window(t, wanted));
                }
                Ok(_) => {
                    push_note(caveats, format!("dropped unreachable source {}", hit.url));
                    return None;
                }
                Err(err) => {
                    warn!(url = %hit.url, error = %err, "open failed");
                    push_note(caveats, format!("could not open {}: {err}", hit.url));
                    return None;
                }
            }
        }

        if !is_relevant(&hit.title, snippet.as_deref(), wanted) {
            debug!(url = %url, "irrelevant hit dropped");
            return None;
        }

        Some(
            Evidence::observe(hit.title, &url, access_date)
                .with_snippet(snippet)
                .with_publish_date(hit.publish_date_iso.as_deref().and_then(parse_iso_date))
                .escalate_by_title(),
        )
    }
}

fn push_note(notes: &mut Vec<String>, note: String) {
    if !notes.contains(&note) {
        notes.push(note);
    }
}

/// A hit is relevant when its title or snippet shares a keyword with the claim.
fn is_relevant(title: &str, snippet: Option<&str>, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let text = format!("{title} {}", snippet.unwrap_or_default());
    let have = tokens(&text);
    wanted.iter().any(|w| have.contains(w))
}

/// Page text around the first keyword, one word longer than a snippet so
/// that merge marks the cut.
fn snippet_window(text: &str, wanted: &[String]) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let first = words
        .iter()
        .position(|w| tokens(w).iter().any(|t| wanted.contains(t)))
        .unwrap_or(0);
    let start = first.saturating_sub(SNIPPET_LEAD_WORDS);
    let end = (start + SNIPPET_MAX_WORDS + 1).min(words.len());
    Some(words[start..end].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_now;
    use crate::error::ProviderError;
    use crate::models::{SourceQuality, Verdict};
    use crate::pipeline::mock::StaticSearch;
    use crate::pipeline::traits::OpenedPage;

    fn config() -> PipelineConfig {
        PipelineConfig {
            now: parse_now("2024-06-01"),
            ..PipelineConfig::default()
        }
    }

    fn hit(title: &str, url: &str, snippet: Option<&str>) -> SearchHit {
        SearchHit {
            title: title.into(),
            url: url.into(),
            snippet: snippet.map(str::to_string),
            publish_date_iso: None,
        }
    }

    #[test]
    fn window_starts_near_keyword() {
        let text = (0..100).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ") + " Ungargasse tail";
        let out = snippet_window(&text, &["ungargasse".to_string()]).unwrap();
        assert!(out.starts_with("w95 "));
        assert!(out.ends_with("tail"));
    }

    #[test]
    fn relevance_needs_shared_keyword() {
        let wanted = keywords("Ungargasse 5 served as the Rothschild Hospital");
        assert!(is_relevant("Rothschild-Spital", Some("hospital history"), &wanted));
        assert!(!is_relevant("Cat pictures", None, &wanted));
    }

    #[tokio::test]
    async fn snippetless_hits_are_opened() {
        let search = StaticSearch::default()
            .with_hit(hit("Ungargasse archive", "https://example.org/a", None))
            .with_page(
                "https://example.org/a",
                OpenedPage {
                    ok: true,
                    final_url: "https://example.org/a/".into(),
                    text: Some("Records show Ungargasse 5 was completed in 1871.".into()),
                },
            )
            .with_hit(hit("Ungargasse gone", "https://dead.example/b", None))
            .with_page(
                "https://dead.example/b",
                OpenedPage {
                    ok: false,
                    final_url: "https://dead.example/b".into(),
                    text: None,
                },
            );
        let pipeline = FactCheckPipeline::new(search, config());
        let result = pipeline.check("Ungargasse 5 was completed in 1871.").await;
        let first = &result.claims[0];
        assert_eq!(first.evidence.len(), 1);
        assert_eq!(first.evidence[0].url, "https://example.org/a/");
        assert!(first.evidence[0].snippet.as_deref().unwrap().contains("1871"));
        assert_eq!(first.evidence[0].source_quality, SourceQuality::High);
        assert!(result
            .gaps_or_caveats
            .iter()
            .any(|c| c.contains("dead.example")));
    }

    #[tokio::test]
    async fn failing_search_is_a_caveat() {
        let pipeline = FactCheckPipeline::new(StaticSearch::failing(ProviderError::Status(502)), config());
        let result = pipeline.check("Ungargasse 5 was completed in 1871.").await;
        assert_eq!(result.verdict, Verdict::Uncertain);
        assert!(result
            .gaps_or_caveats
            .iter()
            .any(|c| c.contains("web search failed")));
        assert!(result.claims.iter().all(|c| c.confidence <= 0.5));
    }

    #[tokio::test]
    async fn empty_paragraph_is_uncertain() {
        let pipeline = FactCheckPipeline::new(StaticSearch::default(), config());
        let result = pipeline.check("  ").await;
        assert!(result.claims.is_empty());
        assert_eq!(result.verdict, Verdict::Uncertain);
        assert_eq!(result.confidence, 0.2);
    }
}
