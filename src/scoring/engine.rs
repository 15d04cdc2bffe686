//! Verdict engine.
//!
//! `decide` applies the same ordered rules for both pipelines; only the
//! numbers differ, and those live in a named [`ConfidencePolicy`].

use crate::models::{Decision, Evidence, SourceQuality, Verdict};
use crate::scoring::conflict::Stance;

/// How raw confidence grows with the evidence behind a verdict.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreModel {
    /// `base` plus a per-item weight by quality.
    QualityWeighted {
        base: f64,
        high: f64,
        medium: f64,
        low: f64,
        cap: f64,
    },
    /// `base` plus `step` per source beyond the threshold (bounded by
    /// `max_step_bonus`) plus `high_bonus` when any source is high quality.
    Corroboration {
        base: f64,
        step: f64,
        max_step_bonus: f64,
        high_bonus: f64,
        cap: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfidencePolicy {
    pub name: &'static str,
    pub model: ScoreModel,
    pub no_evidence: f64,
    /// Ceiling for a `true` reached from one high-quality source.
    pub single_source_ceiling: f64,
    pub uncertain_ceiling: f64,
    pub mixed_ceiling: f64,
    pub false_ceiling: f64,
    /// Multiplier for an uncorroborated low-quality source.
    pub low_quality_scale: f64,
}

impl ConfidencePolicy {
    /// Free-text claims checked against web search hits.
    pub const WEB_SEARCH: ConfidencePolicy = ConfidencePolicy {
        name: "web-search",
        model: ScoreModel::QualityWeighted {
            base: 0.15,
            high: 0.35,
            medium: 0.20,
            low: 0.10,
            cap: 0.95,
        },
        no_evidence: 0.2,
        single_source_ceiling: 0.55,
        uncertain_ceiling: 0.45,
        mixed_ceiling: 0.6,
        false_ceiling: 0.7,
        low_quality_scale: 0.75,
    };

    /// Building facts built from map tags and the knowledge graph.
    pub const BUILDING_FACTS: ConfidencePolicy = ConfidencePolicy {
        name: "building-facts",
        model: ScoreModel::Corroboration {
            base: 0.55,
            step: 0.1,
            max_step_bonus: 0.25,
            high_bonus: 0.15,
            cap: 0.9,
        },
        no_evidence: 0.2,
        single_source_ceiling: 0.6,
        uncertain_ceiling: 0.4,
        mixed_ceiling: 0.6,
        false_ceiling: 0.7,
        low_quality_scale: 0.75,
    };

    pub fn cap(&self) -> f64 {
        match self.model {
            ScoreModel::QualityWeighted { cap, .. } | ScoreModel::Corroboration { cap, .. } => cap,
        }
    }

    pub fn ceiling(&self, verdict: Verdict) -> f64 {
        match verdict {
            Verdict::True => self.cap(),
            Verdict::Mixed => self.mixed_ceiling,
            Verdict::False => self.false_ceiling,
            Verdict::Uncertain => self.uncertain_ceiling,
        }
    }

    /// Raw confidence for a set of items, before any verdict ceiling.
    pub fn score(&self, items: &[&Evidence], min_sources: usize) -> f64 {
        match self.model {
            ScoreModel::QualityWeighted {
                base,
                high,
                medium,
                low,
                cap,
            } => {
                let sum: f64 = items
                    .iter()
                    .map(|e| match e.source_quality {
                        SourceQuality::High => high,
                        SourceQuality::Medium => medium,
                        SourceQuality::Low => low,
                    })
                    .sum();
                (base + sum).min(cap)
            }
            ScoreModel::Corroboration {
                base,
                step,
                max_step_bonus,
                high_bonus,
                cap,
            } => {
                let above = items.len().saturating_sub(min_sources) as f64;
                let mut score = base + (step * above).min(max_step_bonus);
                if items.iter().any(|e| e.source_quality == SourceQuality::High) {
                    score += high_bonus;
                }
                score.min(cap)
            }
        }
    }

    /// `decide(evidence, minSources)`; `stances` lines up with `evidence`,
    /// missing entries count as support.
    pub fn decide(&self, evidence: &[Evidence], stances: &[Stance], min_sources: usize) -> Decision {
        let min_sources = min_sources.max(1);
        let n = evidence.len();
        if n == 0 {
            return Decision::new(Verdict::Uncertain, self.no_evidence)
                .with_note("no supporting sources found.");
        }

        let (mut support, mut against): (Vec<&Evidence>, Vec<&Evidence>) = (Vec::new(), Vec::new());
        for (i, item) in evidence.iter().enumerate() {
            match stances.get(i).copied().unwrap_or(Stance::Supports) {
                Stance::Supports => support.push(item),
                Stance::Contradicts => against.push(item),
            }
        }

        if against.is_empty() {
            if n >= min_sources {
                let confidence = self.score(&support, min_sources).min(self.cap());
                return Decision::new(Verdict::True, confidence);
            }
            if n == 1 {
                let only = support[0];
                let raw = self.score(&support, min_sources);
                if only.source_quality == SourceQuality::High {
                    return Decision::new(Verdict::True, raw.min(self.single_source_ceiling))
                        .with_note("single high-quality source; independent corroboration advised.");
                }
                let mut confidence = raw.min(self.uncertain_ceiling);
                if only.source_quality == SourceQuality::Low {
                    confidence *= self.low_quality_scale;
                }
                return Decision::new(Verdict::Uncertain, confidence).with_note(format!(
                    "only one {} quality source; not corroborated.",
                    quality_word(only.source_quality)
                ));
            }
            let confidence = self.score(&support, min_sources).min(self.uncertain_ceiling);
            return Decision::new(Verdict::Uncertain, confidence).with_note(format!(
                "{n} sources found, {min_sources} required for confirmation."
            ));
        }

        if !support.is_empty() {
            let confidence = self.score(&support, min_sources).min(self.mixed_ceiling);
            return Decision::new(Verdict::Mixed, confidence).with_note(format!(
                "{} of {} sources contradict the rest.",
                against.len(),
                n
            ));
        }

        let confidence = self.score(&against, min_sources).min(self.false_ceiling);
        Decision::new(Verdict::False, confidence)
            .with_note(format!("all {n} sources contradict the statement."))
    }
}

fn quality_word(quality: SourceQuality) -> &'static str {
    match quality {
        SourceQuality::High => "high",
        SourceQuality::Medium => "medium",
        SourceQuality::Low => "low",
    }
}
