//! Property tests for the scoring invariants.

use chrono::NaiveDate;
use placecheck::models::{Attribute, Evidence, Fact, SourceQuality, Verdict};
use placecheck::pipeline::summary::build_summary;
use placecheck::scoring::{canonical_key, merge, ConfidencePolicy, Stance};
use placecheck::text::word_count;
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Strategy helpers
// =============================================================================

fn quality_strategy() -> impl Strategy<Value = SourceQuality> {
    prop_oneof![
        Just(SourceQuality::Low),
        Just(SourceQuality::Medium),
        Just(SourceQuality::High),
    ]
}

fn weak_quality_strategy() -> impl Strategy<Value = SourceQuality> {
    prop_oneof![Just(SourceQuality::Low), Just(SourceQuality::Medium)]
}

fn policy_strategy() -> impl Strategy<Value = ConfidencePolicy> {
    prop_oneof![
        Just(ConfidencePolicy::WEB_SEARCH),
        Just(ConfidencePolicy::BUILDING_FACTS),
    ]
}

/// Evidence drawn from a small URL space so duplicates are common.
fn evidence_strategy() -> impl Strategy<Value = Evidence> {
    (
        0..4usize,
        0..3usize,
        any::<bool>(),
        quality_strategy(),
        prop::option::of(prop::collection::vec("[a-z]{1,8}", 1..40)),
        prop::option::of(1900..2024i32),
    )
        .prop_map(|(host, path, slash, quality, words, year)| {
            let www = if host % 2 == 0 { "www." } else { "" };
            let trailing = if slash { "/" } else { "" };
            let url = format!("https://{www}site{}.example/p{path}{trailing}", host / 2);
            let mut e = Evidence::observe("t", &url, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
                .with_snippet(words.map(|w| w.join(" ")))
                .with_publish_date(year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)));
            e.source_quality = quality;
            e
        })
}

/// An evidence list together with a shuffled copy of it.
fn shuffled_pair_strategy() -> impl Strategy<Value = (Vec<Evidence>, Vec<Evidence>)> {
    prop::collection::vec(evidence_strategy(), 0..20)
        .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
}

/// Best quality seen per merge key.
fn best_by_key(evidence: &[Evidence]) -> BTreeMap<String, SourceQuality> {
    let mut out = BTreeMap::new();
    for item in evidence {
        let best = out.entry(canonical_key(&item.url)).or_insert(item.source_quality);
        if item.source_quality > *best {
            *best = item.source_quality;
        }
    }
    out
}

fn items(qualities: &[SourceQuality]) -> Vec<Evidence> {
    qualities
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let mut e = Evidence::observe(
                "t",
                &format!("https://source{i}.example/page"),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            );
            e.source_quality = *q;
            e
        })
        .collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn merge_is_idempotent(evidence in prop::collection::vec(evidence_strategy(), 0..20)) {
        let once = merge(&evidence);
        prop_assert_eq!(merge(&once), once.clone());
        for item in &once {
            if let Some(snippet) = &item.snippet {
                prop_assert!(word_count(snippet) <= 25);
            }
        }
    }

    #[test]
    fn merge_keeps_best_quality(evidence in prop::collection::vec(evidence_strategy(), 1..20)) {
        let best = evidence.iter().map(|e| e.source_quality).max().unwrap();
        let merged = merge(&evidence);
        prop_assert!(merged.len() <= evidence.len());
        prop_assert_eq!(merged.iter().map(|e| e.source_quality).max().unwrap(), best);
    }

    #[test]
    fn merge_ignores_input_order((original, shuffled) in shuffled_pair_strategy()) {
        let a = merge(&original);
        let b = merge(&shuffled);
        prop_assert_eq!(a.len(), b.len());
        prop_assert_eq!(best_by_key(&a), best_by_key(&b));
        prop_assert_eq!(best_by_key(&a), best_by_key(&original));
    }

    #[test]
    fn corroboration_raises_confidence(
        policy in policy_strategy(),
        qualities in prop::collection::vec(quality_strategy(), 2..7),
    ) {
        let min_sources = qualities.len();
        let all = items(&qualities);
        let full = policy.decide(&all, &[], min_sources);
        let partial = policy.decide(&all[..all.len() - 1], &[], min_sources);
        prop_assert_eq!(full.verdict, Verdict::True);
        prop_assert!(full.confidence > partial.confidence);
    }

    #[test]
    fn single_weak_source_never_exceeds_ceiling(
        policy in policy_strategy(),
        quality in weak_quality_strategy(),
        min_sources in 1..5usize,
    ) {
        let one = items(&[quality]);
        let decision = policy.decide(&one, &[Stance::Supports], min_sources);
        prop_assert!(decision.confidence <= 0.6);
    }

    #[test]
    fn contradictions_never_read_true(
        policy in policy_strategy(),
        stances in prop::collection::vec(any::<bool>(), 1..6),
    ) {
        prop_assume!(stances.iter().any(|s| *s));
        let qualities = vec![SourceQuality::High; stances.len()];
        let stances: Vec<Stance> = stances
            .iter()
            .map(|against| if *against { Stance::Contradicts } else { Stance::Supports })
            .collect();
        let decision = policy.decide(&items(&qualities), &stances, 2);
        prop_assert_ne!(decision.verdict, Verdict::True);
    }

    #[test]
    fn summary_is_bounded(
        name in "[A-Za-z ]{0,200}",
        architect in "[A-Za-z ,.]{0,400}",
        style in "[a-z ]{0,400}",
        max_words in 1..150usize,
    ) {
        let facts = vec![
            Fact { attribute: Attribute::Name(name), evidence: Vec::new(), verdict: Verdict::True, confidence: 0.9 },
            Fact { attribute: Attribute::Architect(architect), evidence: Vec::new(), verdict: Verdict::True, confidence: 0.7 },
            Fact { attribute: Attribute::ArchitecturalStyle(style), evidence: Vec::new(), verdict: Verdict::True, confidence: 0.6 },
        ];
        if let Some(summary) = build_summary(&facts, max_words) {
            prop_assert!(word_count(&summary) <= max_words);
        }
    }
}
