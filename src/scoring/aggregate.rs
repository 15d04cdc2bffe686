use crate::models::{Claim, Decision, Fact, Verdict};
use crate::scoring::engine::ConfidencePolicy;

/// Overall verdict for a fact-check run.
///
/// Claims that agree pass their verdict through. Disagreement that involves a
/// `false` or `mixed` claim is `mixed`; any other disagreement is `uncertain`.
pub fn aggregate_claims(claims: &[Claim], policy: &ConfidencePolicy) -> Decision {
    if claims.is_empty() {
        return Decision::new(Verdict::Uncertain, policy.no_evidence)
            .with_note("no checkable claims found.");
    }
    let first = claims[0].verdict;
    let verdict = if claims.iter().all(|c| c.verdict == first) {
        first
    } else if claims
        .iter()
        .any(|c| matches!(c.verdict, Verdict::False | Verdict::Mixed))
    {
        Verdict::Mixed
    } else {
        Verdict::Uncertain
    };
    let mean = claims.iter().map(|c| c.confidence).sum::<f64>() / claims.len() as f64;
    Decision::new(verdict, mean.min(policy.ceiling(verdict)))
}

/// Overall verdict for a building: any conflict makes it `mixed`; otherwise
/// it is `true` once at least half the facts are individually `true`.
pub fn aggregate_facts(facts: &[Fact], has_conflict: bool, policy: &ConfidencePolicy) -> Decision {
    if facts.is_empty() {
        return Decision::new(Verdict::Uncertain, policy.no_evidence)
            .with_note("no facts could be established.");
    }
    let confirmed = facts.iter().filter(|f| f.verdict == Verdict::True).count();
    let verdict = if has_conflict {
        Verdict::Mixed
    } else if confirmed * 2 >= facts.len() {
        Verdict::True
    } else {
        Verdict::Uncertain
    };
    let mean = facts.iter().map(|f| f.confidence).sum::<f64>() / facts.len() as f64;
    Decision::new(verdict, mean.min(policy.ceiling(verdict)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(verdict: Verdict, confidence: f64) -> Claim {
        Claim {
            text: "x".into(),
            verdict,
            confidence,
            evidence: Vec::new(),
            notes: None,
        }
    }

    #[test]
    fn unanimous_claims_pass_through() {
        let d = aggregate_claims(
            &[claim(Verdict::True, 0.7), claim(Verdict::True, 0.9)],
            &ConfidencePolicy::WEB_SEARCH,
        );
        assert_eq!(d.verdict, Verdict::True);
        assert_eq!(d.confidence, 0.8);
    }

    #[test]
    fn disagreement_rules() {
        let p = ConfidencePolicy::WEB_SEARCH;
        let mixed = aggregate_claims(&[claim(Verdict::True, 0.7), claim(Verdict::False, 0.6)], &p);
        assert_eq!(mixed.verdict, Verdict::Mixed);
        let unsure = aggregate_claims(&[claim(Verdict::True, 0.7), claim(Verdict::Uncertain, 0.2)], &p);
        assert_eq!(unsure.verdict, Verdict::Uncertain);
        assert!(unsure.confidence <= p.uncertain_ceiling);
    }

    #[test]
    fn empty_inputs_are_lowest_confidence() {
        let d = aggregate_claims(&[], &ConfidencePolicy::WEB_SEARCH);
        assert_eq!(d.verdict, Verdict::Uncertain);
        assert_eq!(d.confidence, 0.2);
        let d = aggregate_facts(&[], false, &ConfidencePolicy::BUILDING_FACTS);
        assert_eq!(d.verdict, Verdict::Uncertain);
    }
}
