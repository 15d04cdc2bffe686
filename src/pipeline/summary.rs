use crate::models::{Fact, FactKey};
use crate::text::trim_words;

/// Facts below this confidence never reach the prose summary.
pub const SUMMARY_CONFIDENCE_FLOOR: f64 = 0.6;

fn confident(facts: &[Fact], key: FactKey) -> Option<String> {
    facts
        .iter()
        .find(|f| f.key() == key && f.confidence >= SUMMARY_CONFIDENCE_FLOOR)
        .map(|f| f.attribute.display_value())
}

/// Short prose built from confident facts only, in the order identity,
/// construction, architect, style, heritage, current use. `None` when no
/// section qualifies.
pub fn build_summary(facts: &[Fact], max_words: usize) -> Option<String> {
    let mut sections: Vec<String> = Vec::new();

    match (confident(facts, FactKey::Name), confident(facts, FactKey::Address)) {
        (Some(name), Some(address)) => sections.push(format!("{name} is located at {address}.")),
        (Some(name), None) => sections.push(format!("{name} is a documented building.")),
        (None, Some(address)) => sections.push(format!("The building stands at {address}.")),
        (None, None) => {}
    }

    match (
        confident(facts, FactKey::ConstructionStart),
        confident(facts, FactKey::ConstructionEnd),
    ) {
        (Some(start), Some(end)) => sections.push(format!(
            "Construction began in {start} and was completed in {end}."
        )),
        (Some(start), None) => sections.push(format!("Construction began in {start}.")),
        (None, Some(end)) => sections.push(format!("It was completed in {end}.")),
        (None, None) => {}
    }

    if let Some(architect) = confident(facts, FactKey::Architect) {
        sections.push(format!("It was designed by {architect}."));
    }
    if let Some(style) = confident(facts, FactKey::ArchitecturalStyle) {
        sections.push(format!("Its architectural style is {style}."));
    }
    if let Some(heritage) = confident(facts, FactKey::HeritageDesignation) {
        sections.push(format!("It is a protected heritage site ({heritage})."));
    }
    if let Some(current) = confident(facts, FactKey::CurrentUse) {
        sections.push(format!("Today it is used as {current}."));
    }

    if sections.is_empty() || max_words == 0 {
        return None;
    }
    Some(trim_words(&sections.join(" "), max_words))
}
