use crate::models::evidence::Evidence;
use crate::models::verify::Verdict;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An atomic, self-contained assertion taken from narrative text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Claim {
    pub text: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
