pub mod claim;
pub mod evidence;
pub mod fact;
pub mod output;
pub mod verify;

pub use claim::Claim;
pub use evidence::{canonical_url, parse_iso_date, Evidence, SourceQuality};
pub use fact::{Attribute, Fact, FactKey, LatLon};
pub use output::{BuildingFactsResult, Canonical, FactCheckResult, LocationQuery};
pub use verify::{round_confidence, Decision, Verdict};
