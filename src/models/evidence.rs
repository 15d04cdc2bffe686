use crate::scoring::quality;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceQuality {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl SourceQuality {
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// One citation backing a fact or a claim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Evidence {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<NaiveDate>,
    pub access_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    pub source_quality: SourceQuality,
    pub why_trustworthy: String,
}

impl Evidence {
    /// Records a source seen during this run. Quality comes from the domain alone.
    pub fn observe(title: impl Into<String>, url: &str, access_date: NaiveDate) -> Self {
        let url = canonical_url(url);
        let assessment = quality::classify(&url, None);
        Self {
            title: title.into(),
            url,
            publish_date: None,
            access_date,
            snippet: None,
            source_quality: assessment.quality,
            why_trustworthy: assessment.why,
        }
    }

    /// Re-classifies with the page title taken into account.
    pub fn escalate_by_title(mut self) -> Self {
        let assessment = quality::classify(&self.url, Some(&self.title));
        self.source_quality = assessment.quality;
        self.why_trustworthy = assessment.why;
        self
    }

    pub fn with_snippet(mut self, snippet: Option<String>) -> Self {
        self.snippet = snippet
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn with_publish_date(mut self, publish_date: Option<NaiveDate>) -> Self {
        self.publish_date = publish_date;
        self
    }
}

/// Parses the leading `YYYY-MM-DD` of an ISO timestamp.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Drops the fragment; unparseable input is returned trimmed.
pub fn canonical_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn observe_strips_fragment_and_classifies() {
        let ev = Evidence::observe(
            "Ungargasse 5",
            "https://www.wien.gv.at/kultur/ungargasse#section",
            day(),
        );
        assert_eq!(ev.url, "https://www.wien.gv.at/kultur/ungargasse");
        assert_eq!(ev.source_quality, SourceQuality::High);
        assert!(!ev.why_trustworthy.is_empty());
    }

    #[test]
    fn access_date_serializes_as_iso_date() {
        let ev = Evidence::observe("x", "https://example.org/a", day());
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["access_date"], "2024-05-01");
        assert!(json.get("snippet").is_none());
    }

    #[test]
    fn parses_iso_prefix() {
        assert_eq!(parse_iso_date("2023-11-02T10:00:00Z"), NaiveDate::from_ymd_opt(2023, 11, 2));
        assert_eq!(parse_iso_date("yesterday"), None);
    }
}
