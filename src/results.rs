//! Result structures returned by the axe-core engine
//!
//! These types mirror the JSON shape that `axe.run()` resolves with. The
//! engine owns the schema; unknown fields are carried through untouched via
//! serde flattening so a decoded result can be re-serialized without loss.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Severity classification axe-core attaches to a rule.
///
/// The derived ordering is minor < moderate < serious < critical, used only
/// by the [`ImpactFilter::at_least`] convenience constructor. Callers that
/// disagree with that ordering build their own include set instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Minor => "minor",
            Impact::Moderate => "moderate",
            Impact::Serious => "serious",
            Impact::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete audit result: the four buckets axe-core reports, plus whatever
/// metadata the engine version attaches (url, timestamp, test engine info).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AxeResults {
    #[serde(default)]
    pub violations: Vec<RuleResult>,
    #[serde(default)]
    pub incomplete: Vec<RuleResult>,
    #[serde(default)]
    pub passes: Vec<RuleResult>,
    #[serde(default)]
    pub inapplicable: Vec<RuleResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AxeResults {
    /// Re-key violations by rule id for direct lookup, preserving nothing
    /// beyond references into this result.
    pub fn violations_by_id(&self) -> BTreeMap<&str, &RuleResult> {
        self.violations.iter().map(|v| (v.id.as_str(), v)).collect()
    }

    /// Copy of this result with the violations bucket reduced by `filter`.
    /// The other buckets pass through unchanged.
    pub fn filtered(&self, filter: &ImpactFilter) -> AxeResults {
        AxeResults {
            violations: filter.apply(&self.violations),
            ..self.clone()
        }
    }
}

/// A single rule outcome with the elements it matched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: String,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<NodeResult>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One affected DOM node: its target selectors and the outcomes of the
/// engine's three sub-check categories.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub all: Vec<CheckResult>,
    #[serde(default)]
    pub any: Vec<CheckResult>,
    #[serde(default)]
    pub none: Vec<CheckResult>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Metadata for a single accessibility rule, as returned by `axe.getRules()`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub rule_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Inclusion decision for violations based on their declared impact.
///
/// The cutoff semantics are caller configuration: an unrestricted filter
/// includes everything, an explicit set includes exactly what it names, and
/// [`at_least`](ImpactFilter::at_least) derives a set from the canonical
/// severity ordering. Entries with no declared impact only survive the
/// unrestricted filter.
#[derive(Debug, Clone, Default)]
pub struct ImpactFilter {
    included: Option<HashSet<Impact>>,
}

impl ImpactFilter {
    /// No threshold: every violation is included, scored or not.
    pub fn all() -> Self {
        Self { included: None }
    }

    /// Include exactly the given impact levels.
    pub fn include(impacts: impl IntoIterator<Item = Impact>) -> Self {
        Self {
            included: Some(impacts.into_iter().collect()),
        }
    }

    /// Include `min` and everything above it in the canonical ordering.
    pub fn at_least(min: Impact) -> Self {
        Self::include(
            [Impact::Minor, Impact::Moderate, Impact::Serious, Impact::Critical]
                .into_iter()
                .filter(|i| *i >= min),
        )
    }

    pub fn includes(&self, impact: Option<Impact>) -> bool {
        match &self.included {
            None => true,
            Some(set) => impact.map_or(false, |i| set.contains(&i)),
        }
    }

    /// Retain the violations this filter includes. Pure and idempotent:
    /// applying it to its own output returns the same sequence.
    pub fn apply(&self, violations: &[RuleResult]) -> Vec<RuleResult> {
        violations
            .iter()
            .filter(|v| self.includes(v.impact))
            .cloned()
            .collect()
    }
}

impl From<Option<Impact>> for ImpactFilter {
    fn from(min: Option<Impact>) -> Self {
        match min {
            None => ImpactFilter::all(),
            Some(min) => ImpactFilter::at_least(min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(id: &str, impact: Option<Impact>) -> RuleResult {
        RuleResult {
            id: id.to_string(),
            impact,
            ..Default::default()
        }
    }

    #[test]
    fn impact_ordering() {
        assert!(Impact::Minor < Impact::Moderate);
        assert!(Impact::Moderate < Impact::Serious);
        assert!(Impact::Serious < Impact::Critical);
    }

    #[test]
    fn impact_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_string(&Impact::Serious).unwrap(), "\"serious\"");
        let parsed: Impact = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Impact::Critical);
    }

    #[test]
    fn filter_all_includes_unscored() {
        let filter = ImpactFilter::all();
        assert!(filter.includes(None));
        assert!(filter.includes(Some(Impact::Minor)));
    }

    #[test]
    fn filter_at_least_uses_canonical_ordering() {
        let filter = ImpactFilter::at_least(Impact::Serious);
        assert!(!filter.includes(Some(Impact::Minor)));
        assert!(!filter.includes(Some(Impact::Moderate)));
        assert!(filter.includes(Some(Impact::Serious)));
        assert!(filter.includes(Some(Impact::Critical)));
        assert!(!filter.includes(None));
    }

    #[test]
    fn filter_explicit_set() {
        let filter = ImpactFilter::include([Impact::Minor, Impact::Critical]);
        assert!(filter.includes(Some(Impact::Minor)));
        assert!(!filter.includes(Some(Impact::Serious)));
        assert!(filter.includes(Some(Impact::Critical)));
    }

    #[test]
    fn filter_is_idempotent() {
        let violations = vec![
            violation("one", Some(Impact::Minor)),
            violation("two", Some(Impact::Serious)),
            violation("three", None),
            violation("four", Some(Impact::Critical)),
        ];

        for filter in [
            ImpactFilter::all(),
            ImpactFilter::at_least(Impact::Moderate),
            ImpactFilter::include([Impact::Critical]),
        ] {
            let once = filter.apply(&violations);
            let twice = filter.apply(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn violations_by_id() {
        let results = AxeResults {
            violations: vec![
                violation("image-alt", Some(Impact::Critical)),
                violation("label", Some(Impact::Serious)),
            ],
            ..Default::default()
        };

        let by_id = results.violations_by_id();
        assert_eq!(by_id.len(), 2);
        assert_eq!(by_id["label"].impact, Some(Impact::Serious));
        assert!(!by_id.contains_key("accesskeys"));
    }

    #[test]
    fn decode_defaults_missing_buckets_to_empty() {
        let results: AxeResults = serde_json::from_str(r#"{"violations": []}"#).unwrap();
        assert!(results.violations.is_empty());
        assert!(results.incomplete.is_empty());
        assert!(results.passes.is_empty());
        assert!(results.inapplicable.is_empty());
    }

    #[test]
    fn unknown_fields_round_trip() {
        let raw = serde_json::json!({
            "violations": [],
            "incomplete": [],
            "passes": [],
            "inapplicable": [],
            "testEngine": {"name": "axe-core", "version": "4.4.1"}
        });

        let decoded: AxeResults = serde_json::from_value(raw.clone()).unwrap();
        assert!(decoded.extra.contains_key("testEngine"));
        let reencoded = serde_json::to_value(&decoded).unwrap();
        assert_eq!(reencoded["testEngine"]["version"], "4.4.1");
    }
}
