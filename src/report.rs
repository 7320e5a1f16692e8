//! Human-readable report formatting for audit violations
//!
//! Pure string building: the formatter never touches the browser or the
//! filesystem, so its output is a deterministic function of the violation
//! sequence it is given.

use crate::results::RuleResult;

/// Message returned when the violations sequence is empty.
pub const NO_VIOLATIONS_MESSAGE: &str = "No accessibility violations found.";

/// Format an ordered sequence of violations as a multi-line text report.
///
/// Layout: a header stating the count, then one section per violation with
/// the rule id, description, help URL, impact level and tags, followed by a
/// numbered `Target:` line for every affected selector and the messages of
/// the engine's `all`, `any`, and `none` sub-checks.
pub fn format_violations(violations: &[RuleResult]) -> String {
    if violations.is_empty() {
        return NO_VIOLATIONS_MESSAGE.to_string();
    }

    let mut report = format!("Found {} accessibility violations:", violations.len());

    for violation in violations {
        report.push_str("\n\n\nRule Violated:\n");
        report.push_str(&violation.id);
        report.push_str(" - ");
        report.push_str(&violation.description);
        report.push_str("\n\tURL: ");
        report.push_str(&violation.help_url);
        report.push_str("\n\tImpact Level: ");
        report.push_str(violation.impact.map_or("unknown", |i| i.as_str()));

        report.push_str("\n\tTags:");
        for tag in &violation.tags {
            report.push(' ');
            report.push_str(tag);
        }

        report.push_str("\n\tElements Affected:");
        let mut index = 1;
        for node in &violation.nodes {
            for target in &node.target {
                report.push_str(&format!("\n\t{index}) Target: {target}"));
                index += 1;
            }
            for check in node.all.iter().chain(&node.any).chain(&node.none) {
                report.push_str("\n\t\t");
                report.push_str(&check.message);
            }
        }
    }

    report
}
