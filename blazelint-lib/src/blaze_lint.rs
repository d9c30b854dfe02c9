use crate::parser::parse_stylesheet;
use crate::rules::{default_rules, Issue, RuleContext, Severity};
use crate::Result;

/// Parse a stylesheet and run every registered rule over it.
///
/// Each rule runs with its own context; the rule id is the rule's name and
/// the severity is supplied by the caller. Findings come back in document
/// order per rule, already deduplicated.
pub fn lint_stylesheet(source: &str, severity: Severity) -> Result<Vec<Issue>> {
    let stylesheet = parse_stylesheet(source)?;
    let mut issues = Vec::new();
    for rule in default_rules() {
        let context = RuleContext::new(rule.name(), severity);
        issues.extend(rule.detect(&stylesheet, &context));
    }
    Ok(issues)
}
