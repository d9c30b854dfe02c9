//! Lint rule plumbing: the `Rule` capability, issue records, and the
//! dedup-on-insert collector.
//!
//! A rule is static metadata (name, default config) paired with a `detect`
//! function; the host registry holds rules uniformly as trait objects.

use crate::ast::Stylesheet;
use std::collections::HashMap;
use std::fmt;

pub mod accessibility;

pub use accessibility::AccessibilityIssues;

/// How severe a finding is. Supplied by the invoking context, never computed
/// by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Per-invocation context handed to a rule by the registry.
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub rule_id: String,
    pub severity: Severity,
}

impl RuleContext {
    pub fn new(rule_id: impl Into<String>, severity: Severity) -> Self {
        RuleContext {
            rule_id: rule_id.into(),
            severity,
        }
    }
}

/// Declared configuration surface for a rule. Present as defaults for future
/// customization; the detection algorithms do not read it yet.
#[derive(Debug, Clone, Default)]
pub struct RuleConfig {
    /// Per-property override rules.
    pub per_property: HashMap<String, Vec<String>>,
    /// Global overrides.
    pub global: Vec<String>,
}

/// One finding. Identity for deduplication is the full tuple: findings
/// differing in any field are distinct even at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub rule_id: String,
    pub severity: Severity,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} [{}] {} ({})",
            self.line, self.column, self.severity, self.message, self.rule_id
        )
    }
}

/// Accumulates findings, dropping exact duplicates produced by structurally
/// repeated evaluation.
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<Issue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        IssueCollector::default()
    }

    /// Add a finding unless an identical one was already recorded.
    pub fn add_unique(&mut self, issue: Issue) {
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }

    /// Merge a batch of findings, deduplicating each.
    pub fn extend_unique(&mut self, issues: Vec<Issue>) {
        for issue in issues {
            self.add_unique(issue);
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

/// A lint rule: static metadata plus a pure detection pass over the tree.
pub trait Rule {
    /// Stable rule name, e.g. `accessibility-issues`.
    fn name(&self) -> &'static str;

    /// Declared configuration defaults.
    fn default_config(&self) -> RuleConfig;

    /// Run detection over a stylesheet, returning the deduplicated findings
    /// in document order. Never fails; inapplicable checks yield nothing.
    fn detect(&self, stylesheet: &Stylesheet, context: &RuleContext) -> Vec<Issue>;
}

/// The rules shipped with the linter.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(AccessibilityIssues)]
}
