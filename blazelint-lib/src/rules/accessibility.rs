//! Accessibility lint rule.
//!
//! Flags stylesheet patterns that cause problems for assistive technology
//! and low-vision users: interaction styling that depends on one input
//! device, content hidden from screen readers, absolute-unit sizing,
//! insufficient color contrast, absolutely positioned content, and removed
//! focus outlines.

use crate::ast::{Declaration, Position, Selector, SimpleSelector, StyleRule, Stylesheet, Value, ValueComponent};
use crate::rules::{Issue, IssueCollector, Rule, RuleConfig, RuleContext};

/// Minimum brightness difference between foreground and background.
const BRIGHTNESS: f64 = 126.0;
/// Minimum hue difference between foreground and background.
const HUE: u32 = 501;

/// Content hiding methods that hide content from assistive technology.
const HIDDEN_DISALLOWED: &[(&str, &[&str])] = &[
    ("display", &["none"]),
    ("height", &["0"]),
    ("overflow", &["hidden"]),
    ("visibility", &["hidden"]),
    ("width", &["0"]),
];

const RELATIVE_UNITS: &[&str] = &["em", "rem"];

/// Absolute units for font-size, margin, or padding cause issues related to
/// visual acuity; only these relative units are allowed.
const UNITS_ALLOWED: &[(&str, &[&str])] = &[
    ("font-size", RELATIVE_UNITS),
    ("margin", RELATIVE_UNITS),
    ("padding", RELATIVE_UNITS),
];

fn table_lookup<'t>(table: &'t [(&str, &[&str])], property: &str) -> Option<&'t [&'t str]> {
    table
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, values)| *values)
}

/// An RGB triple extracted from a declaration value. A channel that could
/// not be determined stays unset; any unset channel makes the color invalid
/// and excludes it from contrast computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ColorValue {
    red: Option<u8>,
    green: Option<u8>,
    blue: Option<u8>,
}

impl ColorValue {
    fn channels(&self) -> Option<(u8, u8, u8)> {
        Some((self.red?, self.green?, self.blue?))
    }

    fn is_valid(&self) -> bool {
        self.channels().is_some()
    }

    /// Assign a value to the first unset channel, in red, green, blue order.
    fn assign_next(&mut self, value: u8) {
        if self.red.is_none() {
            self.red = Some(value);
        } else if self.green.is_none() {
            self.green = Some(value);
        } else if self.blue.is_none() {
            self.blue = Some(value);
        }
        // fourth and later assignments (e.g. alpha) are ignored
    }
}

/// Per-rule booleans derived once from every selector sharing the block.
#[derive(Debug, Clone, Copy, Default)]
struct InteractionFlags {
    active: bool,
    hover: bool,
    focus: bool,
    before: bool,
    after: bool,
}

/// Derive the interaction/pseudo-element flags for a declaration block. The
/// flags are block-scoped: each selector in a comma group contributes to the
/// same set.
fn classify_selectors(selectors: &[Selector]) -> InteractionFlags {
    let mut flags = InteractionFlags::default();
    for selector in selectors {
        for part in &selector.parts {
            let name = match part {
                SimpleSelector::PseudoClass(name) | SimpleSelector::PseudoElement(name) => name,
                _ => continue,
            };
            match name.as_str() {
                "active" => flags.active = true,
                "hover" => flags.hover = true,
                "focus" => flags.focus = true,
                "before" => flags.before = true,
                "after" => flags.after = true,
                _ => {}
            }
        }
    }
    flags
}

fn hex_channel(digits: &str) -> Option<u8> {
    u8::from_str_radix(digits, 16).ok()
}

/// Parse a hex color literal (`aabbcc` or shorthand `abc`, case-insensitive)
/// into channels. Other lengths yield an invalid color.
fn color_from_hex(hex: &str) -> ColorValue {
    let mut color = ColorValue::default();
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return color;
    }
    match hex.len() {
        6 => {
            color.red = hex_channel(&hex[0..2]);
            color.green = hex_channel(&hex[2..4]);
            color.blue = hex_channel(&hex[4..6]);
        }
        3 => {
            // 3-digit shorthand doubles each digit: `a` -> `aa`
            let doubled: Vec<String> = hex.chars().map(|c| format!("{c}{c}")).collect();
            color.red = hex_channel(&doubled[0]);
            color.green = hex_channel(&doubled[1]);
            color.blue = hex_channel(&doubled[2]);
        }
        _ => {}
    }
    color
}

/// Extract an RGB color from a declaration value.
///
/// A hex literal wins; otherwise the first function call is scanned and its
/// purely numeric arguments are assigned positionally to red, green, blue.
/// Keywords, percentages, and variables are skipped without consuming a
/// slot; a fourth numeric argument (alpha) is ignored. Named colors and
/// variable references are not resolved and yield an invalid color.
fn extract_color(value: &Value) -> ColorValue {
    for component in &value.components {
        if let ValueComponent::HexColor(hex) = component {
            return color_from_hex(hex);
        }
    }

    let mut color = ColorValue::default();
    for component in &value.components {
        if let ValueComponent::Function { args, .. } = component {
            for arg in args {
                if let ValueComponent::Number(n) = arg {
                    color.assign_next(n.clamp(0.0, 255.0) as u8);
                }
            }
            break;
        }
    }
    color
}

/// Perceptual luma approximation of a color.
fn color_brightness((red, green, blue): (u8, u8, u8)) -> f64 {
    (299.0 * red as f64 + 587.0 * green as f64 + 114.0 * blue as f64) / 1000.0
}

/// Sum of per-channel absolute differences; a coarse proxy for how
/// distinguishable two colors are.
fn color_hue_difference(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> u32 {
    let diff = |a: u8, b: u8| (a as i32 - b as i32).unsigned_abs();
    diff(fg.0, bg.0) + diff(fg.1, bg.1) + diff(fg.2, bg.2)
}

/// Both thresholds must be met for the pair to pass; failing either raises
/// one issue per style rule.
fn insufficient_contrast(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> bool {
    let brightness = (color_brightness(bg) - color_brightness(fg)).abs();
    let hue = color_hue_difference(fg, bg);
    brightness < BRIGHTNESS || hue < HUE
}

fn make_issue(context: &RuleContext, position: Position, message: impl Into<String>) -> Issue {
    Issue {
        rule_id: context.rule_id.clone(),
        severity: context.severity,
        line: position.line,
        column: position.column,
        message: message.into(),
    }
}

/// Run every per-declaration check: point checks, the hidden-content table,
/// and the relative-units table.
fn check_declaration(
    declaration: &Declaration,
    flags: &InteractionFlags,
    context: &RuleContext,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    let property = declaration.property.as_str();
    let value_text = declaration.value.to_css_string();

    // content in CSS is unavailable to assistive technology
    if property == "content" && !value_text.trim().is_empty() && !(flags.after || flags.before) {
        issues.push(make_issue(
            context,
            declaration.position,
            "Content specified in a stylesheet is not available to assistive technology",
        ));
    }

    // discoverability cognitive issues
    if property == "position" && value_text == "absolute" {
        issues.push(make_issue(
            context,
            declaration.position,
            "Absolutely positioned content poses discoverability issues",
        ));
    }

    // focus cue missing
    if property == "outline" && (value_text == "none" || value_text == "0") {
        issues.push(make_issue(
            context,
            declaration.position,
            "Outline should not be hidden",
        ));
    }

    // inaccessible content
    if let Some(disallowed) = table_lookup(HIDDEN_DISALLOWED, property) {
        if disallowed.contains(&value_text.as_str()) {
            issues.push(make_issue(
                context,
                declaration.position,
                format!(
                    "Content hidden by setting '{}' to '{}' is not available to assistive technology",
                    property, value_text
                ),
            ));
        }
    }

    // visual acuity: restricted units
    if let Some(allowed) = table_lookup(UNITS_ALLOWED, property) {
        for dimension in declaration.value.dimensions() {
            if !allowed.contains(&dimension.unit.as_str()) {
                issues.push(make_issue(
                    context,
                    dimension.position,
                    format!(
                        "Values for property '{}' may only be specified as {}",
                        property,
                        allowed.join(", ")
                    ),
                ));
            }
        }
    }

    issues
}

/// Evaluate one style rule: selector classification, per-declaration checks,
/// then the block-level color pairing and contrast checks.
fn check_rule(rule: &StyleRule, context: &RuleContext) -> Vec<Issue> {
    let mut issues = Vec::new();
    let flags = classify_selectors(&rule.selectors);

    // device-dependent interaction styling: all three or none is the only
    // configuration that passes
    if (flags.active || flags.focus || flags.hover)
        && !(flags.active && flags.focus && flags.hover)
    {
        issues.push(make_issue(
            context,
            rule.position,
            "Use of :hover, :active, or :focus without all three creates device dependence",
        ));
    }

    let mut foreground = ColorValue::default();
    let mut background = ColorValue::default();

    for declaration in &rule.declarations {
        // a later declaration of the same property overwrites the earlier one
        match declaration.property.as_str() {
            "color" => foreground = extract_color(&declaration.value),
            "background-color" | "background" => background = extract_color(&declaration.value),
            _ => {}
        }
        issues.extend(check_declaration(declaration, &flags, context));
    }

    match (background.channels(), foreground.channels()) {
        (Some(_), None) => {
            issues.push(make_issue(
                context,
                rule.block_position,
                "Color should always be specified any time background-color is defined",
            ));
        }
        (Some(bg), Some(fg)) => {
            if insufficient_contrast(fg, bg) {
                issues.push(make_issue(
                    context,
                    rule.block_position,
                    "There is not enough contrast between background and foreground colors",
                ));
            }
        }
        // an invalid background raises no color-pairing issue at all
        _ => {}
    }

    issues
}

/// Evaluate a rule and everything nested under it, returning the merged
/// findings. Each level returns its own accumulator; the caller merges.
fn check_rule_tree(rule: &StyleRule, context: &RuleContext) -> Vec<Issue> {
    let mut issues = check_rule(rule, context);
    for nested in &rule.nested {
        issues.extend(check_rule_tree(nested, context));
    }
    issues
}

/// The accessibility rule. Stateless; every `detect` call derives its
/// working state from the input tree alone.
#[derive(Debug, Default)]
pub struct AccessibilityIssues;

impl Rule for AccessibilityIssues {
    fn name(&self) -> &'static str {
        "accessibility-issues"
    }

    fn default_config(&self) -> RuleConfig {
        RuleConfig::default()
    }

    fn detect(&self, stylesheet: &Stylesheet, context: &RuleContext) -> Vec<Issue> {
        let mut collector = IssueCollector::new();
        for rule in &stylesheet.rules {
            collector.extend_unique(check_rule_tree(rule, context));
        }
        collector.into_issues()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_stylesheet;
    use crate::rules::Severity;
    use pretty_assertions::assert_eq;

    fn lint(css: &str) -> Vec<Issue> {
        let stylesheet = parse_stylesheet(css).unwrap();
        let context = RuleContext::new("accessibility-issues", Severity::Warning);
        AccessibilityIssues.detect(&stylesheet, &context)
    }

    fn color_of(css_value: &str) -> ColorValue {
        let stylesheet = parse_stylesheet(&format!("a {{ color: {}; }}", css_value)).unwrap();
        extract_color(&stylesheet.rules[0].declarations[0].value)
    }

    #[test]
    fn test_hex_shorthand_expands_to_full_form() {
        assert_eq!(color_of("#abc"), color_of("#aabbcc"));
        assert_eq!(
            color_of("#abc").channels(),
            Some((0xaa, 0xbb, 0xcc))
        );
    }

    #[test]
    fn test_function_args_assign_positionally_ignoring_alpha() {
        let color = color_of("rgb(10, 20, 30, 0.5)");
        assert_eq!(color.channels(), Some((10, 20, 30)));
    }

    #[test]
    fn test_non_numeric_args_skipped_without_consuming_a_slot() {
        let color = color_of("rgba($alpha, 10, 20, 30)");
        assert_eq!(color.channels(), Some((10, 20, 30)));
    }

    #[test]
    fn test_named_colors_and_variables_are_invalid() {
        assert!(!color_of("red").is_valid());
        assert!(!color_of("$accent").is_valid());
        assert!(!color_of("#abcd").is_valid());
    }

    #[test]
    fn test_identical_colors_fail_contrast() {
        // both divergence measures are 0
        assert!(insufficient_contrast((255, 255, 255), (255, 255, 255)));
    }

    #[test]
    fn test_black_on_white_passes_contrast() {
        // brightness diff 255 >= 126, hue 765 >= 501
        assert!(!insufficient_contrast((0, 0, 0), (255, 255, 255)));
    }

    #[test]
    fn test_failing_one_threshold_is_enough() {
        // bright green on black: brightness diff ~149.7 passes, hue 255 fails
        assert!(insufficient_contrast((0, 0, 0), (0, 255, 0)));
    }

    #[test]
    fn test_hover_alone_is_device_dependent() {
        let issues = lint("a:hover { color: red; }");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("device dependence"));
    }

    #[test]
    fn test_all_three_interaction_states_pass() {
        let issues = lint("a:hover, a:focus, a:active { color: red; }");
        assert_eq!(issues, vec![]);
    }

    #[test]
    fn test_no_interaction_states_pass() {
        let issues = lint("a { color: red; }");
        assert_eq!(issues, vec![]);
    }

    #[test]
    fn test_flags_are_block_scoped_across_comma_group() {
        // hover and focus come from different selectors but still count as
        // a partial set for the shared block
        let issues = lint("a:hover, b:focus { color: red; }");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_display_none_is_hidden_content() {
        let issues = lint("a { display: none; }");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Content hidden by setting 'display' to 'none' is not available to assistive technology"
        );
        assert_eq!(lint("a { display: block; }"), vec![]);
    }

    #[test]
    fn test_height_zero_and_visibility_hidden_flagged() {
        assert_eq!(lint("a { height: 0; }").len(), 1);
        assert_eq!(lint("a { visibility: hidden; }").len(), 1);
        assert_eq!(lint("a { height: 10px; }"), vec![]);
    }

    #[test]
    fn test_absolute_units_restricted_for_font_size() {
        let issues = lint("a { font-size: 12px; }");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Values for property 'font-size' may only be specified as em, rem"
        );
        assert_eq!(lint("a { font-size: 1em; }"), vec![]);
        assert_eq!(lint("a { font-size: 2rem; }"), vec![]);
    }

    #[test]
    fn test_units_only_restricted_for_listed_properties() {
        // border-width is not in the table, px is fine there
        assert_eq!(lint("a { border-width: 2px; }"), vec![]);
    }

    #[test]
    fn test_units_issue_points_at_dimension() {
        let issues = lint("a { margin: 1em 4px; }");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column, 17);
    }

    #[test]
    fn test_position_absolute_flagged() {
        let issues = lint("a { position: absolute; }");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Absolutely positioned content poses discoverability issues"
        );
        assert_eq!(lint("a { position: relative; }"), vec![]);
    }

    #[test]
    fn test_outline_none_or_zero_flagged() {
        assert_eq!(lint("a { outline: none; }").len(), 1);
        assert_eq!(lint("a { outline: 0; }").len(), 1);
        assert_eq!(lint("a { outline: 1px solid black; }"), vec![]);
    }

    #[test]
    fn test_content_flagged_outside_pseudo_element_context() {
        let issues = lint("a { content: \"hi\"; }");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Content specified in a stylesheet is not available to assistive technology"
        );
    }

    #[test]
    fn test_content_allowed_on_before_and_after() {
        assert_eq!(lint("a::before { content: \"hi\"; }"), vec![]);
        assert_eq!(lint("a:after { content: \"hi\"; }"), vec![]);
    }

    #[test]
    fn test_background_without_color_requires_pairing() {
        let issues = lint("a { background-color: #000; }");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Color should always be specified any time background-color is defined"
        );
    }

    #[test]
    fn test_invalid_background_raises_no_pairing_issue() {
        assert_eq!(lint("a { background: url(\"x.png\"); }"), vec![]);
        assert_eq!(lint("a { color: #fff; }"), vec![]);
    }

    #[test]
    fn test_same_property_overwrite_uses_last_value() {
        // the second color declaration wins, restoring contrast
        let issues = lint("a { color: #fff; color: #000; background: #fff; }");
        assert_eq!(issues, vec![]);
    }

    #[test]
    fn test_hover_white_on_white_scenario() {
        let issues = lint("a:hover { color: #fff; background: #fff; }");
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("device dependence"));
        assert!(issues[1].message.contains("not enough contrast"));
    }

    #[test]
    fn test_detection_is_idempotent() {
        let stylesheet = parse_stylesheet("a:hover { color: #fff; background: #fff; }").unwrap();
        let context = RuleContext::new("accessibility-issues", Severity::Warning);
        let first = AccessibilityIssues.detect(&stylesheet, &context);
        let second = AccessibilityIssues.detect(&stylesheet, &context);
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_nested_rules_are_linted() {
        let issues = lint("nav { a { display: none; } }");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 1);
    }

    #[test]
    fn test_default_config_is_inert_extension_point() {
        let config = AccessibilityIssues.default_config();
        assert!(config.per_property.is_empty());
        assert!(config.global.is_empty());
    }
}
