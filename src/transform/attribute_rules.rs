use crate::parser::Attribute;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Pattern applied to each dash-separated part of a compound attribute
#[derive(Debug)]
pub struct ModifierPattern {
    pattern: Regex,
    group_names: &'static [&'static str],
}

/// Maps an attribute name to generated class names.
///
/// Simple rules render `template` once from the attribute's capture groups.
/// Compound rules capture a `parts` group (`md8-lg4`), match every
/// dash-separated part against `modifier` and render the template once per
/// matching part; parts that don't match are dropped.
#[derive(Debug)]
pub struct ConversionRule {
    pub name: &'static str,
    pattern: Regex,
    group_names: &'static [&'static str],
    modifier: Option<ModifierPattern>,
    template: &'static str,
}

/// Capture group holding the modifier list of a compound attribute
const PARTS_GROUP: &str = "parts";

impl ConversionRule {
    fn simple(
        name: &'static str,
        pattern: &str,
        group_names: &'static [&'static str],
        template: &'static str,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            group_names,
            modifier: None,
            template,
        }
    }

    fn compound(
        name: &'static str,
        pattern: &str,
        group_names: &'static [&'static str],
        modifier: (&str, &'static [&'static str]),
        template: &'static str,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            group_names,
            modifier: Some(ModifierPattern {
                pattern: Regex::new(modifier.0).unwrap(),
                group_names: modifier.1,
            }),
            template,
        }
    }

    pub fn is_compound(&self) -> bool {
        self.modifier.is_some()
    }

    /// Class names for `attr_name`, or `None` if the rule doesn't match
    pub fn apply(&self, attr_name: &str) -> Option<Vec<String>> {
        let captures = self.pattern.captures(attr_name)?;

        let class_names = match &self.modifier {
            None => vec![self.template.to_string()],
            Some(modifier) => {
                let index = self.group_names.iter().position(|g| *g == PARTS_GROUP)?;
                let parts = captures.get(index + 1)?.as_str();

                parts
                    .trim()
                    .split('-')
                    .filter_map(|part| modifier.pattern.captures(part))
                    .map(|part| render(self.template, modifier.group_names, &part))
                    .collect()
            }
        };

        Some(
            class_names
                .into_iter()
                .map(|class_name| render(&class_name, self.group_names, &captures))
                .collect(),
        )
    }
}

/// Substitute `{group}` placeholders with the matching capture
fn render(template: &str, group_names: &[&str], captures: &Captures) -> String {
    let mut rendered = template.to_string();
    for (i, group) in group_names.iter().enumerate() {
        if let Some(value) = captures.get(i + 1) {
            rendered = rendered.replace(&format!("{{{}}}", group), value.as_str());
        }
    }
    rendered
}

fn visibility_rules() -> Vec<ConversionRule> {
    vec![
        ConversionRule::simple(
            "visible (visible-block, visible-inline, visible-inline-block)",
            r"^visible-(block|inline|inline-block)$",
            &["cssDisplay"],
            "visible-md-{cssDisplay}",
        ),
        ConversionRule::compound(
            "compound visible (visible-*:)",
            r"^visible-(block|inline|inline-block):(\S+)$",
            &["cssDisplay", PARTS_GROUP],
            (r"^(xs|sm|md|lg)$", &["screenSize"]),
            "visible-{screenSize}-{cssDisplay}",
        ),
        ConversionRule::simple("hidden", r"^hidden$", &[], "hidden-md"),
        ConversionRule::compound(
            "compound hidden (hidden:)",
            r"^hidden:(\S+)$",
            &[PARTS_GROUP],
            (r"^(xs|sm|md|lg)$", &["screenSize"]),
            "hidden-{screenSize}",
        ),
    ]
}

fn column_rules() -> Vec<ConversionRule> {
    let mut rules = visibility_rules();
    rules.extend([
        ConversionRule::simple(
            "size (xsN, smN, mdN, lgN)",
            r"^(xs|sm|md|lg)([1-9]|1[0-2])$",
            &["screenSize", "size"],
            "col-{screenSize}-{size}",
        ),
        ConversionRule::compound(
            "compound size (size:)",
            r"^size:(\S+)$",
            &[PARTS_GROUP],
            (r"^(xs|sm|md|lg)([1-9]|1[0-2])$", &["screenSize", "size"]),
            "col-{screenSize}-{size}",
        ),
        ConversionRule::simple(
            "property (offsetN, pushN, pullN)",
            r"^(offset|push|pull)([0-9]|1[0-2])$",
            &["name", "size"],
            "col-md-{name}-{size}",
        ),
        ConversionRule::compound(
            "compound property (offset:, push:, pull:)",
            r"^(offset|push|pull):(\S+)$",
            &["name", PARTS_GROUP],
            (r"^(xs|sm|md|lg)([0-9]|1[0-2])$", &["screenSize", "size"]),
            "col-{screenSize}-{name}-{size}",
        ),
    ]);
    rules
}

lazy_static! {
    static ref VISIBILITY_RULES: RuleSet = RuleSet { rules: visibility_rules() };
    static ref COLUMN_RULES: RuleSet = RuleSet { rules: column_rules() };
    static ref SIZE_CLASS: Regex = Regex::new(r"^col-(xs|sm|md|lg)-([1-9]|1[0-2])$").unwrap();
}

/// Prioritized rule table
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<ConversionRule>,
}

impl RuleSet {
    /// Rules applied to every tag
    pub fn visibility() -> &'static RuleSet {
        &VISIBILITY_RULES
    }

    /// Rules applied to column tags: visibility plus size and property rules
    pub fn column() -> &'static RuleSet {
        &COLUMN_RULES
    }

    pub fn rules(&self) -> &[ConversionRule] {
        &self.rules
    }

    /// First matching rule wins
    pub fn class_names_for(&self, attr_name: &str) -> Option<Vec<String>> {
        self.rules.iter().find_map(|rule| rule.apply(attr_name))
    }

    /// Remove every convertible attribute and return the generated class
    /// names in source attribute order.
    pub fn convert_attributes(&self, attributes: &mut Vec<Attribute>) -> Vec<String> {
        let mut class_names = Vec::new();

        // Walk backwards so removal doesn't shift unvisited indices;
        // prepend to keep left-to-right order.
        for i in (0..attributes.len()).rev() {
            if let Some(converted) = self.class_names_for(&attributes[i].name) {
                class_names = converted.into_iter().chain(class_names).collect();
                attributes.remove(i);
            }
        }

        class_names
    }
}

/// True for `col-{xs,sm,md,lg}-{1..12}`
pub fn is_size_class(class_name: &str) -> bool {
    SIZE_CLASS.is_match(class_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(rules: &RuleSet, attr: &str) -> Option<Vec<String>> {
        rules.class_names_for(attr)
    }

    #[test]
    fn test_simple_size() {
        assert_eq!(classes(RuleSet::column(), "md8"), Some(vec!["col-md-8".to_string()]));
        assert_eq!(classes(RuleSet::column(), "xs12"), Some(vec!["col-xs-12".to_string()]));
        assert_eq!(classes(RuleSet::column(), "md13"), None);
        assert_eq!(classes(RuleSet::column(), "md0"), None);
    }

    #[test]
    fn test_compound_size_drops_invalid_parts() {
        assert_eq!(
            classes(RuleSet::column(), "size:md8-xx9-lg4"),
            Some(vec!["col-md-8".to_string(), "col-lg-4".to_string()])
        );
        assert_eq!(classes(RuleSet::column(), "size:xx9"), Some(vec![]));
    }

    #[test]
    fn test_properties() {
        assert_eq!(
            classes(RuleSet::column(), "offset0"),
            Some(vec!["col-md-offset-0".to_string()])
        );
        assert_eq!(
            classes(RuleSet::column(), "push:xs1-lg12"),
            Some(vec!["col-xs-push-1".to_string(), "col-lg-push-12".to_string()])
        );
    }

    #[test]
    fn test_visibility() {
        let rules = RuleSet::visibility();
        assert_eq!(classes(rules, "hidden"), Some(vec!["hidden-md".to_string()]));
        assert_eq!(
            classes(rules, "hidden:xs-lg"),
            Some(vec!["hidden-xs".to_string(), "hidden-lg".to_string()])
        );
        assert_eq!(
            classes(rules, "visible-inline-block"),
            Some(vec!["visible-md-inline-block".to_string()])
        );
        assert_eq!(
            classes(rules, "visible-block:sm-md"),
            Some(vec!["visible-sm-block".to_string(), "visible-md-block".to_string()])
        );
        // Column vocabulary is not part of the visibility table
        assert_eq!(classes(rules, "md8"), None);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(classes(RuleSet::column(), "MD8"), None);
        assert_eq!(classes(RuleSet::visibility(), "Hidden"), None);
    }

    #[test]
    fn test_compound_rules_are_flagged() {
        let compound: Vec<_> = RuleSet::column()
            .rules()
            .iter()
            .filter(|rule| rule.is_compound())
            .map(|rule| rule.name)
            .collect();
        assert_eq!(compound.len(), 4);
    }

    #[test]
    fn test_convert_attributes_keeps_source_order() {
        let mut attrs = vec![
            Attribute::bare("md4"),
            Attribute::new("id", "main"),
            Attribute::bare("size:xs12-sm6"),
            Attribute::bare("hidden"),
        ];
        let class_names = RuleSet::column().convert_attributes(&mut attrs);
        assert_eq!(class_names, ["col-md-4", "col-xs-12", "col-sm-6", "hidden-md"]);
        assert_eq!(attrs, vec![Attribute::new("id", "main")]);
    }

    #[test]
    fn test_size_class_detection() {
        assert!(is_size_class("col-lg-12"));
        assert!(!is_size_class("col-md-offset-2"));
        assert!(!is_size_class("hidden-md"));
    }
}
