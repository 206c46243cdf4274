// src/style/owned_css.rs: the parsed stylesheet, fully owned so it can be
// cached on the stylesheet and rendered any number of times.
use crate::style::selector::SelectorDescriptor;
use std::fmt;

/// One node of the parsed rule tree. Nesting mirrors the source CSS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleNode {
    /// A construct rendered as a unit: a style rule, `@font-face`, `@keyframes`, ...
    DeclarationLeaf {
        /// Compact CSS text, e.g. `.red{color:red}`.
        css: String,
        /// Selectors the rule applies to. `None` renders the leaf unconditionally.
        selectors: Option<Vec<SelectorDescriptor>>,
    },
    /// A grouping at-rule such as `@media` or `@supports`.
    AtRuleContainer {
        /// e.g. `@media (max-width: 600px)`
        at_rule: String,
        rules: Vec<RuleNode>,
    },
}

impl RuleNode {
    pub fn leaf(css: impl Into<String>, selectors: Option<Vec<SelectorDescriptor>>) -> Self {
        RuleNode::DeclarationLeaf {
            css: css.into(),
            selectors,
        }
    }

    pub fn container(at_rule: impl Into<String>, rules: Vec<RuleNode>) -> Self {
        RuleNode::AtRuleContainer {
            at_rule: at_rule.into(),
            rules,
        }
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            RuleNode::DeclarationLeaf { .. } => 1,
            RuleNode::AtRuleContainer { rules, .. } => rules.iter().map(RuleNode::leaf_count).sum(),
        }
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::DeclarationLeaf { css, selectors } => {
                let count = selectors.as_ref().map_or(0, Vec::len);
                write!(f, "{} ({} selectors)", css, count)
            }
            RuleNode::AtRuleContainer { at_rule, rules } => {
                writeln!(f, "{} {{", at_rule)?;
                for rule in rules {
                    writeln!(f, "  {}", rule)?;
                }
                write!(f, "}}")
            }
        }
    }
}
