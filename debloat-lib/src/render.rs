use crate::style::css_matcher::InclusionMatcher;
use crate::style::owned_css::RuleNode;

/// Counts from one render, for reporting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub kept: usize,
    pub dropped: usize,
}

/// Render the rules that survive `matcher` back to CSS.
///
/// Leaves are emitted verbatim; at-rule containers are emitted only if at
/// least one child survives.
pub fn render(nodes: &[RuleNode], matcher: &InclusionMatcher<'_>) -> String {
    render_with_stats(nodes, matcher).0
}

pub fn render_with_stats(nodes: &[RuleNode], matcher: &InclusionMatcher<'_>) -> (String, RenderStats) {
    let mut stats = RenderStats::default();
    let mut out = String::new();
    render_into(nodes, matcher, &mut out, &mut stats);
    (out, stats)
}

fn render_into(
    nodes: &[RuleNode],
    matcher: &InclusionMatcher<'_>,
    out: &mut String,
    stats: &mut RenderStats,
) {
    for node in nodes {
        match node {
            RuleNode::DeclarationLeaf { css, selectors } => {
                let keep = selectors
                    .as_deref()
                    .map_or(true, |selectors| matcher.any_included(selectors));
                if keep {
                    out.push_str(css);
                    stats.kept += 1;
                } else {
                    stats.dropped += 1;
                }
            }
            RuleNode::AtRuleContainer { at_rule, rules } => {
                let mut children = String::new();
                render_into(rules, matcher, &mut children, stats);
                if !children.is_empty() {
                    out.push_str(at_rule);
                    out.push_str(" { ");
                    out.push_str(&children);
                    out.push_str(" }");
                }
            }
        }
    }
}
