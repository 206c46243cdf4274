use crate::error::{Result, SanitizeError};
use crate::style::owned_css::RuleNode;
use crate::style::selector::{self, SelectorDescriptor};
use crate::style::urls;
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{style::StyleRule, CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;
use lightningcss::values::url::Url;
use lightningcss::visit_types;
use lightningcss::visitor::{Visit, VisitTypes, Visitor};
use log::{debug, warn};
use std::convert::Infallible;

const BOM: char = '\u{feff}';

/// Parse raw CSS (LightningCSS) into an owned rule tree.
///
/// Relative `url()` values are rewritten against `sheet_url` before the tree is
/// built, so the tree can be cached and rendered repeatedly without redoing it.
pub fn parse(css_text: &str, sheet_url: &str) -> Result<Vec<RuleNode>> {
    let css_text = css_text.strip_prefix(BOM).unwrap_or(css_text);

    let mut sheet = LightningStyleSheet::parse(css_text, ParserOptions::default())
        .map_err(|e| SanitizeError::Parse(e.to_string()))?;

    let mut rewriter = UrlRewriter {
        base: urls::base_path(sheet_url),
        rewritten: 0,
    };
    match sheet.visit(&mut rewriter) {
        Ok(()) => {}
        Err(never) => match never {},
    }
    if rewriter.rewritten > 0 {
        debug!("rewrote {} relative urls in {}", rewriter.rewritten, sheet_url);
    }

    convert_rules(&sheet.rules)
}

/// Prefixes relative `url()` values with the stylesheet's directory.
struct UrlRewriter<'a> {
    base: &'a str,
    rewritten: usize,
}

impl<'i> Visitor<'i> for UrlRewriter<'_> {
    type Error = Infallible;

    fn visit_types(&self) -> VisitTypes {
        visit_types!(URLS)
    }

    fn visit_url(&mut self, url: &mut Url<'i>) -> std::result::Result<(), Self::Error> {
        if let Some(absolute) = urls::rewrite(self.base, &url.url) {
            url.url = absolute.into();
            self.rewritten += 1;
        }
        Ok(())
    }
}

/// Compact output, with targets old enough that media queries keep their
/// `min-`/`max-` form instead of being printed as range syntax.
fn printer_options() -> PrinterOptions<'static> {
    let legacy = Browsers {
        safari: Some(13 << 16),
        ..Browsers::default()
    };
    PrinterOptions {
        minify: true,
        targets: Targets::from(legacy),
        ..PrinterOptions::default()
    }
}

fn render_error(err: impl std::fmt::Display) -> SanitizeError {
    SanitizeError::Render(err.to_string())
}

fn convert_rules(rules: &CssRuleList<'_>) -> Result<Vec<RuleNode>> {
    let mut nodes = Vec::with_capacity(rules.0.len());

    for rule in &rules.0 {
        let node = match rule {
            CssRule::Media(media_rule) => {
                let query = media_rule
                    .query
                    .to_css_string(printer_options())
                    .map_err(render_error)?;
                at_rule_container(format!("@media {}", query), &media_rule.rules)?
            }
            CssRule::Supports(supports_rule) => {
                let condition = supports_rule
                    .condition
                    .to_css_string(printer_options())
                    .map_err(render_error)?;
                at_rule_container(format!("@supports {}", condition), &supports_rule.rules)?
            }
            CssRule::LayerBlock(layer_rule) => {
                at_rule_container(printed_header(rule, "layer")?, &layer_rule.rules)?
            }
            CssRule::Container(container_rule) => {
                at_rule_container(printed_header(rule, "container")?, &container_rule.rules)?
            }
            CssRule::MozDocument(document_rule) => {
                at_rule_container(printed_header(rule, "-moz-document")?, &document_rule.rules)?
            }
            CssRule::Style(style_rule) => convert_style_rule(rule, style_rule)?,
            CssRule::Ignored => continue,
            // @font-face, @keyframes, @import, @page, ... render as they are.
            _ => RuleNode::leaf(compact(rule)?, None),
        };
        nodes.push(node);
    }

    Ok(nodes)
}

fn at_rule_container(header: String, rules: &CssRuleList<'_>) -> Result<RuleNode> {
    Ok(RuleNode::container(header.trim_end(), convert_rules(rules)?))
}

/// Header of a grouping rule taken from its own printed form, up to the block.
fn printed_header(rule: &CssRule<'_>, name: &str) -> Result<String> {
    let printed = rule.to_css_string(printer_options()).map_err(render_error)?;
    let header = printed
        .split_once('{')
        .map(|(head, _)| head.trim())
        .filter(|head| head.starts_with('@'))
        .map(str::to_string)
        .unwrap_or_else(|| format!("@{}", name));
    Ok(header)
}

fn compact(rule: &CssRule<'_>) -> Result<String> {
    rule.to_css_string(printer_options()).map_err(render_error)
}

/// A style rule becomes a leaf carrying one descriptor per selector.
fn convert_style_rule(rule: &CssRule<'_>, style_rule: &StyleRule<'_>) -> Result<RuleNode> {
    let css = compact(rule)?;

    let mut selector_texts = Vec::with_capacity(style_rule.selectors.0.len());
    for selector in &style_rule.selectors.0 {
        selector_texts.push(
            selector
                .to_css_string(PrinterOptions::default())
                .map_err(render_error)?,
        );
    }

    Ok(RuleNode::leaf(css, describe_selectors(&selector_texts)))
}

/// Descriptors for a rule's selector list.
///
/// `None` if any selector cannot be decomposed, which keeps the rule
/// unconditionally.
fn describe_selectors<S: AsRef<str>>(selectors: &[S]) -> Option<Vec<SelectorDescriptor>> {
    let mut descriptors = Vec::with_capacity(selectors.len());
    for selector in selectors {
        match selector::decompose(selector.as_ref()) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(err) => {
                warn!("keeping rule unfiltered, {}", err);
                return None;
            }
        }
    }
    Some(descriptors)
}
