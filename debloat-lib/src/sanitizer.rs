use crate::allow::{self, AllowEntry};
use crate::config::SanitizerConfig;
use crate::error::Result;
use crate::markup::UsedMarkup;
use crate::render::{self, RenderStats};
use crate::style::css_matcher::InclusionMatcher;
use crate::stylesheet::Stylesheet;
use log::{debug, error};

/// Outcome of one sanitize call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub original_len: usize,
    pub output_len: usize,
    pub rules_kept: usize,
    pub rules_dropped: usize,
    /// The original CSS was returned because sanitizing failed.
    pub fell_back: bool,
}

/// Removes rules whose selectors match nothing on the page.
///
/// Never fails: if anything goes wrong the stylesheet's original text is
/// returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    config: SanitizerConfig,
}

impl Sanitizer {
    pub fn new(config: SanitizerConfig) -> Self {
        Sanitizer { config }
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// The reduced CSS for `sheet`, also stored in `sheet.output`.
    pub fn sanitize(&self, sheet: &mut Stylesheet, used: &UsedMarkup, allow: &[AllowEntry]) -> String {
        self.sanitize_with_report(sheet, used, allow).0
    }

    pub fn sanitize_with_report(
        &self,
        sheet: &mut Stylesheet,
        used: &UsedMarkup,
        allow: &[AllowEntry],
    ) -> (String, SanitizeReport) {
        let original_len = sheet.content.len();

        let (css, report) = match self.try_sanitize(sheet, used, allow) {
            Ok((css, stats)) => {
                let report = SanitizeReport {
                    original_len,
                    output_len: css.len(),
                    rules_kept: stats.kept,
                    rules_dropped: stats.dropped,
                    fell_back: false,
                };
                (css, report)
            }
            Err(err) => {
                error!("sanitizing {} failed, keeping original css: {}", sheet.id, err);
                let report = SanitizeReport {
                    original_len,
                    output_len: original_len,
                    fell_back: true,
                    ..SanitizeReport::default()
                };
                (sheet.content.clone(), report)
            }
        };

        debug!(
            "{}: {} -> {} bytes, {} rules kept, {} dropped",
            sheet.id, report.original_len, report.output_len, report.rules_kept, report.rules_dropped
        );
        sheet.output = Some(css.clone());
        (css, report)
    }

    /// Sanitize several stylesheets one after another. A failure in one of
    /// them only affects its own output.
    pub fn sanitize_all(
        &self,
        sheets: &mut [Stylesheet],
        used: &UsedMarkup,
        allow: &[AllowEntry],
    ) -> Vec<String> {
        sheets
            .iter_mut()
            .map(|sheet| self.sanitize(sheet, used, allow))
            .collect()
    }

    fn try_sanitize(
        &self,
        sheet: &mut Stylesheet,
        used: &UsedMarkup,
        allow: &[AllowEntry],
    ) -> Result<(String, RenderStats)> {
        let allow_rules = if self.config.preserve_critical {
            let mut entries = AllowEntry::critical_defaults();
            entries.extend_from_slice(allow);
            allow::compile(&entries, sheet)?
        } else {
            allow::compile(allow, sheet)?
        };

        let profile = used.with_catalog(&self.config.catalog);
        let rules = sheet.rules()?;
        let matcher = InclusionMatcher::new(&profile, &self.config.catalog, &allow_rules);

        Ok(render::render_with_stats(rules, &matcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::PreservedCatalog;
    use pretty_assertions::assert_eq;

    fn minimal() -> Sanitizer {
        Sanitizer::new(
            SanitizerConfig::default()
                .with_catalog(PreservedCatalog::minimal())
                .preserve_critical(false),
        )
    }

    fn used(classes: &[&str]) -> UsedMarkup {
        UsedMarkup::new().with_classes(classes.iter().copied())
    }

    #[test]
    fn test_unused_rule_is_removed() {
        let mut sheet = Stylesheet::new("theme", "", ".used{color:red} .unused{color:blue}");
        let (css, report) = minimal().sanitize_with_report(&mut sheet, &used(&["used"]), &[]);
        assert_eq!(css, ".used{color:red}");
        assert_eq!(sheet.output.as_deref(), Some(".used{color:red}"));
        assert_eq!(report.rules_kept, 1);
        assert_eq!(report.rules_dropped, 1);
        assert!(!report.fell_back);
    }

    #[test]
    fn test_empty_stylesheet() {
        let mut sheet = Stylesheet::new("empty", "", "");
        assert_eq!(minimal().sanitize(&mut sheet, &used(&[]), &[]), "");
    }

    #[test]
    fn test_repeat_sanitize_is_stable() {
        let sanitizer = minimal();
        let profile = used(&["a"]);
        let allow = [AllowEntry::any(["keep-*"])];
        let mut sheet = Stylesheet::new(
            "theme",
            "http://example.com/css/site.css?v=2",
            ".a{background:url(a.png)} .b{color:red} .keep-me{color:red}",
        );
        let first = sanitizer.sanitize(&mut sheet, &profile, &allow);
        assert!(sheet.is_parsed());
        let second = sanitizer.sanitize(&mut sheet, &profile, &allow);
        assert_eq!(first, second);
        assert_eq!(first.matches("http://example.com/css/a.png").count(), 1);
        assert!(first.contains(".keep-me"));
        assert!(!first.contains(".b{"));
    }

    #[test]
    fn test_parse_failure_returns_original() {
        let original = "..broken{color:red} .used{color:red}";
        let mut sheet = Stylesheet::new("broken", "", original);
        let (css, report) = minimal().sanitize_with_report(&mut sheet, &used(&["used"]), &[]);
        assert_eq!(css, original);
        assert!(report.fell_back);
        assert_eq!(sheet.output.as_deref(), Some(original));
    }

    #[test]
    fn test_bad_allow_pattern_returns_original() {
        let original = ".used{color:red} .unused{color:blue}";
        let mut sheet = Stylesheet::new("theme", "", original);
        let allow = [AllowEntry::regex("([")];
        assert_eq!(minimal().sanitize(&mut sheet, &used(&["used"]), &allow), original);
    }

    #[test]
    fn test_scoped_allow_only_affects_its_sheet() {
        let css = ".promo{color:red}";
        let allow = [AllowEntry::any([".promo"]).scoped("sheet-a")];
        let sanitizer = minimal();

        let mut a = Stylesheet::new("sheet-a", "http://x/a.css", css);
        let mut b = Stylesheet::new("sheet-b", "http://x/b.css", css);
        assert_eq!(sanitizer.sanitize(&mut a, &used(&[]), &allow), css);
        assert_eq!(sanitizer.sanitize(&mut b, &used(&[]), &allow), "");
    }

    #[test]
    fn test_preserve_critical_adds_default_entries() {
        let css = ".container{width:100%} .card{padding:0}";
        let sanitizer = Sanitizer::new(
            SanitizerConfig::default()
                .with_catalog(PreservedCatalog::minimal())
                .preserve_critical(true),
        );
        let mut sheet = Stylesheet::new("theme", "", css);
        assert_eq!(sanitizer.sanitize(&mut sheet, &used(&[]), &[]), ".container{width:100%}");
    }

    #[test]
    fn test_failures_are_isolated() {
        let mut sheets = vec![
            Stylesheet::new("good", "", ".used{color:red} .unused{color:red}"),
            Stylesheet::new("bad", "", "..bad{color:red}"),
            Stylesheet::new("also-good", "", ".unused{color:red}"),
        ];
        let out = minimal().sanitize_all(&mut sheets, &used(&["used"]), &[]);
        assert_eq!(out, vec![".used{color:red}", "..bad{color:red}", ""]);
    }
}
