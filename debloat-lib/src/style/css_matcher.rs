use crate::allow::{AllowKind, AllowRule};
use crate::markup::{PreservedCatalog, UsedMarkup};
use crate::style::selector::SelectorDescriptor;
use std::borrow::Cow;

/// Decides, selector by selector, whether a rule is still needed.
///
/// `profile` must already include the catalog's always-used classes and tags
/// (see [`UsedMarkup::with_catalog`]).
#[derive(Debug, Clone, Copy)]
pub struct InclusionMatcher<'a> {
    profile: &'a UsedMarkup,
    catalog: &'a PreservedCatalog,
    allow: &'a [AllowRule],
}

impl<'a> InclusionMatcher<'a> {
    pub fn new(
        profile: &'a UsedMarkup,
        catalog: &'a PreservedCatalog,
        allow: &'a [AllowRule],
    ) -> Self {
        InclusionMatcher {
            profile,
            catalog,
            allow,
        }
    }

    /// True if the selector may match something on the page and must be kept.
    ///
    /// Checks run in order and the first one that keeps the selector wins:
    /// at-rules, preserved pseudo-classes, structural selectors, attribute-only
    /// selectors, the allow-list, and finally usage of every class, id and tag.
    pub fn should_include(&self, descriptor: &SelectorDescriptor) -> bool {
        let selector = descriptor.selector.as_str();

        if selector.starts_with('@')
            || self.catalog.has_preserved_pseudo(selector)
            || self.catalog.is_critical(selector)
            || descriptor.is_attribute_only()
        {
            return true;
        }

        let mut classes: Cow<'_, [String]> = Cow::Borrowed(&descriptor.classes);

        for rule in self.allow {
            match rule.kind {
                AllowKind::Prefix => {
                    let (Some(prefix), Some(rest)) =
                        (rule.class.as_deref(), selector.strip_prefix('.'))
                    else {
                        continue;
                    };
                    if rest == prefix {
                        return true;
                    }
                    if rest.starts_with(prefix) {
                        // Only a class equal to the prefix is admitted; the rest must still be used.
                        classes = Cow::Owned(
                            descriptor
                                .classes
                                .iter()
                                .filter(|class| class.as_str() != prefix)
                                .cloned()
                                .collect(),
                        );
                        break;
                    }
                    continue;
                }
                AllowKind::Class => {
                    let class_used = rule
                        .class
                        .as_deref()
                        .is_some_and(|class| self.profile.has_class(class));
                    if !class_used {
                        continue;
                    }
                }
                AllowKind::Any => {}
            }

            if rule.is_match(selector) {
                return true;
            }
        }

        self.profile.has_all_classes(&*classes)
            && self.profile.has_all_ids(&descriptor.ids)
            && self.profile.has_all_tags(&descriptor.tags)
    }

    /// True if any selector of a rule is kept.
    pub fn any_included(&self, selectors: &[SelectorDescriptor]) -> bool {
        selectors.iter().any(|selector| self.should_include(selector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allow::{compile, AllowEntry};
    use crate::style::selector::decompose;
    use crate::stylesheet::Stylesheet;

    fn included_with(
        selector: &str,
        used: &UsedMarkup,
        allow: &[AllowEntry],
        catalog: PreservedCatalog,
    ) -> bool {
        let rules = compile(allow, &Stylesheet::new("theme", "", "")).unwrap();
        let profile = used.with_catalog(&catalog);
        let matcher = InclusionMatcher::new(&profile, &catalog, &rules);
        matcher.should_include(&decompose(selector).unwrap())
    }

    fn included(selector: &str, used: &UsedMarkup, allow: &[AllowEntry]) -> bool {
        included_with(selector, used, allow, PreservedCatalog::minimal())
    }

    #[test]
    fn test_all_classes_must_be_used() {
        let used = UsedMarkup::new().with_classes(["a", "b"]);
        assert!(included(".a.b", &used, &[]));
        assert!(included(".a .b", &used, &[]));

        let used = UsedMarkup::new().with_classes(["a"]);
        assert!(included(".a", &used, &[]));
        assert!(!included(".a.b", &used, &[]));
        assert!(!included(".a > .b", &used, &[]));
    }

    #[test]
    fn test_every_category_is_checked() {
        let used = UsedMarkup::new().with_classes(["a"]);
        assert!(!included("div.a", &used, &[]));
        assert!(!included("#main .a", &used, &[]));

        let used = used.with_tags(["div"]).with_ids(["main"]);
        assert!(included("div.a", &used, &[]));
        assert!(included("#main .a", &used, &[]));
    }

    #[test]
    fn test_structural_selectors_always_kept() {
        let empty = UsedMarkup::new();
        for selector in [":root", "html", "body", "*"] {
            assert!(included(selector, &empty, &[]), "{selector}");
        }
        assert!(!included("body .x", &empty, &[]));
    }

    #[test]
    fn test_attribute_only_kept() {
        let empty = UsedMarkup::new();
        assert!(included("[data-x]", &empty, &[]));
        assert!(included("[type=\"checkbox\"]:checked", &empty, &[]));
        assert!(!included("a[href]", &empty, &[]));
    }

    #[test]
    fn test_at_selector_kept() {
        assert!(included("@font-face", &UsedMarkup::new(), &[]));
    }

    #[test]
    fn test_preserved_catalog() {
        let empty = UsedMarkup::new();
        let check = |selector: &str| included_with(selector, &empty, &[], PreservedCatalog::default());
        assert!(check(".unused:hover"));
        assert!(check(".menu-item .active"));
        assert!(check("ul li a"));
        assert!(!check(".menu .active"));
        assert!(!check(".unused"));
    }

    #[test]
    fn test_any_glob_overrides_usage() {
        let empty = UsedMarkup::new();
        let allow = [AllowEntry::any(["btn-*"])];
        assert!(included(".btn-primary", &empty, &allow));
        assert!(!included(".card", &empty, &allow));
    }

    #[test]
    fn test_class_entry_depends_on_its_class() {
        let allow = [AllowEntry::class("has-modal", [".modal"])];
        assert!(!included(".modal", &UsedMarkup::new(), &allow));
        let used = UsedMarkup::new().with_classes(["has-modal"]);
        assert!(included(".modal", &used, &allow));
    }

    #[test]
    fn test_prefix_entries() {
        let allow = [AllowEntry::prefix("wp-block")];
        let empty = UsedMarkup::new();
        assert!(included(".wp-block", &empty, &allow));
        assert!(!included(".wp-block-button", &empty, &allow));
        assert!(!included(".wp-block .label", &empty, &allow));

        let used = UsedMarkup::new().with_classes(["label"]);
        assert!(included(".wp-block .label", &used, &allow));
        assert!(included(".wp-block.label", &used, &allow));
        assert!(!included(".wp-block-button .label", &used, &allow));
        assert!(!included(".other .wp-block", &used, &allow));

        let used = used.with_classes(["wp-block-button"]);
        assert!(included(".wp-block-button .label", &used, &allow));
    }

    #[test]
    fn test_prefix_hit_stops_allow_evaluation() {
        let allow = [AllowEntry::prefix("wp"), AllowEntry::any([".wp-x .y"])];
        assert!(!included(".wp-x .y", &UsedMarkup::new(), &allow));

        let allow = [AllowEntry::any([".wp-x .y"]), AllowEntry::prefix("wp")];
        assert!(included(".wp-x .y", &UsedMarkup::new(), &allow));
    }

    #[test]
    fn test_any_included_is_or_across_selectors() {
        let used = UsedMarkup::new().with_classes(["used"]);
        let catalog = PreservedCatalog::minimal();
        let profile = used.with_catalog(&catalog);
        let matcher = InclusionMatcher::new(&profile, &catalog, &[]);
        let selectors = vec![decompose(".unused").unwrap(), decompose(".used").unwrap()];
        assert!(matcher.any_included(&selectors));
        assert!(!matcher.any_included(&selectors[..1]));
    }
}
