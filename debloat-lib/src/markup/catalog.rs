/// Selectors, classes and tags that are never eliminated.
///
/// These cover state classes toggled by scripts and structural markup that
/// the used-markup profile cannot be trusted to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreservedCatalog {
    /// Always treated as used.
    pub classes: Vec<&'static str>,
    /// Always treated as used.
    pub tags: Vec<&'static str>,
    /// A selector containing any of these substrings is kept.
    pub pseudo: Vec<&'static str>,
    /// Selectors kept when they match one of these exactly.
    pub critical: Vec<&'static str>,
}

const CLASSES: &[&str] = &[
    "current-menu-item", "active", "current", "selected", "hover", "focus", "visited",
    "disabled", "enabled", "checked", "first", "last", "odd", "even", "visible", "hidden",
    "collapsed", "expanded", "dropdown", "menu-item", "sub-menu", "submenu", "sticky", "fixed",
    "absolute", "relative", "wp-", "menu-", "post-", "page-", "widget-", "sidebar-", "comment-",
    "header-", "footer-", "nav-",
];

const TAGS: &[&str] = &[
    "html", "body", "div", "span", "p", "a", "img", "button", "input", "form", "header",
    "footer", "nav", "main", "article", "section", "aside", "ul", "ol", "li", "table", "tr",
    "td", "th",
];

const PSEUDO: &[&str] = &[
    ":hover", ":focus", ":active", ":visited", ":disabled", ":enabled", ":checked",
    ":first-child", ":last-child", ":nth-child", ":not", ":before", ":after",
];

const CRITICAL: &[&str] = &["html", "body", "*", ":root"];

impl Default for PreservedCatalog {
    fn default() -> Self {
        PreservedCatalog {
            classes: CLASSES.to_vec(),
            tags: TAGS.to_vec(),
            pseudo: PSEUDO.to_vec(),
            critical: CRITICAL.to_vec(),
        }
    }
}

impl PreservedCatalog {
    /// A catalog that preserves nothing beyond the structural selectors.
    pub fn minimal() -> Self {
        PreservedCatalog {
            classes: Vec::new(),
            tags: Vec::new(),
            pseudo: Vec::new(),
            critical: CRITICAL.to_vec(),
        }
    }

    pub fn has_preserved_pseudo(&self, selector: &str) -> bool {
        self.pseudo.iter().any(|p| selector.contains(p))
    }

    pub fn is_critical(&self, selector: &str) -> bool {
        self.critical.iter().any(|c| *c == selector)
    }
}
