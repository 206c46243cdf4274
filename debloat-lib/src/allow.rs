//! Allow-list entries: selectors kept regardless of what the page contains.
//!
//! Raw [`AllowEntry`] values come from configuration. [`compile`] filters them
//! down to the ones scoped to a stylesheet and turns their search terms into a
//! single [`Regex`] per rule.

use crate::error::{Result, SanitizeError};
use crate::stylesheet::Stylesheet;
use log::{trace, warn};
use regex::Regex;
use serde::{Deserialize, Deserializer};

/// Boundary that ends an identifier inside a selector.
const BOUNDARY: &str = r"(?:[\s.:,\[]|$)";
/// A trailing `*`: identifier characters up to a boundary.
const TRAILING_WILDCARD: &str = r"[^\s.:,\[]*(?:[\s.:,\[]|$)";
/// `" *"`: a boundary, then anything.
const SPACE_WILDCARD: &str = r"(?:\s|$|,|:).*?";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowKind {
    /// Matches the selector text against the search terms.
    #[default]
    Any,
    /// Like `Any`, but only while the named class is used on the page.
    Class,
    /// Admits selectors that start with the named class.
    Prefix,
}

/// One allow-list entry as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AllowEntry {
    #[serde(rename = "type", default)]
    pub kind: AllowKind,
    /// Literal terms; a term containing `*` is a glob.
    #[serde(default, deserialize_with = "one_or_many")]
    pub search: Vec<String>,
    /// Raw regex, used as is.
    #[serde(default)]
    pub search_regex: Option<String>,
    /// Class name for `class` and `prefix` entries.
    #[serde(default)]
    pub class: Option<String>,
    /// Restricts the entry to stylesheets whose id equals, or whose URL
    /// contains, this value.
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(term) => vec![term],
        OneOrMany::Many(terms) => terms,
    })
}

impl AllowEntry {
    pub fn any<I, S>(search: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowEntry {
            kind: AllowKind::Any,
            search: search.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn class<I, S>(class: impl Into<String>, search: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowEntry {
            kind: AllowKind::Class,
            class: Some(class.into()),
            search: search.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn prefix(class: impl Into<String>) -> Self {
        AllowEntry {
            kind: AllowKind::Prefix,
            class: Some(class.into()),
            ..Default::default()
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        AllowEntry {
            search_regex: Some(pattern.into()),
            ..Default::default()
        }
    }

    pub fn scoped(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Entries protecting layout and state selectors that most themes rely on.
    pub fn critical_defaults() -> Vec<AllowEntry> {
        const CRITICAL: &[&str] = &[
            "body", "html", "*", ":root", ".container", ".wrapper", ".row", ".header",
            ".footer", ".content", ".navigation", ".menu", ".nav", ".button", ".btn",
            ".sidebar", ".widget", ".post", ".page", ".entry", ".article", ".main",
            ".site-header", ".site-footer", ".site-content", ".site-main", "[class*=\"wp-\"]",
            "[class*=\"menu\"]", ".current-", ".active", ".selected", ".show", ".hide",
            ".hidden", ".visible", ".invisible", ".collapse", ".expand", ".open", ".close",
            ".dropdown", ".modal", ".fade", ".slide", "@media", "@keyframes", "@font-face",
        ];
        CRITICAL
            .iter()
            .map(|selector| AllowEntry::any([*selector]))
            .collect()
    }

    /// Whether this entry applies to `sheet`.
    pub fn applies_to(&self, sheet: &Stylesheet) -> bool {
        match self.sheet.as_deref() {
            None => true,
            Some(scope) => scope == sheet.id || (!scope.is_empty() && sheet.url.contains(scope)),
        }
    }
}

/// An allow entry ready for matching.
#[derive(Debug, Clone)]
pub struct AllowRule {
    pub kind: AllowKind,
    pub class: Option<String>,
    pub matcher: Option<Regex>,
}

impl AllowRule {
    /// True if the compiled pattern matches the selector text.
    pub fn is_match(&self, selector: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(selector))
    }
}

/// Compile the entries that apply to `sheet`, in order.
pub fn compile(entries: &[AllowEntry], sheet: &Stylesheet) -> Result<Vec<AllowRule>> {
    let mut rules = Vec::with_capacity(entries.len());

    for entry in entries {
        if !entry.applies_to(sheet) {
            trace!("allow entry {:?} does not apply to {}", entry.sheet, sheet.id);
            continue;
        }
        if entry.kind != AllowKind::Any && entry.class.as_deref().unwrap_or("").is_empty() {
            warn!("ignoring {:?} allow entry without a class", entry.kind);
            continue;
        }

        let matcher = match compiled_pattern(entry) {
            Some(pattern) => Some(Regex::new(&pattern).map_err(|source| {
                SanitizeError::AllowPattern {
                    pattern: pattern.clone(),
                    source,
                }
            })?),
            None => None,
        };

        rules.push(AllowRule {
            kind: entry.kind,
            class: entry.class.clone(),
            matcher,
        });
    }

    Ok(rules)
}

/// The regex source for an entry, or `None` when it has no search terms.
fn compiled_pattern(entry: &AllowEntry) -> Option<String> {
    let terms: Vec<&str> = entry
        .search
        .iter()
        .map(|term| term.trim())
        .filter(|term| !term.is_empty())
        .collect();

    // An explicit regex turns off glob handling: every term is then literal.
    let (regex, literals): (Option<String>, Vec<&str>) = match &entry.search_regex {
        Some(raw) => (Some(raw.clone()), terms),
        None => {
            let (globs, literals): (Vec<&str>, Vec<&str>) =
                terms.into_iter().partition(|term| is_glob(term));
            let globs = (!globs.is_empty()).then(|| {
                let alternatives: Vec<String> = globs.into_iter().map(glob_to_regex).collect();
                format!("(?:{})", alternatives.join("|"))
            });
            (globs, literals)
        }
    };

    let loose = (!literals.is_empty()).then(|| {
        let quoted: Vec<String> = literals.into_iter().map(regex::escape).collect();
        format!("(?:{}){}", quoted.join("|"), BOUNDARY)
    });

    match (loose, regex) {
        (Some(loose), Some(regex)) => Some(format!("(?:{})|(?:{})", loose, regex)),
        (Some(loose), None) => Some(loose),
        (None, regex) => regex,
    }
}

/// A term containing `*`, other than the universal selector itself.
fn is_glob(term: &str) -> bool {
    term != "*" && term.contains('*')
}

/// Translate one glob term.
///
/// Without a leading `*` the pattern is anchored at the start of the selector,
/// where an optional `.` or `#` sigil is allowed.
fn glob_to_regex(term: &str) -> String {
    let (anchored, body) = match term.strip_prefix('*') {
        Some(rest) if !rest.is_empty() => (false, rest),
        _ => (true, term),
    };

    let mut pattern = String::from(if anchored { "^[.#]?" } else { "" });
    let mut literal = String::new();
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let wildcard = if ch == ' ' && chars.get(i + 1) == Some(&'*') {
            i += 1;
            Some(SPACE_WILDCARD)
        } else if ch == '*' && i == chars.len() - 1 {
            Some(TRAILING_WILDCARD)
        } else if ch == '*' {
            Some(".*?")
        } else {
            None
        };

        match wildcard {
            Some(replacement) => {
                pattern.push_str(&regex::escape(&literal));
                literal.clear();
                pattern.push_str(replacement);
            }
            None => literal.push(ch),
        }
        i += 1;
    }
    pattern.push_str(&regex::escape(&literal));

    pattern
}
