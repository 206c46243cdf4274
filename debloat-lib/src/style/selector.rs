//! Breaks a selector string into the identifiers it references.
//!
//! Decomposition is an ordered series of extractors, each working on what the
//! previous one left behind:
//!
//! 1. pseudo-classes and pseudo-elements are stripped (with their arguments),
//! 2. attribute selectors are removed, keeping only the attribute name,
//! 3. `.class` tokens are taken,
//! 4. `#id` tokens are taken,
//! 5. whatever identifier runs remain are tag names.

use crate::error::{Result, SanitizeError};

/// The identifiers a single (comma-free) selector refers to.
///
/// Empty lists mean the selector does not reference that kind of identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorDescriptor {
    /// Original selector text, trimmed.
    pub selector: String,
    pub classes: Vec<String>,
    pub ids: Vec<String>,
    pub tags: Vec<String>,
    /// Attribute names only, e.g. `data-x` for `[data-x="1"]`.
    pub attrs: Vec<String>,
}

impl SelectorDescriptor {
    /// True if the selector names at least one class, id or tag.
    pub fn has_markup_refs(&self) -> bool {
        !self.classes.is_empty() || !self.ids.is_empty() || !self.tags.is_empty()
    }

    /// True for selectors like `[data-x]` that reference nothing but attributes.
    pub fn is_attribute_only(&self) -> bool {
        !self.attrs.is_empty() && !self.has_markup_refs()
    }
}

/// Decompose one selector into a [`SelectorDescriptor`].
pub fn decompose(selector: &str) -> Result<SelectorDescriptor> {
    let trimmed = selector.trim();
    let mut descriptor = SelectorDescriptor {
        selector: trimmed.to_string(),
        ..Default::default()
    };

    let rest = strip_pseudo(trimmed)?;
    let rest = take_attributes(&rest, &mut descriptor.attrs)
        .map_err(|reason| decomposition_error(trimmed, reason))?;
    let rest = take_prefixed(&rest, '.', &mut descriptor.classes);
    let rest = take_prefixed(&rest, '#', &mut descriptor.ids);
    take_tags(&rest, &mut descriptor.tags);

    Ok(descriptor)
}

fn decomposition_error(selector: &str, reason: &str) -> SanitizeError {
    SanitizeError::Decomposition {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii()
}

/// Removes `:name`, `::name` and `:name(...)`. An escaped colon (`\:`) is part
/// of an identifier and stays.
fn strip_pseudo(selector: &str) -> Result<String> {
    let chars: Vec<char> = selector.chars().collect();
    let mut out = String::with_capacity(selector.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            out.push(ch);
            if let Some(&escaped) = chars.get(i + 1) {
                out.push(escaped);
            }
            i += 2;
            continue;
        }
        if ch != ':' {
            out.push(ch);
            i += 1;
            continue;
        }

        let mut j = i + 1;
        if chars.get(j) == Some(&':') {
            j += 1;
        }
        let name_start = j;
        while j < chars.len() && is_ident_char(chars[j]) {
            j += 1;
        }
        if j == name_start {
            out.push(ch);
            i += 1;
            continue;
        }
        if chars.get(j) == Some(&'(') {
            let close = find_closing(&chars, j, '(', ')')
                .ok_or_else(|| decomposition_error(selector, "unbalanced parenthesis"))?;
            j = close + 1;
        }
        i = j;
    }

    Ok(out)
}

/// Index of the bracket closing the one at `open`, skipping quoted strings.
fn find_closing(chars: &[char], open: usize, opening: char, closing: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = open;

    while i < chars.len() {
        let ch = chars[i];
        match quote {
            Some(q) => {
                if ch == '\\' {
                    i += 1;
                } else if ch == q {
                    quote = None;
                }
            }
            None => {
                if ch == '\\' {
                    i += 1;
                } else if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                } else if ch == opening {
                    depth += 1;
                } else if ch == closing {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
            }
        }
        i += 1;
    }
    None
}

fn take_attributes(selector: &str, attrs: &mut Vec<String>) -> std::result::Result<String, &'static str> {
    let chars: Vec<char> = selector.chars().collect();
    let mut out = String::with_capacity(selector.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            out.push(ch);
            if let Some(&escaped) = chars.get(i + 1) {
                out.push(escaped);
            }
            i += 2;
            continue;
        }
        if ch != '[' {
            out.push(ch);
            i += 1;
            continue;
        }

        let close = find_closing(&chars, i, '[', ']').ok_or("unbalanced attribute bracket")?;
        let name: String = chars[i + 1..close]
            .iter()
            .skip_while(|c| c.is_whitespace())
            .take_while(|&&c| is_ident_char(c) || c == ':' || c == '|')
            .collect();
        if name.is_empty() {
            return Err("attribute selector without a name");
        }
        attrs.push(name);
        i = close + 1;
    }

    Ok(out)
}

/// Takes every `<sigil>identifier` token out of `selector`, unescaping it.
fn take_prefixed(selector: &str, sigil: char, found: &mut Vec<String>) -> String {
    let chars: Vec<char> = selector.chars().collect();
    let mut out = String::with_capacity(selector.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            out.push(ch);
            if let Some(&escaped) = chars.get(i + 1) {
                out.push(escaped);
            }
            i += 2;
            continue;
        }
        if ch != sigil {
            out.push(ch);
            i += 1;
            continue;
        }

        let (ident, end) = read_ident(&chars, i + 1);
        if ident.is_empty() {
            out.push(ch);
            i += 1;
            continue;
        }
        found.push(ident);
        i = end;
    }

    out
}

/// Reads an identifier starting at `start`, resolving CSS escapes
/// (`\:` and hex forms like `\31 `). Returns the identifier and the index after it.
fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut ident = String::new();
    let mut i = start;

    while i < chars.len() {
        let ch = chars[i];
        if is_ident_char(ch) {
            ident.push(ch);
            i += 1;
        } else if ch == '\\' && i + 1 < chars.len() {
            i += 1;
            let hex: String = chars[i..]
                .iter()
                .take(6)
                .take_while(|c| c.is_ascii_hexdigit())
                .collect();
            if hex.is_empty() {
                ident.push(chars[i]);
                i += 1;
            } else {
                let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                ident.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                i += hex.len();
                if chars.get(i).is_some_and(|c| c.is_whitespace()) {
                    i += 1;
                }
            }
        } else {
            break;
        }
    }

    (ident, i)
}

fn take_tags(selector: &str, tags: &mut Vec<String>) {
    let mut current = String::new();
    let mut chars = selector.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            chars.next();
            continue;
        }
        if is_ident_char(ch) {
            current.push(ch);
        } else if !current.is_empty() {
            tags.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tags.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_selector() {
        let d = decompose("  div#main > .card.is-open  ").unwrap();
        assert_eq!(d.selector, "div#main > .card.is-open");
        assert_eq!(d.tags, vec!["div"]);
        assert_eq!(d.ids, vec!["main"]);
        assert_eq!(d.classes, vec!["card", "is-open"]);
        assert!(d.attrs.is_empty());
    }

    #[test]
    fn test_pseudo_is_stripped_but_tag_survives() {
        let d = decompose("a:hover .menu::before").unwrap();
        assert_eq!(d.tags, vec!["a"]);
        assert_eq!(d.classes, vec!["menu"]);
    }

    #[test]
    fn test_pseudo_argument_is_discarded() {
        let d = decompose("li:nth-child(2n+1) .x:not(.y, [data-z])").unwrap();
        assert_eq!(d.tags, vec!["li"]);
        assert_eq!(d.classes, vec!["x"]);
        assert!(d.attrs.is_empty());
    }

    #[test]
    fn test_attribute_names() {
        let d = decompose("a[href^=\"http\"][ data-x ]").unwrap();
        assert_eq!(d.attrs, vec!["href", "data-x"]);
        assert_eq!(d.tags, vec!["a"]);
        assert!(!d.is_attribute_only());

        let d = decompose("[data-x]").unwrap();
        assert!(d.is_attribute_only());
    }

    #[test]
    fn test_attribute_value_with_bracket() {
        let d = decompose("input[value=\"]\"]").unwrap();
        assert_eq!(d.attrs, vec!["value"]);
        assert_eq!(d.tags, vec!["input"]);
    }

    #[test]
    fn test_escaped_class_is_unescaped() {
        let d = decompose(".sm\\:flex").unwrap();
        assert_eq!(d.classes, vec!["sm:flex"]);
        assert!(d.tags.is_empty());

        let d = decompose(".\\31 0").unwrap();
        assert_eq!(d.classes, vec!["10"]);
    }

    #[test]
    fn test_structural_selectors() {
        let d = decompose(":root").unwrap();
        assert_eq!(d.selector, ":root");
        assert!(!d.has_markup_refs());

        let d = decompose("*").unwrap();
        assert!(!d.has_markup_refs());
    }

    #[test]
    fn test_unbalanced_input_is_an_error() {
        assert!(matches!(
            decompose(".a:not(.b"),
            Err(SanitizeError::Decomposition { .. })
        ));
        assert!(matches!(
            decompose("a[href"),
            Err(SanitizeError::Decomposition { .. })
        ));
    }
}
