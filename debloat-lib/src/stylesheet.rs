use crate::error::Result;
use crate::style::debloat_css;
use crate::style::owned_css::RuleNode;

/// One stylesheet moving through the sanitizer.
///
/// The parsed rule tree is cached the first time it is needed and reused by
/// every later sanitize call on the same instance.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// Host handle, e.g. the enqueued style name.
    pub id: String,
    /// Where the stylesheet was loaded from. Relative `url()`s resolve against it.
    pub url: String,
    /// The original CSS text, returned as is whenever sanitizing fails.
    pub content: String,
    parsed: Option<Vec<RuleNode>>,
    /// CSS produced by the last sanitize call.
    pub output: Option<String>,
}

impl Stylesheet {
    pub fn new(id: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Stylesheet {
            id: id.into(),
            url: url.into(),
            content: content.into(),
            parsed: None,
            output: None,
        }
    }

    /// Identifier a host can use for the element that carries the optimized CSS.
    pub fn render_id(&self) -> String {
        format!("debloat-css-{}", self.id)
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed.is_some()
    }

    /// The cached rule tree, parsing `content` on first use.
    pub fn rules(&mut self) -> Result<&[RuleNode]> {
        if self.parsed.is_none() {
            let rules = debloat_css::parse(&self.content, &self.url)?;
            log::debug!("parsed {} into {} top-level rules", self.id, rules.len());
            if log::log_enabled!(log::Level::Trace) {
                for rule in &rules {
                    log::trace!("{}", rule);
                }
            }
            self.parsed = Some(rules);
        } else {
            log::debug!("reusing parsed rules for {}", self.id);
        }
        Ok(self.parsed.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_is_parsed_once() {
        let mut sheet = Stylesheet::new("theme", "http://example.com/style.css", ".a{color:red}");
        assert!(!sheet.is_parsed());
        let first = sheet.rules().unwrap().to_vec();
        assert!(sheet.is_parsed());

        // The cache wins over later edits to the content.
        sheet.content = ".b{color:blue}".to_string();
        assert_eq!(sheet.rules().unwrap(), first.as_slice());
    }

    #[test]
    fn test_parse_failure_leaves_cache_empty() {
        let mut sheet = Stylesheet::new("broken", "", "..a{color:red}");
        assert!(sheet.rules().is_err());
        assert!(!sheet.is_parsed());
    }

    #[test]
    fn test_render_id() {
        let sheet = Stylesheet::new("theme-style", "", "");
        assert_eq!(sheet.render_id(), "debloat-css-theme-style");
    }
}
