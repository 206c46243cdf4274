use thiserror::Error;

/// Everything that can go wrong inside one sanitize pass.
///
/// None of these ever reach the page-rendering path: the sanitizer converts
/// them into a fallback that returns the original stylesheet text.
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// The CSS parser rejected the stylesheet.
    #[error("css parse error: {0}")]
    Parse(String),

    /// A selector could not be tokenized into classes, ids, tags and attributes.
    #[error("cannot decompose selector `{selector}`: {reason}")]
    Decomposition { selector: String, reason: String },

    /// The rule tree could not be rendered back to CSS.
    #[error("css render error: {0}")]
    Render(String),

    /// An allow-list entry produced an invalid pattern.
    #[error("invalid allow pattern `{pattern}`")]
    AllowPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, SanitizeError>;
