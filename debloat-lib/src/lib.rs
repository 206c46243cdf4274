//! Selector-driven dead-rule elimination for stylesheets.
//!
//! Parse a stylesheet once, then keep only the rules whose selectors can match
//! markup known to be on the page:
//!
//! ```no_run
//! use debloat_lib::{Sanitizer, Stylesheet, UsedMarkup};
//!
//! let mut sheet = Stylesheet::new("theme", "https://example.com/style.css", ".used{color:red} .unused{color:blue}");
//! let used = UsedMarkup::new().with_classes(["used"]);
//! let css = Sanitizer::default().sanitize(&mut sheet, &used, &[]);
//! assert_eq!(css, ".used{color:red}");
//! ```

pub mod allow;
pub mod config;
pub mod error;
pub mod markup;
pub mod parser;
pub mod render;
pub mod sanitizer;
pub mod style;
pub mod stylesheet;

pub use allow::{AllowEntry, AllowKind};
pub use config::SanitizerConfig;
pub use error::SanitizeError;
pub use markup::{PreservedCatalog, UsedMarkup};
pub use sanitizer::{SanitizeReport, Sanitizer};
pub use stylesheet::Stylesheet;
