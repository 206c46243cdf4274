use crate::markup::PreservedCatalog;

/// Settings fixed for the lifetime of a [`crate::sanitizer::Sanitizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizerConfig {
    /// Classes, tags and selectors that are never removed.
    pub catalog: PreservedCatalog,
    /// Prepend [`crate::allow::AllowEntry::critical_defaults`] to every allow-list.
    pub preserve_critical: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        SanitizerConfig {
            catalog: PreservedCatalog::default(),
            preserve_critical: true,
        }
    }
}

impl SanitizerConfig {
    pub fn with_catalog(mut self, catalog: PreservedCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn preserve_critical(mut self, enabled: bool) -> Self {
        self.preserve_critical = enabled;
        self
    }
}
