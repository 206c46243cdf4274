use crate::markup::catalog::PreservedCatalog;
use std::collections::HashSet;

/// Identifiers known to exist in the rendered markup of a page.
///
/// Supplied by whoever inspects the page; the sanitizer only reads it. Extend
/// it freely before sanitizing to account for markup added at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedMarkup {
    pub classes: HashSet<String>,
    pub tags: HashSet<String>,
    pub ids: HashSet<String>,
}

impl UsedMarkup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style construction, mostly for hosts and tests.
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes.extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn insert_class(&mut self, class: impl Into<String>) {
        self.classes.insert(class.into());
    }

    pub fn insert_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn insert_id(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// Adds everything `other` knows about.
    pub fn merge(&mut self, other: &UsedMarkup) {
        self.classes.extend(other.classes.iter().cloned());
        self.tags.extend(other.tags.iter().cloned());
        self.ids.extend(other.ids.iter().cloned());
    }

    /// This profile plus the always-used classes and tags of `catalog`.
    pub fn with_catalog(&self, catalog: &PreservedCatalog) -> UsedMarkup {
        let mut merged = self.clone();
        merged
            .classes
            .extend(catalog.classes.iter().map(|c| c.to_string()));
        merged.tags.extend(catalog.tags.iter().map(|t| t.to_string()));
        merged
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// True if every class is used. Vacuously true for none.
    pub fn has_all_classes<S: AsRef<str>>(&self, classes: &[S]) -> bool {
        classes.iter().all(|c| self.classes.contains(c.as_ref()))
    }

    pub fn has_all_ids<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        ids.iter().all(|i| self.ids.contains(i.as_ref()))
    }

    pub fn has_all_tags<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().all(|t| self.tags.contains(t.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.tags.is_empty() && self.ids.is_empty()
    }
}
