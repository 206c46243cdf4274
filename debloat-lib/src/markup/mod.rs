//! What the page actually contains, and what is always assumed to be there.

pub mod catalog;
pub mod profile;

pub use catalog::PreservedCatalog;
pub use profile::UsedMarkup;
