pub mod css_matcher;
pub mod debloat_css;
pub mod owned_css;
pub mod selector;
pub mod urls;
