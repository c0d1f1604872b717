//! HTML parsing and text extraction
//!
//! - [`html`] splits a page into its title and body text zones
//! - [`sanitize`] normalizes extracted text

pub mod html;
pub mod sanitize;

pub use html::PageZones;
pub use sanitize::{normalize_whitespace, truncate_chars};
