//! Entity-name canonicalization and string-level resolution.
//!
//! - [`normalize`]: turns a raw entity name into a [`CanonicalName`], the sole
//!   grouping key (no fuzzy or phonetic matching).
//! - [`resolve`]: selects the article-database records filed under a canonical name.

pub mod normalize;
pub mod resolve;

pub use normalize::{normalize, CanonicalName};
pub use resolve::{resolve, Resolution};
