//! URL handling module for Shelfscan
//!
//! The catalog links its pages with relative paths whose depth depends on
//! where the linking page sits. This module turns those links into absolute
//! URLs: detail pages under `catalogue/`, media under the site root, and
//! navigation links relative to the current page.

mod resolve;

pub use resolve::{catalogue_url, media_url, parse_base_url, resolve_against, strip_relative_prefix};
