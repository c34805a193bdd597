//! URL handling module for docs-harvester
//!
//! This module provides URL normalization, site identity, and the link
//! relevance filter that decides what goes on the crawl frontier.

mod domain;
mod filter;
mod normalize;

pub use crate::config::FilterMode;
pub use domain::{extract_domain, same_domain};
pub use filter::{is_relevant, LinkFilter};
pub use normalize::normalize_url;
