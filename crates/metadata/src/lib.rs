//! Series metadata enrichment.
//!
//! A [`Resolver`] turns a scraped series title into the canonical record of a
//! [`MetadataProvider`] ([`Tmdb`] in production). Enrichment is optional: a
//! failed or empty lookup leaves the series' metadata fields empty and never
//! stops a sync run.

pub mod error;
mod models;
mod provider;
mod resolver;
mod tmdb;

pub use crate::models::{MetadataRecord, SearchResult};
pub use crate::provider::{MetadataProvider, ProviderHandle};
pub use crate::resolver::{DEFAULT_LANGUAGE, Resolver, select_match};
pub use crate::tmdb::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Tmdb};
