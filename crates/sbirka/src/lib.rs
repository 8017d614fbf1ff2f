//! Sbirka: retrieval, extraction, and normalization of Czech legal texts
//! from providers that publish unstable, unversioned HTML.
//!
//! A citation is normalized ([`identifier`]), resolved to a provider
//! location ([`slug`]), fetched as raw markup ([`fetch`]), and distilled
//! into canonical sections or change records ([`extract`]). Two provider
//! adapters ([`sources`]) compose those stages into the four document
//! operations, and [`chain::SourceChain`] falls back between them.

pub mod chain;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod identifier;
pub mod slug;
pub mod sources;
pub mod types;

pub use chain::SourceChain;
pub use error::{FetchError, SourceError};
pub use fetch::{BrowserFetcher, FetchMode, HttpFetcher, MarkupFetcher, RenderOptions};
pub use identifier::LawIdentifier;
pub use slug::SlugResolver;
pub use sources::{Kurzy, LawSource, ZakonyProLidi};
pub use types::*;
