//! Identifier resolution, pricing primitives and catalog provider transport.
//!
//! Everything in [`identifier`], [`price`], [`registry`] and [`batch`] is pure
//! and infallible: invalid input yields `None` or an empty result. The
//! provider clients in [`client`] are the only fallible, I/O-facing parts.

pub mod batch;
pub mod client;
pub mod error;
pub mod identifier;
pub mod normalize;
pub mod price;
pub mod rate_limit;
pub mod registry;
pub mod signer;
pub mod types;

pub use batch::{partition, Batch};
pub use client::{CatalogClient, CatalogProvider, KeepaClient, PaapiClient};
pub use error::CatalogError;
pub use identifier::extract_identifier;
pub use normalize::{normalize_item, LinkSettings};
pub use rate_limit::RateLimiter;
pub use registry::{DuplicateRecord, IdentifierRegistry, RegistryEntry, UnresolvedReference};
pub use types::RawItem;
