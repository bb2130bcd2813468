//! # webfinger-core
//!
//! Resource descriptor model for WebFinger (RFC 7033).
//!
//! A WebFinger response is a JRD: a JSON document describing an identity
//! (`acct:user@host`) through aliases, properties, and typed link relations.
//! This crate owns everything about that document and nothing about HTTP;
//! transport lives in `webfinger-client`.
//!
//! ## Key concepts
//!
//! - **Document** ([`Jrd`], `jrd.rs`): parse from JSON or legacy XRD/XML,
//!   build incrementally, query links by relation, serialise back out. The
//!   raw wire document is kept alongside the validated fields, so unknown
//!   extension data survives a round trip untouched.
//! - **Links** ([`Link`], [`LinkBuilder`], `link.rs`): one entry of the
//!   `links` array, validated on construction, extensible by design.
//! - **Relation names** (`rels.rs`): the fixed table mapping well-known
//!   relation URIs to short mnemonics, used symmetrically by the builder
//!   and the query path.
//! - **XRD codec** (`xrd.rs`): the XML dialect, parsed with a hardened
//!   reader and serialised with a properly declared `xsi` namespace.

pub mod error;
pub mod jrd;
pub mod link;
pub mod rels;
pub mod validation;

mod xrd;

pub use error::{RdError, RdResult};
pub use jrd::Jrd;
pub use link::{Link, LinkBuilder};

/// Key-ordered JSON mapping, the shape of every decoded wire object.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
