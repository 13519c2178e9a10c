//! Core types and pure logic for quire.
//!
//! Everything in this crate is backend-agnostic: the document capability
//! trait, repository and cache contracts, error types, the retry policy and
//! the Post domain model. Concrete store and cache backends live in the
//! `quire` crate.

pub mod cache;
pub mod document;
pub mod post;
pub mod retry;
pub mod storage;

pub use document::{matches_optional, new_document_id, stamped_for_update, Document, Predicate};
