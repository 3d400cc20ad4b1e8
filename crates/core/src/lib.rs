//! `quotedesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult, optional_text, require_positive, require_text};
pub use id::{AggregateId, UserId};
pub use value_object::ValueObject;
