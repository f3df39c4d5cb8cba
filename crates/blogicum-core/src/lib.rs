//! # Blogicum Core
//!
//! The domain layer of the blog: entities, the publication gate, listing
//! assembly and the ownership rules for mutations.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod services;
pub mod visibility;

pub use error::{DomainError, FieldError};
pub use pagination::{Page, PageRequest, PageWindow};
pub use visibility::Visibility;
