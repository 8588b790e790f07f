//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! This crate contains the post/category model, slug generation, and the
//! services that enforce the mutation protocol. It has no infrastructure
//! dependencies: storage is reached through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod slug;

pub use error::{DomainError, RepoError};
pub use service::{CategoryService, PostService};
pub use slug::slugify;
