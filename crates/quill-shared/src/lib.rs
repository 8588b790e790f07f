//! # Quill Shared
//!
//! Wire types for the RPC surface, shared between the server and any Rust
//! client of the blog API.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
