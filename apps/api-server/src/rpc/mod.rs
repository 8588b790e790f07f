//! Typed procedure layer.
//!
//! Each procedure is a named operation (`post.create`, `category.getAll`, ...)
//! with a JSON input and output. [`dispatch::call`] runs one procedure against
//! the services, wrapped in the [`logging::logged`] decorator. Nothing here
//! depends on the HTTP framework; `handlers::rpc` binds it to routes.

pub mod dispatch;
pub mod logging;
pub mod procedure;

pub use procedure::{Procedure, ProcedureKind};
