//! Domain layer of the movie catalog.
//!
//! Holds the movie record model, field validation, the persistence gateway
//! abstraction, and the [`catalog::CatalogService`] that ties them together.
//! Nothing in this crate talks to a database or an HTTP stack directly.

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod movie;
pub mod types;
pub mod validation;
