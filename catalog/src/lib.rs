//! Catalog Provider
//! ----------------
//! Movies, theaters, screens and their seat layouts, read from and written to
//! the persistent store. A fresh store is seeded with the demo catalog.

pub mod error;
pub mod mock;
pub mod provider;

pub use error::CatalogError;
pub use provider::{CatalogProvider, Dashboard, NewMovie, Showing};
