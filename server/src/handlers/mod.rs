//! Request handlers for catalog operations.

mod ingest;
mod products;
mod segments;

pub use ingest::*;
pub use products::*;
pub use segments::*;
