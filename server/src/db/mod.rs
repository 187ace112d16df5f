//! Database module for PostgreSQL persistence.

mod pool;
mod products;

pub use pool::*;
pub use products::*;
