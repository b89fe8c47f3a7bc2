//! Persistence gateway: the port traits the core writes through and the
//! two backends that satisfy them.

pub mod memory;
pub mod ports;
pub mod postgres;

pub use memory::MemoryUgcStore;
pub use ports::{BookmarkRepository, ProgressRepository, RatingRepository};
pub use postgres::PostgresUgcStore;
